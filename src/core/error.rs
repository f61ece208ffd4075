//! Error types reported by the integration routines.

use std::error::Error;
use std::fmt;

/// Result type used throughout the crate.
pub type CubatureResult<T> = Result<T, CubatureError>;

/// Errors that can occur before or during an integration.
///
/// Exhausting the evaluation budget and a stalled p-refinement are *not* errors: they are
/// reported through [`Status`](crate::core::Status) together with the best current estimate.
#[derive(Clone, Debug, PartialEq)]
pub enum CubatureError {
    /// The requested integration is malformed: inverted or zero-width domain axes, negative
    /// tolerances, an odd number of components under the paired error norm, and similar
    /// conditions. Always raised before the integrand is evaluated a single time.
    InvalidConfiguration {
        /// Description of the offending configuration.
        message: String,
    },

    /// The integrand returned a number of values that disagrees with its declared `fdim`.
    ShapeMismatch {
        /// Number of values the engine expected for the batch.
        expected: usize,
        /// Number of values the integrand actually returned.
        actual: usize,
    },
}

impl fmt::Display for CubatureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfiguration { message } => {
                write!(f, "invalid configuration: {}", message)
            }
            Self::ShapeMismatch { expected, actual } => write!(
                f,
                "integrand returned {} values where {} were expected",
                actual, expected
            ),
        }
    }
}

impl Error for CubatureError {}

impl CubatureError {
    /// Shorthand for an [`CubatureError::InvalidConfiguration`] with the given message.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            message: message.into(),
        }
    }
}
