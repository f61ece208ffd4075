//! Fixed-point cubature rules.
//!
//! The h-adaptive integrators use *embedded pairs*: two rules of different degree sharing all
//! evaluation points, whose difference provides a cheap per-component error estimate. In one
//! dimension this is the 7-point Gauss rule embedded in the 15-point Kronrod extension, in two
//! or more dimensions the degree 7 rule of Genz and Malik with its embedded degree 5 companion.
//! The p-adaptive integrators instead use the nested Clenshaw-Curtis rules, whose node sets
//! double from one level to the next.

pub mod clenshaw_curtis;
pub mod gauss_kronrod;
pub mod genz_malik;

use crate::core::HyperRectangle;
use num_traits::{Float, FromPrimitive};

/// Converts a rule constant computed in `f64` to the working numeric type.
pub(crate) fn cnst<T: FromPrimitive>(x: f64) -> T {
    // rule constants are representable in every reasonable float type
    T::from_f64(x).unwrap()
}

/// The outcome of applying an embedded rule pair to one region: per-component integral and
/// error estimates plus the axis that should be bisected next.
#[derive(Clone, Debug)]
pub struct RuleEstimate<T> {
    /// Estimated integral, one entry per integrand component.
    pub value: Vec<T>,
    /// Embedded-pair error estimate, one entry per integrand component.
    pub error: Vec<T>,
    /// The coordinate axis contributing most to the error, the bisection hint for the
    /// h-adaptive engine.
    pub split_dim: usize,
}

/// An embedded cubature rule pair over a fixed number of dimensions.
///
/// Point generation and reduction are split so that the engine can batch the points of several
/// regions into a single integrand call.
#[derive(Clone, Debug)]
pub enum EmbeddedRule {
    /// The G7-K15 pair, used for one-dimensional domains.
    GaussKronrod,
    /// The Genz-Malik degree 7/5 pair, used for two or more dimensions.
    GenzMalik(genz_malik::GenzMalik),
}

impl EmbeddedRule {
    /// Selects the embedded rule pair appropriate for a `dim`-dimensional domain.
    #[must_use]
    pub fn for_dim(dim: usize) -> Self {
        if dim == 1 {
            Self::GaussKronrod
        } else {
            Self::GenzMalik(genz_malik::GenzMalik::new(dim))
        }
    }

    /// Returns the number of points one application of the rule evaluates.
    #[must_use]
    pub fn num_points(&self) -> usize {
        match self {
            Self::GaussKronrod => gauss_kronrod::NUM_POINTS,
            Self::GenzMalik(rule) => rule.num_points(),
        }
    }

    /// Appends the evaluation points for `region` to `out` in the rule's canonical order,
    /// point-major.
    pub fn points<T: Float>(&self, region: &HyperRectangle<T>, out: &mut Vec<T>) {
        match self {
            Self::GaussKronrod => gauss_kronrod::points(region, out),
            Self::GenzMalik(rule) => rule.points(region, out),
        }
    }

    /// Reduces the integrand values at the points produced by [`EmbeddedRule::points`] (laid
    /// out as `num_points() * fdim` values, point-major) to estimates for `region`.
    pub fn estimate<T: Float + FromPrimitive>(
        &self,
        region: &HyperRectangle<T>,
        values: &[T],
        fdim: usize,
    ) -> RuleEstimate<T> {
        debug_assert_eq!(values.len(), self.num_points() * fdim);

        match self {
            Self::GaussKronrod => gauss_kronrod::estimate(region, values, fdim),
            Self::GenzMalik(rule) => rule.estimate(region, values, fdim),
        }
    }
}
