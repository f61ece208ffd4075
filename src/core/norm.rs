//! Error norms: the rule that collapses a vector of per-component error estimates into a single
//! convergence decision.

use num_traits::Float;
use serde::{Deserialize, Serialize};

/// Prescription for measuring the error of a vector-valued integrand against the requested
/// tolerances.
///
/// For `fdim == 1` the individual, $L^1$, $L^2$ and $L^\infty$ norms produce identical
/// convergence decisions; the paired norm requires complete pairs and rejects a single
/// component.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ErrorNorm {
    /// Convergence is achieved only when each component individually satisfies the requested
    /// error tolerances.
    Individual,
    /// Like [`ErrorNorm::Individual`], except that the components are grouped into consecutive
    /// pairs, with the error tolerance applied in an $L^2$ sense to each pair. This is mainly
    /// useful for integrating vectors of complex numbers, where each consecutive pair of real
    /// components is the real and imaginary part of a single complex integrand, and only the
    /// error in the complex plane matters. Requires an even number of components.
    Paired,
    /// The error and value vectors are collapsed with the $L^2$ norm,
    /// $\lVert x \rVert_2 = \sqrt{\sum_j x_j^2}$, before a single tolerance test.
    L2,
    /// The error and value vectors are collapsed with the $L^1$ norm,
    /// $\lVert x \rVert_1 = \sum_j |x_j|$, before a single tolerance test.
    L1,
    /// The error and value vectors are collapsed with the $L^\infty$ norm,
    /// $\lVert x \rVert_\infty = \max_j |x_j|$, before a single tolerance test.
    LInf,
}

/// The tolerance test shared by all norms: the (scalar) error must be below either the absolute
/// or the relative bound.
fn within<T: Float>(err: T, val: T, abserr: T, relerr: T) -> bool {
    err <= abserr || err <= relerr * val.abs()
}

impl ErrorNorm {
    /// Construct an error norm from the numeric code used by the C and Python incarnations of
    /// this library: `0` individual, `1` paired, `2` $L^2$, `3` $L^1$, `4` $L^\infty$.
    /// Returns `None` for any other code.
    #[must_use]
    pub const fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(Self::Individual),
            1 => Some(Self::Paired),
            2 => Some(Self::L2),
            3 => Some(Self::L1),
            4 => Some(Self::LInf),
            _ => None,
        }
    }

    /// Returns the numeric code of this norm, the inverse of [`ErrorNorm::from_code`].
    #[must_use]
    pub const fn code(self) -> u32 {
        match self {
            Self::Individual => 0,
            Self::Paired => 1,
            Self::L2 => 2,
            Self::L1 => 3,
            Self::LInf => 4,
        }
    }

    /// Checks whether this norm is applicable to an integrand with `fdim` components. Only the
    /// paired norm restricts `fdim`: the components must form complete pairs.
    #[must_use]
    pub const fn supports_fdim(self, fdim: usize) -> bool {
        match self {
            Self::Paired => fdim % 2 == 0,
            _ => true,
        }
    }

    /// Collapses a vector of per-component error estimates into the scalar this norm measures:
    /// the largest component for the individual and $L^\infty$ norms, the largest pair
    /// magnitude for the paired norm, and the $L^1$/$L^2$ magnitude otherwise.
    ///
    /// The h-adaptive engine keys its region queue by this scalar.
    pub fn reduce<T: Float>(self, error: &[T]) -> T {
        match self {
            Self::Individual | Self::LInf => linf(error),
            Self::Paired => error.chunks(2).fold(T::zero(), |acc, e| {
                acc.max((e[0] * e[0] + e[1] * e[1]).sqrt())
            }),
            Self::L2 => l2(error),
            Self::L1 => l1(error),
        }
    }

    /// Decides whether the error estimates in `error` satisfy the requested tolerances relative
    /// to the integral estimates in `value`.
    ///
    /// This function is pure: the same inputs always yield the same decision. Both slices must
    /// have the same length.
    pub fn converged<T: Float>(self, error: &[T], value: &[T], abserr: T, relerr: T) -> bool {
        debug_assert_eq!(error.len(), value.len());

        match self {
            Self::Individual => error
                .iter()
                .zip(value.iter())
                .all(|(&e, &v)| within(e, v, abserr, relerr)),
            Self::Paired => error.chunks(2).zip(value.chunks(2)).all(|(e, v)| {
                let e = (e[0] * e[0] + e[1] * e[1]).sqrt();
                let v = (v[0] * v[0] + v[1] * v[1]).sqrt();
                within(e, v, abserr, relerr)
            }),
            Self::L2 => within(l2(error), l2(value), abserr, relerr),
            Self::L1 => within(l1(error), l1(value), abserr, relerr),
            Self::LInf => within(linf(error), linf(value), abserr, relerr),
        }
    }
}

fn l1<T: Float>(x: &[T]) -> T {
    x.iter().fold(T::zero(), |acc, &v| acc + v.abs())
}

fn l2<T: Float>(x: &[T]) -> T {
    x.iter().fold(T::zero(), |acc, &v| acc + v * v).sqrt()
}

fn linf<T: Float>(x: &[T]) -> T {
    x.iter().fold(T::zero(), |acc, &v| acc.max(v.abs()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_roundtrip() {
        for code in 0..5 {
            let norm = ErrorNorm::from_code(code).unwrap();
            assert_eq!(norm.code(), code);
        }

        assert_eq!(ErrorNorm::from_code(5), None);
    }

    #[test]
    fn test_paired_fdim() {
        assert!(ErrorNorm::Paired.supports_fdim(2));
        assert!(!ErrorNorm::Paired.supports_fdim(3));
        assert!(ErrorNorm::Individual.supports_fdim(3));
        assert!(ErrorNorm::LInf.supports_fdim(1));
    }

    #[test]
    fn test_individual() {
        let value = [1.0, -10.0];
        let error = [1e-9, 1e-4];

        // the second component fails the absolute test but passes the relative one
        assert!(ErrorNorm::Individual.converged(&error, &value, 1e-8, 1e-4));
        assert!(!ErrorNorm::Individual.converged(&error, &value, 1e-8, 1e-6));
    }

    #[test]
    fn test_paired_l2_on_pairs() {
        // pair error is sqrt(3e-9^2 + 4e-9^2) = 5e-9
        let value = [1.0, 2.0];
        let error = [3e-9, 4e-9];

        assert!(ErrorNorm::Paired.converged(&error, &value, 5e-9, 0.0));
        assert!(!ErrorNorm::Paired.converged(&error, &value, 4.9e-9, 0.0));
    }

    #[test]
    fn test_global_norms() {
        let value = [3.0, -4.0];
        let error = [3e-8, 4e-8];

        // L2: |err| = 5e-8, |val| = 5
        assert!(ErrorNorm::L2.converged(&error, &value, 0.0, 1e-8));
        assert!(!ErrorNorm::L2.converged(&error, &value, 0.0, 9e-9));

        // L1: |err| = 7e-8, |val| = 7
        assert!(ErrorNorm::L1.converged(&error, &value, 7e-8, 0.0));
        assert!(!ErrorNorm::L1.converged(&error, &value, 6.9e-8, 0.0));

        // Linf: |err| = 4e-8, |val| = 4
        assert!(ErrorNorm::LInf.converged(&error, &value, 4e-8, 0.0));
        assert!(!ErrorNorm::LInf.converged(&error, &value, 3.9e-8, 0.0));
    }

    #[test]
    fn test_norms_agree_for_single_component() {
        let cases = [(1e-9_f64, 1.0_f64), (1e-7, 1.0), (0.5, 1e-12), (0.0, 0.0)];

        for &(e, v) in &cases {
            let decisions = [
                ErrorNorm::Individual,
                ErrorNorm::L2,
                ErrorNorm::L1,
                ErrorNorm::LInf,
            ]
            .iter()
            .map(|n| n.converged(&[e], &[v], 1e-8, 1e-8))
            .collect::<Vec<_>>();

            assert!(decisions.windows(2).all(|w| w[0] == w[1]));
        }
    }
}
