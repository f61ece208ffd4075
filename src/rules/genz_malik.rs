//! The degree 7 cubature rule of Genz and Malik with its embedded degree 5 companion, used on
//! domains of two or more dimensions.
//!
//! One application of the rule over a $d$-dimensional region evaluates
//! $1 + 4d + 2d(d-1) + 2^d$ points: the centre, the points $\pm\lambda_2 e_i$ and
//! $\pm\lambda_4 e_i$ on each axis, the points $\pm\lambda_4 e_i \pm\lambda_4 e_j$ on each pair
//! of axes, and the corners $(\pm\lambda_5, \ldots, \pm\lambda_5)$, all scaled by the region's
//! halfwidths. The same values weighted two ways give the degree 7 estimate and the embedded
//! degree 5 estimate; their difference is the error estimate. The fourth divided differences
//! along each axis, a byproduct of the shared points, rank the axes by integrand variation and
//! select the next bisection axis.

use super::{cnst, RuleEstimate};
use crate::core::HyperRectangle;
use num_traits::{Float, FromPrimitive};

/// Generator $\lambda_2 = \sqrt{9/70}$.
const LAMBDA2: f64 = 0.358_568_582_800_318_1;
/// Generator $\lambda_4 = \sqrt{9/10}$.
const LAMBDA4: f64 = 0.948_683_298_050_513_8;
/// Generator $\lambda_5 = \sqrt{9/19}$.
const LAMBDA5: f64 = 0.688_247_201_611_685_3;
/// $\lambda_2^2 / \lambda_4^2$, the weight of the outer pair in the divided difference.
const RATIO: f64 = (9.0 / 70.0) / (9.0 / 10.0);

/// The Genz-Malik embedded rule pair for a fixed number of dimensions (at least two).
#[derive(Clone, Debug)]
pub struct GenzMalik {
    dim: usize,
    /// Degree 7 weights for the five point families, normalized to sum to one over the region.
    w: [f64; 5],
    /// Embedded degree 5 weights for the first four families.
    e: [f64; 4],
}

impl GenzMalik {
    /// Constructs the rule for a `dim`-dimensional domain.
    ///
    /// # Panics
    ///
    /// Panics if `dim < 2`; one-dimensional domains use the Gauss-Kronrod pair instead.
    #[must_use]
    pub fn new(dim: usize) -> Self {
        assert!(dim >= 2, "the Genz-Malik rule requires at least two dimensions");

        let d = dim as f64;
        let corners = (2.0_f64).powi(dim as i32);

        Self {
            dim,
            w: [
                (12824.0 - 9120.0 * d + 400.0 * d * d) / 19683.0,
                980.0 / 6561.0,
                (1820.0 - 400.0 * d) / 19683.0,
                200.0 / 19683.0,
                6859.0 / 19683.0 / corners,
            ],
            e: [
                (729.0 - 950.0 * d + 50.0 * d * d) / 729.0,
                245.0 / 486.0,
                (265.0 - 100.0 * d) / 1458.0,
                25.0 / 729.0,
            ],
        }
    }

    /// Returns the number of points one application of the rule evaluates.
    #[must_use]
    pub fn num_points(&self) -> usize {
        let d = self.dim;
        1 + 4 * d + 2 * d * (d - 1) + (1 << d)
    }

    /// Appends the evaluation points for `region` to `out` in the rule's canonical order: the
    /// centre, the $\pm\lambda_2$ axis points, the $\pm\lambda_4$ axis points, the
    /// $\pm\lambda_4$ pair points and finally the $\lambda_5$ corners.
    pub fn points<T: Float>(&self, region: &HyperRectangle<T>, out: &mut Vec<T>) {
        let centre = region.centre();
        let hw = region.halfwidth();
        let d = self.dim;

        let l2 = T::from(LAMBDA2).unwrap();
        let l4 = T::from(LAMBDA4).unwrap();
        let l5 = T::from(LAMBDA5).unwrap();

        out.extend_from_slice(centre);

        for &lambda in &[l2, l4] {
            for i in 0..d {
                for &sign in &[-T::one(), T::one()] {
                    for k in 0..d {
                        let mut x = centre[k];
                        if k == i {
                            x = x + sign * lambda * hw[k];
                        }
                        out.push(x);
                    }
                }
            }
        }

        for i in 0..d {
            for j in (i + 1)..d {
                for &si in &[-T::one(), T::one()] {
                    for &sj in &[-T::one(), T::one()] {
                        for k in 0..d {
                            let mut x = centre[k];
                            if k == i {
                                x = x + si * l4 * hw[k];
                            } else if k == j {
                                x = x + sj * l4 * hw[k];
                            }
                            out.push(x);
                        }
                    }
                }
            }
        }

        for corner in 0..(1_usize << d) {
            for k in 0..d {
                let sign = if corner >> k & 1 == 1 { T::one() } else { -T::one() };
                out.push(centre[k] + sign * l5 * hw[k]);
            }
        }
    }

    /// Reduces the integrand values at the points produced by [`GenzMalik::points`] to
    /// estimates for `region`.
    pub fn estimate<T: Float + FromPrimitive>(
        &self,
        region: &HyperRectangle<T>,
        values: &[T],
        fdim: usize,
    ) -> RuleEstimate<T> {
        let d = self.dim;
        let volume = region.volume();
        let ratio = cnst::<T>(RATIO);
        let two = T::one() + T::one();

        // family offsets into the canonical point order
        let base2 = 1;
        let base4 = base2 + 2 * d;
        let base_pairs = base4 + 2 * d;
        let base_corners = base_pairs + 2 * d * (d - 1);

        let at = |point: usize, j: usize| values[point * fdim + j];

        let mut value = Vec::with_capacity(fdim);
        let mut error = Vec::with_capacity(fdim);
        let mut divdiff = vec![T::zero(); d];

        for j in 0..fdim {
            let centre = at(0, j);

            let mut sum2 = T::zero();
            let mut sum4 = T::zero();

            for i in 0..d {
                let f2 = at(base2 + 2 * i, j) + at(base2 + 2 * i + 1, j);
                let f4 = at(base4 + 2 * i, j) + at(base4 + 2 * i + 1, j);

                sum2 = sum2 + f2;
                sum4 = sum4 + f4;

                // fourth divided difference along axis i, summed over the components
                divdiff[i] = divdiff[i]
                    + (f2 - two * centre - ratio * (f4 - two * centre)).abs();
            }

            let mut sum_pairs = T::zero();
            for point in base_pairs..base_corners {
                sum_pairs = sum_pairs + at(point, j);
            }

            let mut sum_corners = T::zero();
            for point in base_corners..self.num_points() {
                sum_corners = sum_corners + at(point, j);
            }

            let degree7 = volume
                * (cnst::<T>(self.w[0]) * centre
                    + cnst::<T>(self.w[1]) * sum2
                    + cnst::<T>(self.w[2]) * sum4
                    + cnst::<T>(self.w[3]) * sum_pairs
                    + cnst::<T>(self.w[4]) * sum_corners);
            let degree5 = volume
                * (cnst::<T>(self.e[0]) * centre
                    + cnst::<T>(self.e[1]) * sum2
                    + cnst::<T>(self.e[2]) * sum4
                    + cnst::<T>(self.e[3]) * sum_pairs);

            value.push(degree7);
            error.push((degree7 - degree5).abs());
        }

        // bisect the axis with the largest variation; ties go to the lowest index
        let mut split_dim = 0;
        for i in 1..d {
            if divdiff[i] > divdiff[split_dim] {
                split_dim = i;
            }
        }

        RuleEstimate {
            value,
            error,
            split_dim,
        }
    }
}
