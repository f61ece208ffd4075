//! The 15-point Kronrod extension of the 7-point Gauss rule, the embedded pair used on
//! one-dimensional domains.

use super::{cnst, RuleEstimate};
use crate::core::HyperRectangle;
use num_traits::{Float, FromPrimitive};

/// Number of points one application of the rule evaluates.
pub const NUM_POINTS: usize = 15;

/// Kronrod nodes on `[-1, 1]`; the odd-indexed entries are the embedded Gauss nodes.
const XGK: [f64; 15] = [
    -0.991_455_371_120_812_6,
    -0.949_107_912_342_758_5,
    -0.864_864_423_359_769_1,
    -0.741_531_185_599_394_4,
    -0.586_087_235_467_691_1,
    -0.405_845_151_377_397_2,
    -0.207_784_955_007_898_5,
    0.0,
    0.207_784_955_007_898_5,
    0.405_845_151_377_397_2,
    0.586_087_235_467_691_1,
    0.741_531_185_599_394_4,
    0.864_864_423_359_769_1,
    0.949_107_912_342_758_5,
    0.991_455_371_120_812_6,
];

/// Kronrod weights.
const WGK: [f64; 15] = [
    0.022_935_322_010_529_224,
    0.063_092_092_629_978_56,
    0.104_790_010_322_250_18,
    0.140_653_259_715_525_92,
    0.169_004_726_639_267_9,
    0.190_350_578_064_785_4,
    0.204_432_940_075_298_89,
    0.209_482_141_084_727_82,
    0.204_432_940_075_298_89,
    0.190_350_578_064_785_4,
    0.169_004_726_639_267_9,
    0.140_653_259_715_525_92,
    0.104_790_010_322_250_18,
    0.063_092_092_629_978_56,
    0.022_935_322_010_529_224,
];

/// Gauss weights for the nodes at odd Kronrod indices.
const WG: [f64; 7] = [
    0.129_484_966_168_869_7,
    0.279_705_391_489_276_64,
    0.381_830_050_505_118_9,
    0.417_959_183_673_469_4,
    0.381_830_050_505_118_9,
    0.279_705_391_489_276_64,
    0.129_484_966_168_869_7,
];

/// Appends the 15 evaluation points for `region` to `out`.
pub fn points<T: Float>(region: &HyperRectangle<T>, out: &mut Vec<T>) {
    let centre = region.centre()[0];
    let hw = region.halfwidth()[0];

    for &x in &XGK {
        out.push(centre + hw * T::from(x).unwrap());
    }
}

/// Reduces the integrand values at the 15 points to estimates for `region`.
///
/// The integral estimate is the Kronrod sum; the error estimate is the per-component difference
/// to the embedded Gauss sum. There is only one axis to split.
pub fn estimate<T: Float + FromPrimitive>(
    region: &HyperRectangle<T>,
    values: &[T],
    fdim: usize,
) -> RuleEstimate<T> {
    let hw = region.halfwidth()[0];
    let mut value = Vec::with_capacity(fdim);
    let mut error = Vec::with_capacity(fdim);

    for j in 0..fdim {
        let mut kronrod = T::zero();
        let mut gauss = T::zero();

        for (i, &w) in WGK.iter().enumerate() {
            kronrod = kronrod + cnst::<T>(w) * values[i * fdim + j];
        }

        for (i, &w) in WG.iter().enumerate() {
            gauss = gauss + cnst::<T>(w) * values[(2 * i + 1) * fdim + j];
        }

        value.push(hw * kronrod);
        error.push((hw * (kronrod - gauss)).abs());
    }

    RuleEstimate {
        value,
        error,
        split_dim: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn apply<F: Fn(f64) -> Vec<f64>>(a: f64, b: f64, fdim: usize, f: F) -> RuleEstimate<f64> {
        let region = HyperRectangle::new(&[a], &[b]).unwrap();
        let mut xs = Vec::new();
        points(&region, &mut xs);

        let values = xs.iter().flat_map(|&x| f(x)).collect::<Vec<_>>();
        estimate(&region, &values, fdim)
    }

    #[test]
    fn test_weights_sum_to_two() {
        assert_approx_eq!(WGK.iter().sum::<f64>(), 2.0, 1e-14);
        assert_approx_eq!(WG.iter().sum::<f64>(), 2.0, 1e-14);
    }

    #[test]
    fn test_exact_for_polynomials() {
        // int_0^1 x^4 dx = 1/5; both rules integrate degree 4 exactly, so the error estimate
        // vanishes as well
        let est = apply(0.0, 1.0, 1, |x| vec![x.powi(4)]);
        assert_approx_eq!(est.value[0], 0.2, 1e-15);
        assert!(est.error[0] < 1e-14);
    }

    #[test]
    fn test_trigonometric_integral() {
        // int_0^pi sin(x) dx = 2
        let est = apply(0.0, std::f64::consts::PI, 1, |x| vec![x.sin()]);
        assert_approx_eq!(est.value[0], 2.0, 1e-10);
    }

    #[test]
    fn test_vector_valued_components_are_independent() {
        let est = apply(0.0, 2.0, 2, |x| vec![x, x * x]);
        assert_approx_eq!(est.value[0], 2.0, 1e-13);
        assert_approx_eq!(est.value[1], 8.0 / 3.0, 1e-13);
        assert_eq!(est.split_dim, 0);
    }
}
