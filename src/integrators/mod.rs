//! The adaptive integration engines and the driver that selects between them.

pub mod hcubature;
pub mod pcubature;

pub use hcubature::{hcubature, hcubature_cb, hcubature_v, hcubature_v_cb};
pub use pcubature::{pcubature, pcubature_cb, pcubature_v, pcubature_v_cb};

use crate::core::{
    BatchIntegrand, CubatureError, CubatureResult, HyperRectangle, Integrand, IntegrationResult,
    Tolerance,
};
use num_traits::{Float, FromPrimitive};
use serde::{Deserialize, Serialize};

/// The adaptive scheme used by an integration.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Adaptive {
    /// h-adaptive: refine by subdividing the integration domain into smaller regions.
    H,
    /// p-adaptive: refine by increasing the degree of the rule over the fixed domain. Often
    /// better for smooth integrands in low dimensions.
    P,
}

/// Integrates `integrand` over the hyperrectangle spanned by `xmin` and `xmax` with the
/// requested `adaptive` scheme, evaluating one point per integrand call.
///
/// # Errors
///
/// Returns [`CubatureError::InvalidConfiguration`] for malformed domains or tolerances before
/// any evaluation takes place, and [`CubatureError::ShapeMismatch`] if the integrand does not
/// produce `fdim` values per point. Exhausting the evaluation budget is *not* an error; it is
/// reported through the result's status.
pub fn integrate<T, I>(
    integrand: &I,
    xmin: &[T],
    xmax: &[T],
    tolerance: &Tolerance<T>,
    adaptive: Adaptive,
) -> CubatureResult<IntegrationResult<T>>
where
    T: Float + FromPrimitive,
    I: Integrand<T>,
{
    match adaptive {
        Adaptive::H => hcubature(integrand, xmin, xmax, tolerance),
        Adaptive::P => pcubature(integrand, xmin, xmax, tolerance),
    }
}

/// Integrates a batched integrand; the counterpart of [`integrate`] for integrands that
/// evaluate whole batches of points per call.
///
/// # Errors
///
/// See [`integrate`].
pub fn integrate_v<T, I>(
    integrand: &I,
    xmin: &[T],
    xmax: &[T],
    tolerance: &Tolerance<T>,
    adaptive: Adaptive,
) -> CubatureResult<IntegrationResult<T>>
where
    T: Float + FromPrimitive,
    I: BatchIntegrand<T>,
{
    match adaptive {
        Adaptive::H => hcubature_v(integrand, xmin, xmax, tolerance),
        Adaptive::P => pcubature_v(integrand, xmin, xmax, tolerance),
    }
}

/// Checks domain and integrand dimensions against each other and validates the tolerance.
/// Shared precondition path of both engines; runs before the first evaluation.
pub(crate) fn prepare<T, I>(
    integrand: &I,
    xmin: &[T],
    xmax: &[T],
    tolerance: &Tolerance<T>,
) -> CubatureResult<HyperRectangle<T>>
where
    T: Float,
    I: BatchIntegrand<T>,
{
    let domain = HyperRectangle::new(xmin, xmax)?;

    if integrand.dim() != domain.dim() {
        return Err(CubatureError::invalid(
            "the integrand and the domain disagree on the number of dimensions",
        ));
    }

    tolerance.validate(integrand.fdim())?;

    Ok(domain)
}

/// Evaluates one batch of `npt` points, enforcing the integrand's declared output shape and
/// charging the evaluation counter.
pub(crate) fn eval_batch<T, I>(
    integrand: &I,
    xs: &[T],
    npt: usize,
    calls: &mut usize,
) -> CubatureResult<Vec<T>>
where
    T: Copy,
    I: BatchIntegrand<T>,
{
    let values = integrand.call(xs, npt);
    let expected = npt * integrand.fdim();

    if values.len() != expected {
        return Err(CubatureError::ShapeMismatch {
            expected,
            actual: values.len(),
        });
    }

    *calls += npt;

    Ok(values)
}
