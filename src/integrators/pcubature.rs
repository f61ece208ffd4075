//! The p-adaptive integrators: refinement by increasing the degree of the rule over the fixed
//! whole-domain region.
//!
//! The engine steps through the nested Clenshaw-Curtis levels, whose tensor-product grids
//! double along every axis from one level to the next. Because the levels are nested, only the
//! points new to a level are evaluated; the cached values of the previous grid are carried
//! over. The error estimate is the difference between the last two successive estimates, so a
//! convergence decision is available from level one onwards. Best suited to smooth integrands
//! in low dimensions; the domain is never subdivided.

use crate::callbacks::{Callback, Progress, SinkCallback};
use crate::core::{
    BatchIntegrand, CubatureResult, HyperRectangle, Integrand, IntegrationResult, Pointwise,
    Status, Tolerance,
};
use crate::integrators::{eval_batch, prepare};
use crate::rules::clenshaw_curtis::{nodes, num_nodes, weights};
use crate::rules::cnst;
use num_traits::{Float, FromPrimitive};

/// Finest Clenshaw-Curtis level, $2^{10} + 1$ nodes per axis. Refining past it stalls the
/// integration instead of looping forever.
const MAX_LEVEL: u32 = 10;

/// Hard cap on the tensor grid size; refining past it stalls the integration instead of
/// exhausting memory.
const MAX_GRID_POINTS: usize = 1 << 24;

/// Integrates a point-wise integrand p-adaptively over the hyperrectangle spanned by `xmin`
/// and `xmax`.
///
/// # Errors
///
/// See [`integrate`](crate::integrators::integrate).
pub fn pcubature<T, I>(
    integrand: &I,
    xmin: &[T],
    xmax: &[T],
    tolerance: &Tolerance<T>,
) -> CubatureResult<IntegrationResult<T>>
where
    T: Float + FromPrimitive,
    I: Integrand<T>,
{
    pcubature_v_cb(&Pointwise(integrand), xmin, xmax, tolerance, &SinkCallback {})
}

/// Like [`pcubature`], but reports a [`Progress`] record to `callback` after every level.
///
/// # Errors
///
/// See [`integrate`](crate::integrators::integrate).
pub fn pcubature_cb<T, I, C>(
    integrand: &I,
    xmin: &[T],
    xmax: &[T],
    tolerance: &Tolerance<T>,
    callback: &C,
) -> CubatureResult<IntegrationResult<T>>
where
    T: Float + FromPrimitive,
    I: Integrand<T>,
    C: Callback<T>,
{
    pcubature_v_cb(&Pointwise(integrand), xmin, xmax, tolerance, callback)
}

/// Integrates a batched integrand p-adaptively. Each level issues a single batch holding all
/// points new to that level.
///
/// # Errors
///
/// See [`integrate`](crate::integrators::integrate).
pub fn pcubature_v<T, I>(
    integrand: &I,
    xmin: &[T],
    xmax: &[T],
    tolerance: &Tolerance<T>,
) -> CubatureResult<IntegrationResult<T>>
where
    T: Float + FromPrimitive,
    I: BatchIntegrand<T>,
{
    pcubature_v_cb(integrand, xmin, xmax, tolerance, &SinkCallback {})
}

/// Like [`pcubature_v`], but reports a [`Progress`] record to `callback` after every level.
///
/// # Errors
///
/// See [`integrate`](crate::integrators::integrate).
pub fn pcubature_v_cb<T, I, C>(
    integrand: &I,
    xmin: &[T],
    xmax: &[T],
    tolerance: &Tolerance<T>,
    callback: &C,
) -> CubatureResult<IntegrationResult<T>>
where
    T: Float + FromPrimitive,
    I: BatchIntegrand<T>,
    C: Callback<T>,
{
    let domain = prepare(integrand, xmin, xmax, tolerance)?;
    let fdim = integrand.fdim();
    let dim = domain.dim();

    let mut calls = 0;
    let mut level = 0_u32;

    // level 0 is the single midpoint of the domain
    let mut grid = eval_batch(integrand, domain.centre(), 1, &mut calls)?;
    let mut value = estimate(&grid, level, &domain, fdim);

    // no second estimate to compare against yet
    let mut error = vec![T::infinity(); fdim];

    callback.print(&Progress {
        passes: level as usize,
        calls,
        regions: 1,
        value: value.clone(),
        error: error.clone(),
    });

    let status = loop {
        if tolerance
            .norm
            .converged(&error, &value, tolerance.abserr, tolerance.relerr)
        {
            break Status::Converged;
        }

        // doubling the degree no longer moves the estimate beyond floating-point noise
        let err_scalar = tolerance.norm.reduce(&error);
        let noise = cnst::<T>(16.0) * T::epsilon() * tolerance.norm.reduce(&value);
        if err_scalar.is_finite() && err_scalar <= noise {
            break Status::Stalled;
        }

        if level >= MAX_LEVEL {
            break Status::Stalled;
        }

        let old_total = grid_total(level, dim);
        let new_total = match grid_total_checked(level + 1, dim) {
            Some(total) if total <= MAX_GRID_POINTS => total,
            // no finer rule is available
            _ => break Status::Stalled,
        };

        if tolerance.max_eval > 0 && calls + (new_total - old_total) > tolerance.max_eval {
            break Status::BudgetExceeded;
        }

        grid = refine(integrand, &grid, level, &domain, fdim, &mut calls)?;
        level += 1;

        let next = estimate(&grid, level, &domain, fdim);
        error = next
            .iter()
            .zip(value.iter())
            .map(|(&a, &b)| (a - b).abs())
            .collect();
        value = next;

        callback.print(&Progress {
            passes: level as usize,
            calls,
            regions: 1,
            value: value.clone(),
            error: error.clone(),
        });
    };

    Ok(IntegrationResult {
        value,
        error,
        calls,
        status,
    })
}

fn grid_total(level: u32, dim: usize) -> usize {
    num_nodes(level).pow(dim as u32)
}

fn grid_total_checked(level: u32, dim: usize) -> Option<usize> {
    num_nodes(level).checked_pow(dim as u32)
}

/// Decodes the flat grid index `p` into per-axis node indices, row-major with the last axis
/// fastest.
fn decode(mut p: usize, n: usize, idx: &mut [usize]) {
    for i in idx.iter_mut().rev() {
        *i = p % n;
        p /= n;
    }
}

/// Computes the tensor-product estimate from the cached grid values of `level`.
fn estimate<T: Float + FromPrimitive>(
    grid: &[T],
    level: u32,
    domain: &HyperRectangle<T>,
    fdim: usize,
) -> Vec<T> {
    let dim = domain.dim();
    let n = num_nodes(level);
    let w1d = weights::<T>(level);
    let scale = domain
        .halfwidth()
        .iter()
        .fold(T::one(), |acc, &hw| acc * hw);

    let mut out = vec![T::zero(); fdim];
    let mut idx = vec![0_usize; dim];

    for p in 0..grid_total(level, dim) {
        decode(p, n, &mut idx);
        let w = idx.iter().fold(T::one(), |acc, &i| acc * w1d[i]);

        for j in 0..fdim {
            out[j] = out[j] + w * grid[p * fdim + j];
        }
    }

    for v in &mut out {
        *v = *v * scale;
    }

    out
}

/// Builds the grid values of `level + 1` from those of `level`, evaluating only the points new
/// to the finer grid in a single batch.
fn refine<T, I>(
    integrand: &I,
    grid: &[T],
    level: u32,
    domain: &HyperRectangle<T>,
    fdim: usize,
    calls: &mut usize,
) -> CubatureResult<Vec<T>>
where
    T: Float + FromPrimitive,
    I: BatchIntegrand<T>,
{
    let dim = domain.dim();
    let old_n = num_nodes(level);
    let new_n = num_nodes(level + 1);
    let new_nodes = nodes::<T>(level + 1);

    // a node of the coarse grid reappears in the fine grid at twice its index; the single
    // level-0 node is the middle of the three level-1 nodes
    let coarse_index = |i: usize| -> Option<usize> {
        if level == 0 {
            if i == 1 {
                Some(0)
            } else {
                None
            }
        } else if i % 2 == 0 {
            Some(i / 2)
        } else {
            None
        }
    };

    let total = grid_total(level + 1, dim);
    let mut out = vec![T::nan(); total * fdim];
    let mut idx = vec![0_usize; dim];
    let mut xs = Vec::new();
    let mut fresh = Vec::new();

    for p in 0..total {
        decode(p, new_n, &mut idx);

        let old_p = idx.iter().try_fold(0_usize, |acc, &i| {
            coarse_index(i).map(|old_i| acc * old_n + old_i)
        });

        if let Some(old_p) = old_p {
            out[p * fdim..(p + 1) * fdim]
                .copy_from_slice(&grid[old_p * fdim..(old_p + 1) * fdim]);
        } else {
            for (k, &i) in idx.iter().enumerate() {
                xs.push(domain.centre()[k] + domain.halfwidth()[k] * new_nodes[i]);
            }
            fresh.push(p);
        }
    }

    let values = eval_batch(integrand, &xs, fresh.len(), calls)?;

    for (slot, p) in fresh.into_iter().enumerate() {
        out[p * fdim..(p + 1) * fdim].copy_from_slice(&values[slot * fdim..(slot + 1) * fdim]);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FnIntegrand;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_smooth_product_integrand() {
        // int over [0,1]^2 of exp(x + y) = (e - 1)^2
        let integrand = FnIntegrand::new(2, 1, |x: &[f64]| vec![(x[0] + x[1]).exp()]);
        let result = pcubature(
            &integrand,
            &[0.0, 0.0],
            &[1.0, 1.0],
            &Tolerance::new(1e-10, 1e-10),
        )
        .unwrap();

        let exact = (std::f64::consts::E - 1.0).powi(2);
        assert!(result.is_converged());
        assert_approx_eq!(result.value[0], exact, 1e-9);
    }

    #[test]
    fn test_each_point_is_evaluated_once() {
        // levels 0..=m in two dimensions hold (2^m + 1)^2 distinct points in total
        let integrand = FnIntegrand::new(2, 1, |x: &[f64]| vec![x[0] * x[0] + x[1]]);
        let result = pcubature(
            &integrand,
            &[0.0, 0.0],
            &[1.0, 1.0],
            &Tolerance::new(1e-12, 1e-12),
        )
        .unwrap();

        assert!(result.is_converged());
        // x^2 + y is integrated exactly from level 1 onwards, so the stopping comparison
        // happens at level 2, whose grid holds 25 distinct points in total
        assert_eq!(result.calls, 25);
        assert_approx_eq!(result.value[0], 5.0 / 6.0, 1e-13);
    }

    #[test]
    fn test_budget_exhaustion_is_soft() {
        let integrand = FnIntegrand::new(1, 1, |x: &[f64]| vec![x[0].exp()]);
        let result = pcubature(
            &integrand,
            &[0.0],
            &[1.0],
            &Tolerance::new(1e-14, 1e-14).with_max_eval(1),
        )
        .unwrap();

        assert_eq!(result.status, Status::BudgetExceeded);
        assert_eq!(result.calls, 1);
        assert!(!result.is_converged());
    }

    #[test]
    fn test_stall_on_non_polynomial_noise_floor() {
        // |x| has a kink at 0, so Clenshaw-Curtis converges slowly; with an unattainable
        // tolerance the engine must eventually report a stall or run into the grid cap
        // instead of looping forever
        let integrand = FnIntegrand::new(1, 1, |x: &[f64]| vec![x[0].abs()]);
        let result = pcubature(
            &integrand,
            &[-1.0],
            &[1.0],
            &Tolerance::new(0.0, 0.0),
        )
        .unwrap();

        assert_eq!(result.status, Status::Stalled);
        assert_approx_eq!(result.value[0], 1.0, 1e-5);
    }
}
