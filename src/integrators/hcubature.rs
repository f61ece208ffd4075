//! The h-adaptive integrators: refinement by region subdivision.
//!
//! The engine keeps a max-heap of regions keyed by their error-norm contribution. Each pass
//! pops the worst region, bisects it along the axis the embedded rule flagged as most
//! troublesome, evaluates both children in a single batch and replaces the parent's
//! contribution to the running totals by the children's. The loop stops as soon as the
//! accumulated error satisfies the requested tolerances, or once another pass would exceed the
//! evaluation budget.

use crate::callbacks::{Callback, Progress, SinkCallback};
use crate::core::{
    BatchIntegrand, CubatureResult, HyperRectangle, Integrand, IntegrationResult, Pointwise,
    Status, Tolerance,
};
use crate::integrators::{eval_batch, prepare};
use crate::rules::{EmbeddedRule, RuleEstimate};
use num_traits::{Float, FromPrimitive};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// One entry of the region queue: a subdomain together with its cached estimates and the
/// bisection hint recorded by the rule. Regions are owned exclusively by the heap; a popped
/// region is consumed and replaced by its two children.
struct Region<T> {
    /// Scalar error contribution, the heap key.
    errnorm: T,
    /// Insertion sequence number; ties on `errnorm` are broken first-in first-out so that runs
    /// are reproducible.
    seq: u64,
    domain: HyperRectangle<T>,
    value: Vec<T>,
    error: Vec<T>,
    split_dim: usize,
}

impl<T: Float> Region<T> {
    fn new(seq: u64, domain: HyperRectangle<T>, estimate: RuleEstimate<T>, errnorm: T) -> Self {
        Self {
            errnorm,
            seq,
            domain,
            value: estimate.value,
            error: estimate.error,
            split_dim: estimate.split_dim,
        }
    }
}

impl<T: Float> PartialEq for Region<T> {
    fn eq(&self, other: &Self) -> bool {
        self.seq == other.seq
    }
}

impl<T: Float> Eq for Region<T> {}

impl<T: Float> Ord for Region<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        // a NaN error norm sorts as largest so that a poisoned region is refined first
        self.errnorm
            .partial_cmp(&other.errnorm)
            .unwrap_or_else(|| {
                if self.errnorm.is_nan() && other.errnorm.is_nan() {
                    Ordering::Equal
                } else if self.errnorm.is_nan() {
                    Ordering::Greater
                } else {
                    Ordering::Less
                }
            })
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl<T: Float> PartialOrd for Region<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Integrates a point-wise integrand h-adaptively over the hyperrectangle spanned by `xmin`
/// and `xmax`.
///
/// # Errors
///
/// See [`integrate`](crate::integrators::integrate).
pub fn hcubature<T, I>(
    integrand: &I,
    xmin: &[T],
    xmax: &[T],
    tolerance: &Tolerance<T>,
) -> CubatureResult<IntegrationResult<T>>
where
    T: Float + FromPrimitive,
    I: Integrand<T>,
{
    hcubature_v_cb(&Pointwise(integrand), xmin, xmax, tolerance, &SinkCallback {})
}

/// Like [`hcubature`], but reports a [`Progress`] record to `callback` after every pass.
///
/// # Errors
///
/// See [`integrate`](crate::integrators::integrate).
pub fn hcubature_cb<T, I, C>(
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
    hcubature_v_cb(&Pointwise(integrand), xmin, xmax, tolerance, callback)
}

/// Integrates a batched integrand h-adaptively. Each pass issues a single batch holding the
/// rule points of both children of the bisected region.
///
/// # Errors
///
/// See [`integrate`](crate::integrators::integrate).
pub fn hcubature_v<T, I>(
    integrand: &I,
    xmin: &[T],
    xmax: &[T],
    tolerance: &Tolerance<T>,
) -> CubatureResult<IntegrationResult<T>>
where
    T: Float + FromPrimitive,
    I: BatchIntegrand<T>,
{
    hcubature_v_cb(integrand, xmin, xmax, tolerance, &SinkCallback {})
}

/// Like [`hcubature_v`], but reports a [`Progress`] record to `callback` after every pass.
///
/// # Errors
///
/// See [`integrate`](crate::integrators::integrate).
pub fn hcubature_v_cb<T, I, C>(
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
    let rule = EmbeddedRule::for_dim(domain.dim());
    let num_points = rule.num_points();

    let mut calls = 0;
    let mut seq = 0_u64;
    let mut passes = 0;

    // the whole domain is evaluated once, even if it already busts the budget: the caller gets
    // a best-effort estimate together with the budget status, never an error
    let mut xs = Vec::with_capacity(2 * num_points * domain.dim());
    rule.points(&domain, &mut xs);
    let values = eval_batch(integrand, &xs, num_points, &mut calls)?;
    let estimate = rule.estimate(&domain, &values, fdim);

    let mut value = estimate.value.clone();
    let mut error = estimate.error.clone();

    let mut regions = BinaryHeap::new();
    let errnorm = tolerance.norm.reduce(&estimate.error);
    regions.push(Region::new(seq, domain, estimate, errnorm));
    seq += 1;

    callback.print(&Progress {
        passes,
        calls,
        regions: regions.len(),
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

        if tolerance.max_eval > 0 && calls + 2 * num_points > tolerance.max_eval {
            break Status::BudgetExceeded;
        }

        // the heap always holds at least one region: every pass pops one and pushes two
        let parent = match regions.pop() {
            Some(region) => region,
            None => break Status::Converged,
        };

        let (left, right) = parent.domain.bisect(parent.split_dim);

        xs.clear();
        rule.points(&left, &mut xs);
        rule.points(&right, &mut xs);

        let values = eval_batch(integrand, &xs, 2 * num_points, &mut calls)?;
        let left_estimate = rule.estimate(&left, &values[..num_points * fdim], fdim);
        let right_estimate = rule.estimate(&right, &values[num_points * fdim..], fdim);

        // replace the parent's stale contribution by the children's
        for j in 0..fdim {
            value[j] = value[j] - parent.value[j]
                + left_estimate.value[j]
                + right_estimate.value[j];
            error[j] = error[j] - parent.error[j]
                + left_estimate.error[j]
                + right_estimate.error[j];
        }

        let errnorm = tolerance.norm.reduce(&left_estimate.error);
        regions.push(Region::new(seq, left, left_estimate, errnorm));
        seq += 1;

        let errnorm = tolerance.norm.reduce(&right_estimate.error);
        regions.push(Region::new(seq, right, right_estimate, errnorm));
        seq += 1;

        passes += 1;

        callback.print(&Progress {
            passes,
            calls,
            regions: regions.len(),
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
