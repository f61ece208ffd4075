use cubature::callbacks::{Callback, Progress};
use cubature::core::*;
use cubature::integrators::{hcubature, pcubature, pcubature_cb, pcubature_v};

use assert_approx_eq::assert_approx_eq;
use std::cell::RefCell;

/// A callback that records every progress report it sees.
struct RecordingCallback {
    records: RefCell<Vec<Progress<f64>>>,
}

impl Callback<f64> for RecordingCallback {
    fn print(&self, progress: &Progress<f64>) {
        self.records.borrow_mut().push(progress.clone());
    }
}

#[test]
fn test_unit_square_constant() {
    let integrand = FnIntegrand::new(2, 1, |_: &[f64]| vec![1.0]);
    let result = pcubature(
        &integrand,
        &[0.0, 0.0],
        &[1.0, 1.0],
        &Tolerance::new(1e-8, 1e-8),
    )
    .unwrap();

    assert!(result.is_converged());
    assert_approx_eq!(result.value[0], 1.0, 1e-12);
    assert!(result.error[0] < 1e-8);
}

#[test]
fn test_polynomial_is_exact() {
    // degree 4 is captured exactly by the level-2 rule, independent of any further refinement
    let integrand = FnIntegrand::new(1, 1, |x: &[f64]| vec![x[0].powi(4)]);
    let result = pcubature(&integrand, &[0.0], &[1.0], &Tolerance::new(1e-12, 1e-12)).unwrap();

    assert!(result.is_converged());
    assert_approx_eq!(result.value[0], 0.2, 1e-14);
}

#[test]
fn test_sphere_volume() {
    // smooth separable integrand in three dimensions, the home turf of the p-adaptive scheme
    let integrand = FnIntegrand::new(3, 1, |x: &[f64]| vec![x[0] * x[0] * x[2].sin()]);
    let result = pcubature(
        &integrand,
        &[0.0, 0.0, 0.0],
        &[1.0, 2.0 * std::f64::consts::PI, std::f64::consts::PI],
        &Tolerance::new(1e-9, 1e-9),
    )
    .unwrap();

    assert!(result.is_converged());
    assert_approx_eq!(result.value[0], 4.0 / 3.0 * std::f64::consts::PI, 1e-7);
}

#[test]
fn test_two_component_integrand() {
    let integrand = FnIntegrand::new(2, 2, |x: &[f64]| vec![x[0] * x[0], x[0] * x[1]]);
    let result = pcubature(
        &integrand,
        &[0.0, 0.0],
        &[1.0, 1.0],
        &Tolerance::new(1e-10, 1e-10),
    )
    .unwrap();

    assert!(result.is_converged());
    assert_approx_eq!(result.value[0], 1.0 / 3.0, 1e-12);
    assert_approx_eq!(result.value[1], 1.0 / 4.0, 1e-12);
}

#[test]
fn test_paired_norm_rejects_odd_fdim() {
    let integrand = FnIntegrand::new(1, 3, |_: &[f64]| -> Vec<f64> {
        panic!("the integrand must not be evaluated")
    });
    let result = pcubature(
        &integrand,
        &[0.0],
        &[1.0],
        &Tolerance::new(1e-8, 1e-8).with_norm(ErrorNorm::Paired),
    );

    assert!(matches!(
        result,
        Err(CubatureError::InvalidConfiguration { .. })
    ));
}

#[test]
fn test_agrees_with_hcubature() {
    let integrand = FnIntegrand::new(2, 1, |x: &[f64]| vec![(x[0] * x[1]).cos()]);
    let tolerance = Tolerance::new(1e-10, 1e-10);

    let h = hcubature(&integrand, &[0.0, 0.0], &[1.0, 1.0], &tolerance).unwrap();
    let p = pcubature(&integrand, &[0.0, 0.0], &[1.0, 1.0], &tolerance).unwrap();

    assert!(h.is_converged());
    assert!(p.is_converged());
    assert_approx_eq!(h.value[0], p.value[0], 1e-9);
}

#[test]
fn test_vectorized_matches_pointwise() {
    let pointwise = FnIntegrand::new(2, 1, |x: &[f64]| vec![(x[0] + 2.0 * x[1]).exp()]);
    let batched = BatchFnIntegrand::new(2, 1, |xs: &[f64], npt: usize| {
        (0..npt)
            .map(|i| (xs[2 * i] + 2.0 * xs[2 * i + 1]).exp())
            .collect()
    });

    let tolerance = Tolerance::new(1e-10, 1e-10);
    let scalar = pcubature(&pointwise, &[0.0, 0.0], &[1.0, 1.0], &tolerance).unwrap();
    let vectorized = pcubature_v(&batched, &[0.0, 0.0], &[1.0, 1.0], &tolerance).unwrap();

    assert_eq!(scalar, vectorized);
}

#[test]
fn test_callback_observes_every_level() {
    let integrand = FnIntegrand::new(1, 1, |x: &[f64]| vec![x[0].exp()]);
    let callback = RecordingCallback {
        records: RefCell::new(Vec::new()),
    };

    let result = pcubature_cb(
        &integrand,
        &[0.0],
        &[1.0],
        &Tolerance::new(1e-10, 1e-10),
        &callback,
    )
    .unwrap();

    let records = callback.records.into_inner();

    // one record per level, starting with the single-point level 0
    assert!(records.len() >= 2);
    assert_eq!(records[0].passes, 0);
    assert_eq!(records[0].calls, 1);
    assert!(records.iter().all(|r| r.regions == 1));
    assert_eq!(records.last().unwrap().calls, result.calls);
    assert_approx_eq!(
        records.last().unwrap().value[0],
        std::f64::consts::E - 1.0,
        1e-9
    );
}

#[test]
fn test_budget_exhaustion_keeps_count_at_cap() {
    let integrand = FnIntegrand::new(2, 1, |x: &[f64]| vec![(x[0] * x[1]).sin()]);
    let result = pcubature(
        &integrand,
        &[0.0, 0.0],
        &[1.0, 1.0],
        &Tolerance::new(1e-14, 1e-14).with_max_eval(10),
    )
    .unwrap();

    // level 0 costs one call; refining to level 1 would cost eight more than the cap allows
    assert_eq!(result.status, Status::BudgetExceeded);
    assert_eq!(result.calls, 9);
}
