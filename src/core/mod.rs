//! The core module: integrand abstractions, integration domains, tolerances and results.

pub mod error;
pub mod norm;

pub use error::{CubatureError, CubatureResult};
pub use norm::ErrorNorm;

use num_traits::Float;
use serde::{Deserialize, Serialize};

/// Trait which every point-wise integrand must implement.
///
/// Any extra data the integrand needs (parameters, lookup tables, closed-over arguments) is
/// bound once into the implementing value at construction time and is available on every call
/// without further marshaling. The engine assumes the integrand is a pure function of its input
/// point: evaluations carry no required ordering between each other.
pub trait Integrand<T: Copy>: Send + Sync {
    /// Evaluates the integrand at the point `x`, which has `dim()` coordinates, and returns its
    /// `fdim()` components.
    fn call(&self, x: &[T]) -> Vec<T>;

    /// Returns the number of dimensions of the integration domain.
    fn dim(&self) -> usize;

    /// Returns the number of components the integrand produces per point.
    fn fdim(&self) -> usize {
        1
    }
}

impl<'a, T: Copy, I: Integrand<T> + ?Sized> Integrand<T> for &'a I {
    fn call(&self, x: &[T]) -> Vec<T> {
        (**self).call(x)
    }

    fn dim(&self) -> usize {
        (**self).dim()
    }

    fn fdim(&self) -> usize {
        (**self).fdim()
    }
}

/// Trait for integrands that are evaluated on whole batches of points at once.
///
/// Batching is the concurrency lever of this crate: the engines issue one call per batch and
/// wait for its full result, while the implementer is free to evaluate the points of a batch in
/// parallel. The layout is point-major: coordinate `k` of point `i` is `xs[i * dim() + k]`, and
/// component `j` of point `i` goes into slot `i * fdim() + j` of the returned buffer.
pub trait BatchIntegrand<T: Copy>: Send + Sync {
    /// Evaluates the integrand at `npt` points packed into `xs` and returns `npt * fdim()`
    /// values.
    fn call(&self, xs: &[T], npt: usize) -> Vec<T>;

    /// Returns the number of dimensions of the integration domain.
    fn dim(&self) -> usize;

    /// Returns the number of components the integrand produces per point.
    fn fdim(&self) -> usize {
        1
    }
}

/// A point-wise integrand built from a closure together with its dimensions.
///
/// The closure captures whatever extra arguments the integrand needs, so the binding happens
/// exactly once.
pub struct FnIntegrand<F> {
    f: F,
    dim: usize,
    fdim: usize,
}

impl<F> FnIntegrand<F> {
    /// Wraps the closure `f` as an integrand over a `dim`-dimensional domain with `fdim`
    /// components.
    pub const fn new(dim: usize, fdim: usize, f: F) -> Self {
        Self { f, dim, fdim }
    }
}

impl<T, F> Integrand<T> for FnIntegrand<F>
where
    T: Copy,
    F: Fn(&[T]) -> Vec<T> + Send + Sync,
{
    fn call(&self, x: &[T]) -> Vec<T> {
        (self.f)(x)
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn fdim(&self) -> usize {
        self.fdim
    }
}

/// A batched integrand built from a closure together with its dimensions.
pub struct BatchFnIntegrand<F> {
    f: F,
    dim: usize,
    fdim: usize,
}

impl<F> BatchFnIntegrand<F> {
    /// Wraps the closure `f`, which receives a flat point buffer and the number of points in
    /// it, as a batched integrand.
    pub const fn new(dim: usize, fdim: usize, f: F) -> Self {
        Self { f, dim, fdim }
    }
}

impl<T, F> BatchIntegrand<T> for BatchFnIntegrand<F>
where
    T: Copy,
    F: Fn(&[T], usize) -> Vec<T> + Send + Sync,
{
    fn call(&self, xs: &[T], npt: usize) -> Vec<T> {
        (self.f)(xs, npt)
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn fdim(&self) -> usize {
        self.fdim
    }
}

/// Adapter that lifts a point-wise [`Integrand`] to a [`BatchIntegrand`] by evaluating the
/// points of a batch one after the other.
pub struct Pointwise<I>(pub I);

impl<T, I> BatchIntegrand<T> for Pointwise<I>
where
    T: Copy,
    I: Integrand<T>,
{
    fn call(&self, xs: &[T], npt: usize) -> Vec<T> {
        let dim = self.0.dim();
        let mut out = Vec::with_capacity(npt * self.0.fdim());

        for i in 0..npt {
            out.extend(self.0.call(&xs[i * dim..(i + 1) * dim]));
        }

        out
    }

    fn dim(&self) -> usize {
        self.0.dim()
    }

    fn fdim(&self) -> usize {
        self.0.fdim()
    }
}

/// An axis-aligned hyperrectangle, the integration domain of this crate.
///
/// Stored as per-axis centres and halfwidths. All halfwidths are strictly positive: a zero-width
/// or inverted axis is rejected at construction.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct HyperRectangle<T> {
    centre: Vec<T>,
    halfwidth: Vec<T>,
}

impl<T: Float> HyperRectangle<T> {
    /// Constructs the domain `[xmin[0], xmax[0]] x ... x [xmin[d-1], xmax[d-1]]`.
    ///
    /// # Errors
    ///
    /// Returns [`CubatureError::InvalidConfiguration`] if the two slices differ in length, are
    /// empty, contain non-finite bounds, or describe an empty or zero-width axis.
    pub fn new(xmin: &[T], xmax: &[T]) -> CubatureResult<Self> {
        if xmin.len() != xmax.len() {
            return Err(CubatureError::invalid(
                "xmin and xmax must have the same length",
            ));
        }

        if xmin.is_empty() {
            return Err(CubatureError::invalid(
                "the integration domain must have at least one dimension",
            ));
        }

        let two = T::one() + T::one();
        let mut centre = Vec::with_capacity(xmin.len());
        let mut halfwidth = Vec::with_capacity(xmin.len());

        for (&a, &b) in xmin.iter().zip(xmax.iter()) {
            if !a.is_finite() || !b.is_finite() {
                return Err(CubatureError::invalid(
                    "integration bounds must be finite",
                ));
            }

            if b <= a {
                return Err(CubatureError::invalid(
                    "each axis must satisfy xmin < xmax; zero-width axes are not integrable",
                ));
            }

            centre.push((a + b) / two);
            halfwidth.push((b - a) / two);
        }

        Ok(Self { centre, halfwidth })
    }

    /// Returns the number of dimensions of the domain.
    pub fn dim(&self) -> usize {
        self.centre.len()
    }

    /// Returns the per-axis centres.
    pub fn centre(&self) -> &[T] {
        &self.centre
    }

    /// Returns the per-axis halfwidths.
    pub fn halfwidth(&self) -> &[T] {
        &self.halfwidth
    }

    /// Returns the volume of the domain, the product of the axis widths.
    pub fn volume(&self) -> T {
        let two = T::one() + T::one();
        self.halfwidth
            .iter()
            .fold(T::one(), |acc, &hw| acc * two * hw)
    }

    /// Bisects the domain along `axis`, producing two children of equal volume.
    pub(crate) fn bisect(&self, axis: usize) -> (Self, Self) {
        let two = T::one() + T::one();
        let hw = self.halfwidth[axis] / two;

        let mut left = self.clone();
        let mut right = self.clone();

        left.halfwidth[axis] = hw;
        left.centre[axis] = self.centre[axis] - hw;
        right.halfwidth[axis] = hw;
        right.centre[axis] = self.centre[axis] + hw;

        (left, right)
    }
}

/// Requested tolerances and the evaluation budget of one integration call.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Tolerance<T> {
    /// Absolute error tolerance.
    pub abserr: T,
    /// Relative error tolerance.
    pub relerr: T,
    /// Norm used to collapse the per-component errors into a convergence decision.
    pub norm: ErrorNorm,
    /// Hard cap on the number of integrand evaluations; `0` means unlimited. Exceeding the cap
    /// stops the integration with [`Status::BudgetExceeded`] instead of failing.
    pub max_eval: usize,
}

impl<T: Float> Tolerance<T> {
    /// Creates a tolerance with the given absolute and relative bounds, the individual error
    /// norm and no evaluation budget.
    pub fn new(abserr: T, relerr: T) -> Self {
        Self {
            abserr,
            relerr,
            norm: ErrorNorm::Individual,
            max_eval: 0,
        }
    }

    /// Replaces the error norm.
    #[must_use]
    pub fn with_norm(mut self, norm: ErrorNorm) -> Self {
        self.norm = norm;
        self
    }

    /// Replaces the evaluation budget.
    #[must_use]
    pub fn with_max_eval(mut self, max_eval: usize) -> Self {
        self.max_eval = max_eval;
        self
    }

    /// Validates the tolerance against an integrand with `fdim` components. Called by the
    /// engines before the first evaluation.
    pub(crate) fn validate(&self, fdim: usize) -> CubatureResult<()> {
        if fdim == 0 {
            return Err(CubatureError::invalid(
                "the integrand must have at least one component",
            ));
        }

        if !(self.abserr.is_finite() && self.abserr >= T::zero()) {
            return Err(CubatureError::invalid(
                "abserr must be finite and non-negative",
            ));
        }

        if !(self.relerr.is_finite() && self.relerr >= T::zero()) {
            return Err(CubatureError::invalid(
                "relerr must be finite and non-negative",
            ));
        }

        if !self.norm.supports_fdim(fdim) {
            return Err(CubatureError::invalid(
                "the paired error norm requires an even number of integrand components",
            ));
        }

        Ok(())
    }
}

/// How an integration ended.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Status {
    /// The accumulated error estimate satisfies the requested tolerances.
    Converged,
    /// The evaluation budget was exhausted before the tolerances were met. The reported value
    /// and error are the best estimates at that point.
    BudgetExceeded,
    /// Increasing the degree of the rule no longer changes the estimate beyond floating-point
    /// noise, or no finer rule is available, while the tolerances are still unmet. Only reported
    /// by the p-adaptive integrators.
    Stalled,
}

/// The outcome of an integration: per-component estimates, per-component error estimates, the
/// number of integrand evaluations spent, and how the run ended.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct IntegrationResult<T> {
    /// Estimated value of the integral, one entry per integrand component.
    pub value: Vec<T>,
    /// Estimated absolute error, one entry per integrand component.
    pub error: Vec<T>,
    /// Number of points at which the integrand was evaluated.
    pub calls: usize,
    /// How the integration ended.
    pub status: Status,
}

impl<T> IntegrationResult<T> {
    /// Returns `true` if the requested tolerances were met.
    #[must_use]
    pub fn is_converged(&self) -> bool {
        self.status == Status::Converged
    }
}
