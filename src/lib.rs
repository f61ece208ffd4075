#![warn(clippy::all, clippy::cargo, clippy::nursery, clippy::pedantic)]
#![warn(missing_docs)]

//! The crate `cubature` provides deterministic [adaptive cubature] routines, which approximate
//! definite multi-dimensional [integrals] of vector-valued functions over axis-aligned
//! hyperrectangles together with a rigorous error estimate.
//!
//! # Features
//!
//! This library was designed with the following features as essential in mind:
//!
//! - **Generic numeric type**. The numeric type used in this library is not fixed, but instead a
//! generic parameter, so that the integration routines can be used with either `f32`, `f64`, or a
//! custom numeric type that implements the `Float` trait from the `num-traits` crate.
//! - **Vector-valued integrands**. A single integration call can integrate `fdim` scalar
//! functions simultaneously, sharing every point evaluation between the components. The error
//! test is applied per component, per consecutive pair, or in an $L^1$, $L^2$ or $L^\infty$
//! sense, selectable through an error norm.
//! - **Two adaptive schemes**. The *h-adaptive* integrators refine by repeatedly bisecting the
//! region whose error contribution is largest, which works for integrands of moderate smoothness
//! in moderate dimensions. The *p-adaptive* integrators instead keep the domain fixed and double
//! the degree of a nested Clenshaw-Curtis rule, which converges very quickly for smooth
//! integrands in low dimensions.
//! - **Reproducibility**. As far as the numeric type allows this, all results produced with
//! `cubature` are completely reproducible: refinement order is deterministic, ties between
//! regions with equal error are broken first-in first-out, and the batched and point-wise
//! evaluation modes visit the same points in the same order.
//! - **Batched evaluation**. The `_v` variants of the integrators hand the integrand whole
//! batches of points in one call, so that the caller may evaluate them in parallel (SIMD,
//! threads) without the engine itself needing any concurrency.
//! - **Soft failure modes**. Running out of the evaluation budget or a stalled p-refinement does
//! not destroy the integration: the best current estimate is returned together with a status
//! flag, and the caller decides how to treat it.
//!
//! # What is ...?
//!
//! This section is a dictionary of terms that are used in this documentation. Given
//!
//! $$ I_j = \int_{a_1}^{b_1} \mathrm{d} x_1 \cdots \int_{a_d}^{b_d} \mathrm{d} x_d
//! \\, f_j(x_1, \ldots, x_d), \qquad j = 1, \ldots, \mathtt{fdim} $$
//!
//! we approximate all $I_j$ at once using an embedded cubature rule, which yields both an
//! estimate of $I_j$ and an estimate $e_j$ of its error. We use the following terms:
//!
//! - the number of *calls* is the number of points at which the integrand is evaluated. We
//! assume that this is the expensive operation;
//! - the *integrand* is the vector-valued function $f$ that is being integrated;
//! - the number of *dimensions*, $d$ or `ndim`, is the number of dimensions of the integration
//! domain, and `fdim` is the number of components of the integrand;
//! - an *embedded rule* is a pair of cubature rules of different degree sharing their evaluation
//! points, whose difference estimates the error cheaply;
//! - the *error norm* is the prescription that collapses the vector $(e_1, \ldots,
//! e_{\mathtt{fdim}})$ into a single convergence decision.
//!
//! [adaptive cubature]: https://en.wikipedia.org/wiki/Numerical_integration
//! [integrals]: https://en.wikipedia.org/wiki/Integral

pub mod callbacks;
pub mod core;
pub mod integrators;
pub mod rules;

pub use crate::core::*;
