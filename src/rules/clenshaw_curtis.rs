//! Nested Clenshaw-Curtis rules on `[-1, 1]`, the degree-doubling family behind the p-adaptive
//! integrators.
//!
//! Level $m \ge 1$ places its $n + 1$ nodes, $n = 2^m$, at the Chebyshev extrema
//! $x_j = \cos(j\pi/n)$; level $0$ is the single midpoint with weight $2$. The nodes of level
//! $m$ are exactly the even-indexed nodes of level $m + 1$, so an engine stepping through the
//! levels only ever evaluates the integrand at the odd-indexed new points.

use super::cnst;
use num_traits::{Float, FromPrimitive};

/// Returns the number of nodes of level `m` along one axis, $2^m + 1$ (one for level 0).
#[must_use]
pub const fn num_nodes(m: u32) -> usize {
    if m == 0 {
        1
    } else {
        (1 << m) + 1
    }
}

/// Returns the nodes of level `m` on `[-1, 1]`, ordered from $+1$ down to $-1$.
#[must_use]
pub fn nodes<T: Float + FromPrimitive>(m: u32) -> Vec<T> {
    if m == 0 {
        return vec![T::zero()];
    }

    let n = 1_usize << m;
    (0..=n)
        .map(|j| cnst((j as f64 * std::f64::consts::PI / n as f64).cos()))
        .collect()
}

/// Returns the quadrature weights matching [`nodes`]; they sum to the length of `[-1, 1]`.
///
/// Level $m \ge 1$ uses the closed cosine-sum form of the Clenshaw-Curtis weights,
/// $$ w_j = \frac{c_j}{n} \left( 1 - \sum_{k=1}^{n/2} \frac{b_k}{4k^2 - 1}
/// \cos\frac{2kj\pi}{n} \right) $$
/// with $b_k = 1$ for $k = n/2$ and $2$ otherwise, and $c_j = 1$ at the endpoints and $2$
/// otherwise.
#[must_use]
pub fn weights<T: Float + FromPrimitive>(m: u32) -> Vec<T> {
    if m == 0 {
        return vec![cnst(2.0)];
    }

    let n = 1_usize << m;
    let mut out = Vec::with_capacity(n + 1);

    for j in 0..=n {
        let mut sum = 0.0;

        for k in 1..=(n / 2) {
            let b = if 2 * k == n { 1.0 } else { 2.0 };
            sum += b / ((4 * k * k - 1) as f64)
                * (2.0 * (k * j) as f64 * std::f64::consts::PI / n as f64).cos();
        }

        let c = if j == 0 || j == n { 1.0 } else { 2.0 };
        out.push(cnst(c / n as f64 * (1.0 - sum)));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn integrate_level(m: u32, f: impl Fn(f64) -> f64) -> f64 {
        nodes::<f64>(m)
            .iter()
            .zip(weights::<f64>(m).iter())
            .map(|(&x, &w)| w * f(x))
            .sum()
    }

    #[test]
    fn test_node_counts() {
        assert_eq!(num_nodes(0), 1);
        assert_eq!(num_nodes(1), 3);
        assert_eq!(num_nodes(2), 5);
        assert_eq!(num_nodes(5), 33);

        for m in 0..6 {
            assert_eq!(nodes::<f64>(m).len(), num_nodes(m));
            assert_eq!(weights::<f64>(m).len(), num_nodes(m));
        }
    }

    #[test]
    fn test_nodes_are_nested() {
        for m in 0..5 {
            let coarse = nodes::<f64>(m);
            let fine = nodes::<f64>(m + 1);

            for (j, &x) in coarse.iter().enumerate() {
                // level-m node j is level-(m+1) node 2j; level 0 sits at the middle of level 1
                let fine_j = if m == 0 { 1 } else { 2 * j };
                assert_approx_eq!(x, fine[fine_j], 1e-15);
            }
        }
    }

    #[test]
    fn test_weights_sum_to_interval_length() {
        for m in 1..8 {
            assert_approx_eq!(weights::<f64>(m).iter().sum::<f64>(), 2.0, 1e-13);
        }
    }

    #[test]
    fn test_exactness_on_polynomials() {
        // level m is exact for polynomials of degree up to n = 2^m
        assert_approx_eq!(integrate_level(1, |x| x * x), 2.0 / 3.0, 1e-14);
        assert_approx_eq!(integrate_level(2, |x| x.powi(4)), 2.0 / 5.0, 1e-14);
        assert_approx_eq!(integrate_level(3, |x| x.powi(8)), 2.0 / 9.0, 1e-14);

        // odd monomials vanish by symmetry
        assert_approx_eq!(integrate_level(2, |x| x.powi(3)), 0.0, 1e-15);
    }

    #[test]
    fn test_smooth_integrand_converges_fast() {
        // int_{-1}^{1} exp(x) dx = e - 1/e
        let exact = std::f64::consts::E - 1.0 / std::f64::consts::E;
        assert!((integrate_level(4, f64::exp) - exact).abs() < 1e-13);
    }
}
