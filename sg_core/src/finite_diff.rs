//! Gradient checking against central finite differences.
//!
//! Used by the tests and the demo binary to confirm that the backward pass
//! agrees with a numerical estimate.

use crate::error::Result;
use crate::graph::Graph;
use crate::node::NodeId;

/// Compute gradients using central finite differences.
///
/// # Arguments
/// * `f` - Function that takes a slice of input values and returns a scalar
/// * `point` - The point at which to estimate gradients
/// * `eps` - Step size (typically 1e-7 to 1e-5)
///
/// # Example
/// ```
/// use sg_core::finite_diff_grad;
///
/// // f(x, y) = x^2 + y^2
/// let f = |v: &[f64]| v[0] * v[0] + v[1] * v[1];
/// let grads = finite_diff_grad(f, &[3.0, 4.0], 1e-7);
///
/// assert!((grads[0] - 6.0).abs() < 1e-5);
/// assert!((grads[1] - 8.0).abs() < 1e-5);
/// ```
pub fn finite_diff_grad<F>(f: F, point: &[f64], eps: f64) -> Vec<f64>
where
    F: Fn(&[f64]) -> f64,
{
    let mut perturbed = point.to_vec();

    (0..point.len())
        .map(|i| {
            perturbed[i] = point[i] + eps;
            let f_plus = f(&perturbed);
            perturbed[i] = point[i] - eps;
            let f_minus = f(&perturbed);
            perturbed[i] = point[i];

            (f_plus - f_minus) / (2.0 * eps)
        })
        .collect()
}

/// Largest absolute difference between two gradient vectors.
///
/// # Panics
/// If the slices differ in length.
pub fn max_grad_error(grad1: &[f64], grad2: &[f64]) -> f64 {
    assert_eq!(grad1.len(), grad2.len(), "gradient lengths differ");
    grad1
        .iter()
        .zip(grad2)
        .map(|(a, b)| (a - b).abs())
        .fold(0.0, f64::max)
}

/// Analytic and numeric gradients of one expression, per input leaf.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientCheck {
    pub value: f64,
    pub analytic: Vec<f64>,
    pub numeric: Vec<f64>,
}

impl GradientCheck {
    pub fn max_error(&self) -> f64 {
        max_grad_error(&self.analytic, &self.numeric)
    }
}

/// Build an expression on fresh leaves at `point`, run backward, and compare
/// the leaf gradients with finite differences.
///
/// `build` receives the graph and one leaf per coordinate of `point` and
/// returns the root. It is called once for the analytic pass and twice per
/// coordinate for the numeric estimate.
///
/// # Example
/// ```
/// use sg_core::check_gradients;
///
/// // f(x, y) = x * y + x^2
/// let check = check_gradients(
///     |g, v| {
///         let xy = g.mul(v[0], v[1]);
///         let xx = g.pow(v[0], 2.0)?;
///         Ok(g.add(xy, xx))
///     },
///     &[1.5, -2.0],
///     1e-6,
/// )
/// .unwrap();
///
/// assert!(check.max_error() < 1e-6);
/// ```
pub fn check_gradients<F>(build: F, point: &[f64], eps: f64) -> Result<GradientCheck>
where
    F: Fn(&mut Graph, &[NodeId]) -> Result<NodeId>,
{
    let mut graph = Graph::new();
    let leaves: Vec<NodeId> = point.iter().map(|&v| graph.leaf(v)).collect();
    let root = build(&mut graph, &leaves)?;
    graph.backward(root);

    let analytic = leaves.iter().map(|&leaf| graph.grad(leaf)).collect();

    let eval = |values: &[f64]| {
        let mut graph = Graph::new();
        let leaves: Vec<NodeId> = values.iter().map(|&v| graph.leaf(v)).collect();
        build(&mut graph, &leaves)
            .map(|root| graph.value(root))
            .unwrap_or(f64::NAN)
    };

    Ok(GradientCheck {
        value: graph.value(root),
        analytic,
        numeric: finite_diff_grad(eval, point, eps),
    })
}
