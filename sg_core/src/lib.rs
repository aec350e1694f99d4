//! # sg_core - Reverse-mode Automatic Differentiation over Scalars
//!
//! This crate builds a computation graph of scalar values as arithmetic is
//! applied, then computes the gradient of one output with respect to every
//! node it depends on in a single backward traversal.
//!
//! ## Quick Start
//!
//! ```
//! use sg_core::Graph;
//!
//! let mut g = Graph::new();
//! let a = g.leaf(2.0);
//! let b = g.leaf(3.0);
//! let c = g.add(a, b);
//! let d = g.relu(c);
//!
//! g.backward(d);
//!
//! assert_eq!(g.value(d), 5.0);
//! assert_eq!(g.grad(a), 1.0);
//! assert_eq!(g.format(c), "Value(data=5, grad=1)");
//! ```
//!
//! ## Supported Operations
//!
//! | Category | Operations |
//! |----------|------------|
//! | Arithmetic | [`Graph::add`], [`Graph::sub`], [`Graph::mul`], [`Graph::div`], [`Graph::neg`] |
//! | Power | [`Graph::pow`] (x^k for finite constant k) |
//! | Activation | [`Graph::relu`] |
//!
//! Subtraction, division and negation are expressed through the primitive
//! ops (`Add`, `Mul`, `Pow`), so only four local rules exist; see [`Op`].
//!
//! ## Architecture
//!
//! - **[`Graph`]**: Arena owning every node. Builders push new nodes; nothing
//!   is ever re-wired after construction, so the graph is acyclic.
//! - **[`NodeId`]**: Copyable handle into one graph's arena.
//! - **[`Op`]**: Tag selecting the local gradient rule, evaluated by
//!   [`local_gradients`] during the backward pass.
//! - **[`check_gradients`]**: Compares backward-pass gradients against finite
//!   differences.
//!
//! ## Gradient accumulation
//!
//! Gradients are added into each node, never overwritten. A node used twice
//! (`x + x`) or reached along several paths receives every contribution.
//! Repeating [`Graph::backward`] without [`Graph::zero_grad`] adds the same
//! gradients again.
//!
//! ```
//! use sg_core::Graph;
//!
//! let mut g = Graph::new();
//! let x = g.leaf(3.0);
//! let y = g.add(x, x);
//!
//! g.backward(y);
//! assert_eq!(g.grad(x), 2.0);
//!
//! g.backward(y);
//! assert_eq!(g.grad(x), 4.0);
//! ```

mod backward;
mod error;
mod finite_diff;
mod graph;
mod node;
mod ops;

pub use error::{GraphError, Result};
pub use finite_diff::{check_gradients, finite_diff_grad, max_grad_error, GradientCheck};
pub use graph::Graph;
pub use node::{Node, NodeId, Op, Operand};
pub use ops::local_gradients;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_arithmetic() {
        let mut g = Graph::new();
        let x = g.leaf(2.0);
        let y = g.leaf(3.0);

        let sum = g.add(x, y);
        assert!((g.value(sum) - 5.0).abs() < 1e-10);

        let diff = g.sub(x, y);
        assert!((g.value(diff) - (-1.0)).abs() < 1e-10);

        let prod = g.mul(x, y);
        assert!((g.value(prod) - 6.0).abs() < 1e-10);

        let quot = g.div(x, y);
        assert!((g.value(quot) - (2.0 / 3.0)).abs() < 1e-10);

        let neg = g.neg(x);
        assert!((g.value(neg) - (-2.0)).abs() < 1e-10);
    }

    #[test]
    fn test_gradient_add() {
        // z = x + y
        // dz/dx = 1, dz/dy = 1
        let mut g = Graph::new();
        let x = g.leaf(2.0);
        let y = g.leaf(3.0);
        let z = g.add(x, y);

        g.backward(z);
        assert_eq!(g.grad(x), 1.0);
        assert_eq!(g.grad(y), 1.0);
    }

    #[test]
    fn test_gradient_sub() {
        // z = x - y
        // dz/dx = 1, dz/dy = -1
        let mut g = Graph::new();
        let x = g.leaf(2.0);
        let y = g.leaf(3.0);
        let z = g.sub(x, y);

        g.backward(z);
        assert!((g.grad(x) - 1.0).abs() < 1e-10);
        assert!((g.grad(y) - (-1.0)).abs() < 1e-10);
    }

    #[test]
    fn test_gradient_mul() {
        // z = x * y
        // dz/dx = y, dz/dy = x
        let mut g = Graph::new();
        let x = g.leaf(2.0);
        let y = g.leaf(3.0);
        let z = g.mul(x, y);

        g.backward(z);
        assert_eq!(g.grad(x), 3.0);
        assert_eq!(g.grad(y), 2.0);
        assert_eq!(g.grad(z), 1.0);
    }

    #[test]
    fn test_gradient_div() {
        // z = x / y
        // dz/dx = 1/y, dz/dy = -x/y^2
        let mut g = Graph::new();
        let x = g.leaf(2.0);
        let y = g.leaf(4.0);
        let z = g.div(x, y);

        g.backward(z);
        assert!((g.grad(x) - 0.25).abs() < 1e-10);
        assert!((g.grad(y) - (-2.0 / 16.0)).abs() < 1e-10);
    }

    #[test]
    fn test_gradient_neg() {
        let mut g = Graph::new();
        let x = g.leaf(2.0);
        let z = g.neg(x);

        g.backward(z);
        assert!((g.grad(x) - (-1.0)).abs() < 1e-10);
    }

    #[test]
    fn test_gradient_pow() {
        // z = x^2
        // dz/dx = 2x
        let mut g = Graph::new();
        let x = g.leaf(4.0);
        let z = g.pow(x, 2.0).unwrap();

        assert_eq!(g.value(z), 16.0);
        g.backward(z);
        assert!((g.grad(x) - 8.0).abs() < 1e-10);
    }

    #[test]
    fn test_gradient_relu() {
        let mut g = Graph::new();
        let neg = g.leaf(-1.0);
        let r = g.relu(neg);
        assert_eq!(g.value(r), 0.0);
        g.backward(r);
        assert_eq!(g.grad(neg), 0.0);

        let pos = g.leaf(2.0);
        let r = g.relu(pos);
        assert_eq!(g.value(r), 2.0);
        g.backward(r);
        assert_eq!(g.grad(pos), 1.0);
    }

    #[test]
    fn test_reused_variable() {
        // z = x * x
        // dz/dx = 2x
        let mut g = Graph::new();
        let x = g.leaf(3.0);
        let z = g.mul(x, x);

        g.backward(z);
        assert!((g.grad(x) - 6.0).abs() < 1e-10);
    }

    #[test]
    fn test_diamond_graph() {
        // z = (x + y) * (x - y) = x^2 - y^2
        // dz/dx = 2x, dz/dy = -2y
        let mut g = Graph::new();
        let x = g.leaf(3.0);
        let y = g.leaf(2.0);
        let a = g.add(x, y);
        let b = g.sub(x, y);
        let z = g.mul(a, b);

        g.backward(z);
        assert!((g.value(z) - 5.0).abs() < 1e-10);
        assert!((g.grad(x) - 6.0).abs() < 1e-10);
        assert!((g.grad(y) - (-4.0)).abs() < 1e-10);
    }

    #[test]
    fn test_canonical_scenario() {
        let mut g = Graph::new();
        let a = g.leaf(2.0);
        let b = g.leaf(3.0);
        let c = g.add(a, b);
        let d = g.relu(c);

        assert_eq!(g.value(c), 5.0);
        assert_eq!(g.value(d), 5.0);

        g.backward(d);

        assert_eq!(g.format(a), "Value(data=2, grad=1)");
        assert_eq!(g.format(b), "Value(data=3, grad=1)");
        assert_eq!(g.format(c), "Value(data=5, grad=1)");
        assert_eq!(g.format(d), "Value(data=5, grad=1)");
    }

    #[test]
    fn test_complex_expression() {
        // z = (x*y + x^3) / (y + 2)
        let build = |g: &mut Graph, v: &[NodeId]| -> Result<NodeId> {
            let xy = g.mul(v[0], v[1]);
            let x3 = g.pow(v[0], 3.0)?;
            let num = g.add(xy, x3);
            let den = g.add(v[1], 2.0);
            Ok(g.div(num, den))
        };

        let check = check_gradients(build, &[1.0, 2.0], 1e-7).unwrap();

        let expected_value = (1.0 * 2.0 + 1.0) / (2.0 + 2.0);
        assert!((check.value - expected_value).abs() < 1e-10);
        assert!(check.max_error() < 1e-5);
    }
}
