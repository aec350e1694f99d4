//! Local gradient computations for each operation.
//!
//! Each op knows its partial derivatives with respect to its operands,
//! evaluated at the recorded forward values. The backward pass multiplies
//! them by the node's adjoint and adds the products into the operands.

use crate::node::Op;

/// Compute local gradients d(out)/d(operand_i) for a node.
///
/// `operands` holds the operand values in use-site order and `out` is the
/// node's own forward value. Returns one entry per operand.
pub fn local_gradients(op: Op, operands: &[f64], out: f64) -> Vec<f64> {
    match op {
        // No operands
        Op::Leaf => vec![],

        // z = a + b
        // dz/da = 1, dz/db = 1
        Op::Add => vec![1.0, 1.0],

        // z = a * b
        // dz/da = b, dz/db = a
        Op::Mul => vec![operands[1], operands[0]],

        // z = a^k (k constant)
        // dz/da = k * a^(k-1)
        Op::Pow { exponent } => vec![exponent * operands[0].powf(exponent - 1.0)],

        // z = max(0, a)
        // dz/da = 1 if z > 0, else 0 (including the kink at a = 0)
        Op::Relu => vec![if out > 0.0 { 1.0 } else { 0.0 }],
    }
}
