//! Core data structures for the computation graph.
//!
//! Nodes live in a [`Graph`](crate::Graph) arena and refer to their operands
//! by [`NodeId`]. A node never gains operands after it is pushed, so the
//! arena is a DAG in creation order: every operand has a smaller index than
//! the node that uses it.

use std::fmt;

/// Handle to a node in a [`Graph`](crate::Graph).
///
/// Carries the arena index and the id of the graph that issued it, so a
/// handle from one graph is never silently resolved against another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    pub(crate) graph: u64,
    pub(crate) index: usize,
}

impl NodeId {
    /// Position of the node in its graph's arena.
    pub fn index(self) -> usize {
        self.index
    }
}

/// The local differentiation rule attached to a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Op {
    /// User-supplied constant or variable; no operands.
    Leaf,
    /// Addition: operands[0] + operands[1]
    Add,
    /// Multiplication: operands[0] * operands[1]
    Mul,
    /// Power with constant exponent: operands[0]^exponent
    Pow { exponent: f64 },
    /// Rectified linear unit: max(0, operands[0])
    Relu,
}

impl Op {
    /// Number of operands a node with this op carries.
    pub fn arity(&self) -> usize {
        match self {
            Op::Leaf => 0,
            Op::Pow { .. } | Op::Relu => 1,
            Op::Add | Op::Mul => 2,
        }
    }

    /// Human-readable tag, used only for diagnostics.
    pub fn label(&self) -> String {
        match self {
            Op::Leaf => String::new(),
            Op::Add => "+".to_string(),
            Op::Mul => "*".to_string(),
            Op::Pow { exponent } => format!("**{exponent}"),
            Op::Relu => "ReLU".to_string(),
        }
    }
}

/// A single node: forward value, accumulated gradient, and how it was made.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub(crate) value: f64,
    pub(crate) grad: f64,
    pub(crate) op: Op,
    /// One entry per use site; `x + x` lists `x` twice.
    pub(crate) operands: Vec<NodeId>,
}

impl Node {
    pub(crate) fn new(value: f64, op: Op, operands: Vec<NodeId>) -> Self {
        debug_assert_eq!(op.arity(), operands.len());
        Node {
            value,
            grad: 0.0,
            op,
            operands,
        }
    }

    /// Forward value.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Gradient accumulated by backward passes so far.
    pub fn grad(&self) -> f64 {
        self.grad
    }

    pub fn op(&self) -> Op {
        self.op
    }

    pub fn operands(&self) -> &[NodeId] {
        &self.operands
    }

    pub fn label(&self) -> String {
        self.op.label()
    }

    pub fn is_leaf(&self) -> bool {
        self.operands.is_empty()
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Value(data={}, grad={})", self.value, self.grad)
    }
}

/// Right-hand (or scalar-first left-hand) argument of a binary builder.
///
/// A scalar is wrapped into a fresh leaf when the node is built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operand {
    Node(NodeId),
    Scalar(f64),
}

impl From<NodeId> for Operand {
    fn from(id: NodeId) -> Self {
        Operand::Node(id)
    }
}

impl From<f64> for Operand {
    fn from(value: f64) -> Self {
        Operand::Scalar(value)
    }
}
