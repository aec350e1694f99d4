//! The node arena and the operation builders.
//!
//! Every builder reads its operands' values, pushes one new node holding the
//! forward result and the op tag, and returns the new handle. Operands are
//! never touched during construction.

use std::ops::Index;
use std::sync::atomic::{AtomicU64, Ordering};

use log::warn;

use crate::error::{GraphError, Result};
use crate::node::{Node, NodeId, Op, Operand};

/// Global counter for stamping graph identities into handles.
static GRAPH_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

fn next_graph_id() -> u64 {
    GRAPH_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// Arena holding every node of one computation graph.
///
/// Nodes are addressed by [`NodeId`] and stay alive as long as the graph
/// does. Sharing a subexpression is just reusing its handle, so diamond
/// dependencies need no reference counting.
#[derive(Debug, Clone)]
pub struct Graph {
    id: u64,
    pub(crate) nodes: Vec<Node>,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    pub fn new() -> Self {
        Graph {
            id: next_graph_id(),
            nodes: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Graph {
            id: next_graph_id(),
            nodes: Vec::with_capacity(capacity),
        }
    }

    /// Number of nodes in the arena, leaves included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up a node, returning `None` for handles issued by another graph.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        if id.graph != self.id {
            return None;
        }
        self.nodes.get(id.index)
    }

    /// Iterate over all nodes in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        let graph = self.id;
        self.nodes
            .iter()
            .enumerate()
            .map(move |(index, node)| (NodeId { graph, index }, node))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.check(id);
        &mut self.nodes[id.index]
    }

    fn check(&self, id: NodeId) {
        assert!(
            id.graph == self.id && id.index < self.nodes.len(),
            "node {} does not belong to graph {}",
            id.index,
            self.id
        );
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId {
            graph: self.id,
            index: self.nodes.len(),
        };
        self.nodes.push(node);
        id
    }

    /// Resolve an operand to a node, wrapping scalars into fresh leaves.
    fn operand(&mut self, operand: Operand) -> NodeId {
        match operand {
            Operand::Node(id) => {
                self.check(id);
                id
            }
            Operand::Scalar(value) => self.leaf(value),
        }
    }

    // === Accessors ===
    //
    // All of these panic if `id` was issued by a different graph.

    pub fn value(&self, id: NodeId) -> f64 {
        self[id].value
    }

    pub fn grad(&self, id: NodeId) -> f64 {
        self[id].grad
    }

    pub fn op(&self, id: NodeId) -> Op {
        self[id].op
    }

    pub fn operands(&self, id: NodeId) -> &[NodeId] {
        &self[id].operands
    }

    pub fn label(&self, id: NodeId) -> String {
        self[id].label()
    }

    /// Render a node as `Value(data=<value>, grad=<grad>)`.
    pub fn format(&self, id: NodeId) -> String {
        self[id].to_string()
    }

    // === Leaves ===

    /// Create a leaf with zero gradient and no operands.
    pub fn leaf(&mut self, value: f64) -> NodeId {
        self.push(Node::new(value, Op::Leaf, vec![]))
    }

    // === Binary operations ===

    /// `lhs + rhs`. Either side may be a scalar, so `add(2.0, x)` keeps `x`
    /// as an operand of the result.
    pub fn add(&mut self, lhs: impl Into<Operand>, rhs: impl Into<Operand>) -> NodeId {
        let a = self.operand(lhs.into());
        let b = self.operand(rhs.into());
        let value = self.nodes[a.index].value + self.nodes[b.index].value;
        self.push(Node::new(value, Op::Add, vec![a, b]))
    }

    /// `lhs * rhs`.
    pub fn mul(&mut self, lhs: NodeId, rhs: impl Into<Operand>) -> NodeId {
        let a = self.operand(lhs.into());
        let b = self.operand(rhs.into());
        let value = self.nodes[a.index].value * self.nodes[b.index].value;
        self.push(Node::new(value, Op::Mul, vec![a, b]))
    }

    /// `lhs - rhs`, built as `lhs + (-rhs)`.
    ///
    /// A scalar `rhs` is folded into a single `-rhs` leaf.
    pub fn sub(&mut self, lhs: NodeId, rhs: impl Into<Operand>) -> NodeId {
        match rhs.into() {
            Operand::Node(b) => {
                let neg_b = self.neg(b);
                self.add(lhs, neg_b)
            }
            Operand::Scalar(c) => self.add(lhs, -c),
        }
    }

    /// `lhs / rhs`, built as `lhs * rhs^-1`.
    ///
    /// A scalar `rhs` is folded into a single `1/rhs` leaf. Dividing by zero
    /// yields `Inf`/`NaN`, not an error.
    pub fn div(&mut self, lhs: NodeId, rhs: impl Into<Operand>) -> NodeId {
        match rhs.into() {
            Operand::Node(b) => {
                let inv_b = self.pow_unchecked(b, -1.0);
                self.mul(lhs, inv_b)
            }
            Operand::Scalar(c) => self.mul(lhs, 1.0 / c),
        }
    }

    // === Unary operations ===

    /// `-a`, built as `a * -1`.
    pub fn neg(&mut self, a: NodeId) -> NodeId {
        self.mul(a, -1.0)
    }

    /// Raise to a constant power: `a^exponent`.
    ///
    /// Fails with [`GraphError::InvalidExponent`] if the exponent is NaN or
    /// infinite; nothing is pushed in that case.
    pub fn pow(&mut self, a: NodeId, exponent: f64) -> Result<NodeId> {
        if !exponent.is_finite() {
            warn!("rejecting pow with non-finite exponent {exponent}");
            return Err(GraphError::InvalidExponent { exponent });
        }
        Ok(self.pow_unchecked(a, exponent))
    }

    fn pow_unchecked(&mut self, a: NodeId, exponent: f64) -> NodeId {
        self.check(a);
        let value = self.nodes[a.index].value.powf(exponent);
        self.push(Node::new(value, Op::Pow { exponent }, vec![a]))
    }

    /// Rectified linear unit: `max(0, a)`.
    pub fn relu(&mut self, a: NodeId) -> NodeId {
        self.check(a);
        let x = self.nodes[a.index].value;
        let value = if x < 0.0 { 0.0 } else { x };
        self.push(Node::new(value, Op::Relu, vec![a]))
    }

    // === Gradients ===

    /// Seed `root` with 1 and add d(root)/d(node) into every reachable node.
    ///
    /// Gradients accumulate on top of whatever earlier passes left behind;
    /// call [`Graph::zero_grad`] first for a fresh result.
    pub fn backward(&mut self, root: NodeId) {
        crate::backward::backward(self, root)
    }

    /// Nodes reachable from `root`, each once, operands before their users.
    pub fn topological_order(&self, root: NodeId) -> Vec<NodeId> {
        crate::backward::topological_sort(self, root)
    }

    /// Reset every node's gradient to zero.
    pub fn zero_grad(&mut self) {
        for node in &mut self.nodes {
            node.grad = 0.0;
        }
    }
}

impl Index<NodeId> for Graph {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        self.check(id);
        &self.nodes[id.index]
    }
}
