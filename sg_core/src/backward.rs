//! Reverse-mode automatic differentiation implementation.
//!
//! The backward pass computes gradients by:
//! 1. Building a topological ordering of nodes reachable from the root
//! 2. Traversing in reverse order, propagating adjoints from root to leaves
//! 3. Adding each node's adjoint into its stored gradient

use std::collections::{HashMap, HashSet};

use log::{debug, trace};

use crate::graph::Graph;
use crate::node::NodeId;
use crate::ops::local_gradients;

/// Propagate d(root)/d(node) to every node reachable from `root`.
///
/// Adjoints for this pass are collected in a scratch map and only then added
/// into the nodes' `grad`, so running twice without a reset doubles every
/// gradient exactly.
pub(crate) fn backward(graph: &mut Graph, root: NodeId) {
    let topo_order = topological_sort(graph, root);
    debug!(
        "backward from node {} over {} nodes",
        root.index(),
        topo_order.len()
    );

    // d(root)/d(root) = 1
    let mut adjoints: HashMap<NodeId, f64> = HashMap::with_capacity(topo_order.len());
    adjoints.insert(root, 1.0);

    // Root first, leaves last: every user of a node is processed before it.
    for &id in topo_order.iter().rev() {
        let node = &graph[id];
        if node.is_leaf() {
            continue;
        }
        let node_adjoint = adjoints.get(&id).copied().unwrap_or(0.0);

        let operand_values: Vec<f64> = node.operands.iter().map(|&o| graph[o].value).collect();
        let local_grads = local_gradients(node.op, &operand_values, node.value);
        trace!(
            "node {} ({}) adjoint={} local={:?}",
            id.index(),
            node.op.label(),
            node_adjoint,
            local_grads
        );

        for (operand, local_grad) in node.operands.iter().zip(local_grads) {
            // Chain rule, accumulated per use site
            *adjoints.entry(*operand).or_insert(0.0) += node_adjoint * local_grad;
        }
    }

    for &id in &topo_order {
        let adjoint = adjoints.get(&id).copied().unwrap_or(0.0);
        graph.node_mut(id).grad += adjoint;
    }

    debug!("backward from node {} done", root.index());
}

/// Build a topological ordering of all nodes reachable from `root`.
///
/// Depth-first postorder with an explicit stack, so arbitrarily deep graphs
/// do not exhaust the call stack. Each node appears once, after all of its
/// operands.
pub(crate) fn topological_sort(graph: &Graph, root: NodeId) -> Vec<NodeId> {
    let mut visited = HashSet::new();
    let mut order = Vec::new();

    // (node, operands already scheduled)
    let mut stack = vec![(root, false)];

    while let Some((id, expanded)) = stack.pop() {
        if expanded {
            order.push(id);
            continue;
        }
        if !visited.insert(id) {
            continue;
        }

        stack.push((id, true));
        // Reversed so operands are emitted in use-site order
        for &operand in graph[id].operands.iter().rev() {
            if !visited.contains(&operand) {
                stack.push((operand, false));
            }
        }
    }

    order
}
