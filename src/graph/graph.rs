//! The compiled, executable dialogue graph.

use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};

use super::edges::{EdgeTarget, RouteTable};
use crate::node::Node;
use crate::types::NodeId;

/// A validated graph: every edge points at a registered node, and interrupt
/// sets reference real nodes. Produced by [`GraphBuilder::compile`].
///
/// [`GraphBuilder::compile`]: super::builder::GraphBuilder::compile
#[derive(Clone)]
pub struct DialogueGraph {
    nodes: FxHashMap<NodeId, Arc<dyn Node>>,
    edges: FxHashMap<NodeId, EdgeTarget>,
    conditional_edges: FxHashMap<NodeId, RouteTable>,
    entry: NodeId,
    interrupt_after: FxHashSet<NodeId>,
    interrupt_before: FxHashSet<NodeId>,
}

impl std::fmt::Debug for DialogueGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialogueGraph")
            .field("nodes", &self.nodes.keys().collect::<Vec<_>>())
            .field("edges", &self.edges)
            .field("conditional_edges", &self.conditional_edges)
            .field("entry", &self.entry)
            .field("interrupt_after", &self.interrupt_after)
            .field("interrupt_before", &self.interrupt_before)
            .finish()
    }
}

impl DialogueGraph {
    pub(crate) fn from_parts(
        nodes: FxHashMap<NodeId, Arc<dyn Node>>,
        edges: FxHashMap<NodeId, EdgeTarget>,
        conditional_edges: FxHashMap<NodeId, RouteTable>,
        entry: NodeId,
        interrupt_after: FxHashSet<NodeId>,
        interrupt_before: FxHashSet<NodeId>,
    ) -> Self {
        Self {
            nodes,
            edges,
            conditional_edges,
            entry,
            interrupt_after,
            interrupt_before,
        }
    }

    /// Entry node for fresh sessions.
    #[must_use]
    pub fn entry(&self) -> NodeId {
        self.entry
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Arc<dyn Node>> {
        self.nodes.get(&id)
    }

    /// Static edge leaving `from`, if declared.
    #[must_use]
    pub fn edge(&self, from: NodeId) -> Option<EdgeTarget> {
        self.edges.get(&from).copied()
    }

    /// Conditional route table leaving `from`, if declared.
    #[must_use]
    pub fn route_table(&self, from: NodeId) -> Option<&RouteTable> {
        self.conditional_edges.get(&from)
    }

    #[must_use]
    pub fn is_interrupt_after(&self, node: NodeId) -> bool {
        self.interrupt_after.contains(&node)
    }

    #[must_use]
    pub fn is_interrupt_before(&self, node: NodeId) -> bool {
        self.interrupt_before.contains(&node)
    }
}
