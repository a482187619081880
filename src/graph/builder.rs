//! Fluent builder for dialogue graphs.

use std::sync::Arc;

use miette::Diagnostic;
use rustc_hash::{FxHashMap, FxHashSet};
use thiserror::Error;

use super::edges::{EdgeTarget, RouteTable};
use super::graph::DialogueGraph;
use crate::node::Node;
use crate::types::NodeId;

/// Configuration errors detected when compiling a graph.
///
/// These are programming mistakes, not runtime conditions: a graph that
/// compiles has a registered implementation behind every reachable node and a
/// declared destination behind every edge.
#[derive(Debug, Error, Diagnostic)]
pub enum GraphError {
    #[error("graph has no entry node")]
    #[diagnostic(
        code(careflow::graph::missing_entry),
        help("Call with_entry(...) before compile().")
    )]
    MissingEntry,

    #[error("entry node {node} is not registered")]
    #[diagnostic(code(careflow::graph::unknown_entry))]
    UnknownEntry { node: NodeId },

    #[error("edge from {from} references unregistered node {to}")]
    #[diagnostic(
        code(careflow::graph::unknown_target),
        help("Register the destination with add_node(...) or remove the edge.")
    )]
    UnknownTarget { from: NodeId, to: NodeId },

    #[error("node {node} has both an unconditional and a conditional edge")]
    #[diagnostic(code(careflow::graph::conflicting_edges))]
    ConflictingEdges { node: NodeId },

    #[error("node {node} has an empty route table")]
    #[diagnostic(code(careflow::graph::empty_route_table))]
    EmptyRouteTable { node: NodeId },

    #[error("node {node} is registered but has no outgoing edge")]
    #[diagnostic(
        code(careflow::graph::dangling_node),
        help("Add an edge, a conditional edge, or an explicit edge to End.")
    )]
    DanglingNode { node: NodeId },

    #[error("interrupt configuration references unregistered node {node}")]
    #[diagnostic(code(careflow::graph::unknown_interrupt))]
    UnknownInterrupt { node: NodeId },
}

/// Builder for [`DialogueGraph`] with a fluent API.
pub struct GraphBuilder {
    nodes: FxHashMap<NodeId, Arc<dyn Node>>,
    edges: FxHashMap<NodeId, EdgeTarget>,
    conditional_edges: FxHashMap<NodeId, RouteTable>,
    entry: Option<NodeId>,
    interrupt_after: FxHashSet<NodeId>,
    interrupt_before: FxHashSet<NodeId>,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: FxHashMap::default(),
            edges: FxHashMap::default(),
            conditional_edges: FxHashMap::default(),
            entry: None,
            interrupt_after: FxHashSet::default(),
            interrupt_before: FxHashSet::default(),
        }
    }

    /// Register a node implementation under its identifier.
    #[must_use]
    pub fn add_node(mut self, id: NodeId, node: impl Node + 'static) -> Self {
        self.nodes.insert(id, Arc::new(node));
        self
    }

    /// Add an unconditional edge.
    #[must_use]
    pub fn add_edge(mut self, from: NodeId, to: NodeId) -> Self {
        self.edges.insert(from, EdgeTarget::Node(to));
        self
    }

    /// Mark a node as terminal: its turn ends the session's active flow.
    #[must_use]
    pub fn add_edge_to_end(mut self, from: NodeId) -> Self {
        self.edges.insert(from, EdgeTarget::End);
        self
    }

    /// Add a conditional edge driven by the node's route value.
    #[must_use]
    pub fn add_conditional_edge(mut self, from: NodeId, table: RouteTable) -> Self {
        self.conditional_edges.insert(from, table);
        self
    }

    /// Set the node where fresh sessions begin.
    #[must_use]
    pub fn with_entry(mut self, entry: NodeId) -> Self {
        self.entry = Some(entry);
        self
    }

    /// Suspend the turn after each of these nodes runs.
    #[must_use]
    pub fn interrupt_after(mut self, nodes: impl IntoIterator<Item = NodeId>) -> Self {
        self.interrupt_after.extend(nodes);
        self
    }

    /// Suspend the turn before each of these nodes runs.
    #[must_use]
    pub fn interrupt_before(mut self, nodes: impl IntoIterator<Item = NodeId>) -> Self {
        self.interrupt_before.extend(nodes);
        self
    }

    /// Validate the topology and produce an executable graph.
    pub fn compile(self) -> Result<DialogueGraph, GraphError> {
        let entry = self.entry.ok_or(GraphError::MissingEntry)?;
        if !self.nodes.contains_key(&entry) {
            return Err(GraphError::UnknownEntry { node: entry });
        }

        for (from, target) in &self.edges {
            if self.conditional_edges.contains_key(from) {
                return Err(GraphError::ConflictingEdges { node: *from });
            }
            if let EdgeTarget::Node(to) = target
                && !self.nodes.contains_key(to)
            {
                return Err(GraphError::UnknownTarget {
                    from: *from,
                    to: *to,
                });
            }
        }
        for (from, table) in &self.conditional_edges {
            if table.is_empty() {
                return Err(GraphError::EmptyRouteTable { node: *from });
            }
            for (_, target) in table.targets() {
                if let EdgeTarget::Node(to) = target
                    && !self.nodes.contains_key(to)
                {
                    return Err(GraphError::UnknownTarget {
                        from: *from,
                        to: *to,
                    });
                }
            }
        }
        for node in self.nodes.keys() {
            if !self.edges.contains_key(node) && !self.conditional_edges.contains_key(node) {
                return Err(GraphError::DanglingNode { node: *node });
            }
        }
        for node in self.interrupt_after.iter().chain(self.interrupt_before.iter()) {
            if !self.nodes.contains_key(node) {
                return Err(GraphError::UnknownInterrupt { node: *node });
            }
        }

        Ok(DialogueGraph::from_parts(
            self.nodes,
            self.edges,
            self.conditional_edges,
            entry,
            self.interrupt_after,
            self.interrupt_before,
        ))
    }
}
