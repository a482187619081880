//! Edge types for the dialogue graph.
//!
//! A node has either one unconditional edge or one conditional edge backed by
//! a [`RouteTable`]. Route tables are closed maps from [`Route`] values to
//! destinations; a route the table does not declare is a configuration error
//! the engine reports loudly instead of picking an arbitrary branch.

use rustc_hash::FxHashMap;

use crate::types::{NodeId, Route};

/// Destination of an edge: another node, or the end of the session's flow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EdgeTarget {
    Node(NodeId),
    End,
}

/// Declared destinations for a conditional edge, keyed by route value.
#[derive(Clone, Debug, Default)]
pub struct RouteTable {
    targets: FxHashMap<Route, EdgeTarget>,
}

impl RouteTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Map a route value to a destination node.
    #[must_use]
    pub fn route(mut self, route: Route, to: NodeId) -> Self {
        self.targets.insert(route, EdgeTarget::Node(to));
        self
    }

    /// Map a route value to the terminal target.
    #[must_use]
    pub fn route_end(mut self, route: Route) -> Self {
        self.targets.insert(route, EdgeTarget::End);
        self
    }

    /// Resolve a route value, if declared.
    #[must_use]
    pub fn target(&self, route: Route) -> Option<EdgeTarget> {
        self.targets.get(&route).copied()
    }

    pub(crate) fn targets(&self) -> impl Iterator<Item = (&Route, &EdgeTarget)> {
        self.targets.iter()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}
