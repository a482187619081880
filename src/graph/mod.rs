//! Dialogue graph definition and compilation.
//!
//! A graph is declared with [`GraphBuilder`] (nodes, unconditional edges,
//! conditional route tables, interrupt sets), validated by `compile()`, and
//! executed by [`ExecutionEngine`](crate::engine::ExecutionEngine).

pub mod builder;
pub mod edges;
#[allow(clippy::module_inception)]
pub mod graph;
pub mod topology;

pub use builder::{GraphBuilder, GraphError};
pub use edges::{EdgeTarget, RouteTable};
pub use graph::DialogueGraph;
pub use topology::appointment_assistant_graph;
