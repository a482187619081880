//! The node execution contract.
//!
//! A node is one unit of work in the dialogue graph: it receives the session
//! state, optionally consults a single collaborator, and returns the updated
//! state. Nodes are stateless beyond their injected collaborator references.
//!
//! Fatal errors (missing required state, impossible preconditions) abort the
//! turn via [`NodeError`]; collaborator failures are recovered inside the
//! node with the documented fallback values and reported through the
//! observer, so the turn continues.

use std::sync::Arc;

use async_trait::async_trait;
use miette::Diagnostic;
use thiserror::Error;

use crate::collaborators::repository::RepositoryError;
use crate::observe::{DialogueEvent, DialogueObserver};
use crate::state::DialogueState;
use crate::types::NodeId;

/// A processing step in the dialogue graph.
#[async_trait]
pub trait Node: Send + Sync {
    /// Apply this node to the session state.
    async fn run(&self, state: DialogueState, ctx: NodeContext)
    -> Result<DialogueState, NodeError>;
}

/// Execution context handed to each node invocation.
#[derive(Clone)]
pub struct NodeContext {
    pub session_id: String,
    /// Turn number (the state version being processed).
    pub turn: u32,
    pub observer: Arc<dyn DialogueObserver>,
}

impl NodeContext {
    /// Report that a collaborator call failed and a fallback value was used.
    pub fn collaborator_fallback(
        &self,
        node: NodeId,
        collaborator: &'static str,
        reason: impl Into<String>,
    ) {
        self.observer.observe(&DialogueEvent::CollaboratorFallback {
            node,
            collaborator,
            reason: reason.into(),
        });
    }
}

/// Fatal node-level errors. These abort the turn; the previously persisted
/// checkpoint stays intact.
#[derive(Debug, Error, Diagnostic)]
pub enum NodeError {
    /// Required state is missing, e.g. a confirmation step reached without a
    /// resolved appointment.
    #[error("missing expected input: {what}")]
    #[diagnostic(
        code(careflow::node::missing_input),
        help("Check that the upstream node populated the required field.")
    )]
    MissingInput { what: &'static str },

    /// State is present but inconsistent with the node's preconditions.
    #[error("validation failed: {0}")]
    #[diagnostic(code(careflow::node::validation))]
    ValidationFailed(String),

    /// A repository failure that the node could not degrade safely.
    #[error(transparent)]
    #[diagnostic(code(careflow::node::repository))]
    Repository(#[from] RepositoryError),
}
