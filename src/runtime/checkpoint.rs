//! Durable per-session checkpoints.
//!
//! A checkpoint is the latest snapshot of a session: its state, the nodes it
//! is paused before, and whether it is waiting for input. It is overwritten
//! every turn and never expired by this core; retention is an operational
//! concern.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use miette::Diagnostic;
use rustc_hash::FxHashMap;
use std::sync::Mutex;
use thiserror::Error;

use crate::engine::TurnOutcome;
use crate::state::DialogueState;
use crate::types::NodeId;

/// The durable snapshot of one session.
#[derive(Clone, Debug, PartialEq)]
pub struct Checkpoint {
    pub session_id: String,
    pub state: DialogueState,
    /// Nodes the graph is paused before, in resume order. Empty when the
    /// session reached a terminal node.
    pub next_nodes: Vec<NodeId>,
    pub interrupted: bool,
    pub created_at: DateTime<Utc>,
}

impl Checkpoint {
    /// Build the checkpoint for a completed turn.
    #[must_use]
    pub fn from_outcome(session_id: &str, outcome: &TurnOutcome) -> Self {
        Self {
            session_id: session_id.to_string(),
            state: outcome.state.clone(),
            next_nodes: outcome.next_nodes(),
            interrupted: outcome.interrupted(),
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum CheckpointError {
    #[error("checkpoint backend error: {message}")]
    #[diagnostic(
        code(careflow::checkpoint::backend),
        help("Check storage connectivity; the previous checkpoint is still intact.")
    )]
    Backend { message: String },

    #[error("checkpoint serialization failed: {source}")]
    #[diagnostic(code(careflow::checkpoint::serde))]
    Serde {
        #[source]
        source: serde_json::Error,
    },

    #[error("persisted checkpoint is corrupt: {what}")]
    #[diagnostic(
        code(careflow::checkpoint::corrupt),
        help("The row cannot be resumed; it must be repaired or removed out of band.")
    )]
    Corrupt { what: String },
}

pub type Result<T> = std::result::Result<T, CheckpointError>;

/// Durable storage for the latest checkpoint of each session.
///
/// Implementations must provide session-scoped read-your-writes: a `load`
/// after a completed `save` for the same session observes that save.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    async fn load(&self, session_id: &str) -> Result<Option<Checkpoint>>;
    async fn save(&self, checkpoint: Checkpoint) -> Result<()>;
}

/// Volatile store for tests and development.
#[derive(Debug, Default)]
pub struct InMemoryCheckpointStore {
    inner: Mutex<FxHashMap<String, Checkpoint>>,
}

impl InMemoryCheckpointStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CheckpointStore for InMemoryCheckpointStore {
    async fn load(&self, session_id: &str) -> Result<Option<Checkpoint>> {
        let map = self.inner.lock().map_err(|_| CheckpointError::Backend {
            message: "in-memory store poisoned".to_string(),
        })?;
        Ok(map.get(session_id).cloned())
    }

    async fn save(&self, checkpoint: Checkpoint) -> Result<()> {
        let mut map = self.inner.lock().map_err(|_| CheckpointError::Backend {
            message: "in-memory store poisoned".to_string(),
        })?;
        map.insert(checkpoint.session_id.clone(), checkpoint);
        Ok(())
    }
}
