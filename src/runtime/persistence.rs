//! Serde-friendly persistence models for checkpoints.
//!
//! Pure data transformation: no I/O lives here. Node ids are stored in their
//! `encode()` string form so the database rows stay readable, and a string
//! that no longer decodes surfaces as a corrupt-checkpoint error instead of a
//! wrong resume point.

use serde::{Deserialize, Serialize};

use super::checkpoint::{Checkpoint, CheckpointError};
use crate::state::DialogueState;
use crate::types::NodeId;

/// Persisted shape of a [`Checkpoint`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PersistedCheckpoint {
    pub session_id: String,
    pub state: DialogueState,
    /// Encoded node ids, see [`NodeId::encode`].
    #[serde(default)]
    pub next_nodes: Vec<String>,
    #[serde(default)]
    pub interrupted: bool,
    /// RFC3339 creation time.
    pub created_at: String,
}

impl From<&Checkpoint> for PersistedCheckpoint {
    fn from(cp: &Checkpoint) -> Self {
        Self {
            session_id: cp.session_id.clone(),
            state: cp.state.clone(),
            next_nodes: cp.next_nodes.iter().map(|n| n.encode().to_string()).collect(),
            interrupted: cp.interrupted,
            created_at: cp.created_at.to_rfc3339(),
        }
    }
}

impl TryFrom<PersistedCheckpoint> for Checkpoint {
    type Error = CheckpointError;

    fn try_from(p: PersistedCheckpoint) -> Result<Self, Self::Error> {
        let next_nodes = p
            .next_nodes
            .iter()
            .map(|s| {
                NodeId::decode(s).ok_or_else(|| CheckpointError::Corrupt {
                    what: format!("unknown node id {s:?}"),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let created_at = chrono::DateTime::parse_from_rfc3339(&p.created_at)
            .map(|dt| dt.with_timezone(&chrono::Utc))
            .unwrap_or_else(|_| chrono::Utc::now());
        Ok(Checkpoint {
            session_id: p.session_id,
            state: p.state,
            next_nodes,
            interrupted: p.interrupted,
            created_at,
        })
    }
}

/// Serialize a state for storage.
pub fn state_to_json(state: &DialogueState) -> Result<String, CheckpointError> {
    serde_json::to_string(state).map_err(|source| CheckpointError::Serde { source })
}

/// Deserialize a stored state.
pub fn state_from_json(json: &str) -> Result<DialogueState, CheckpointError> {
    serde_json::from_str(json).map_err(|source| CheckpointError::Serde { source })
}
