//! The turn surface exposed to the transport layer.
//!
//! [`DialogueAssistant::handle_turn`] is the single operation a transport
//! needs: load-or-init the session, run the graph to the next interrupt or
//! terminal node, persist the checkpoint, and return the state whose last
//! history entry carries the reply.

use std::sync::Arc;

use miette::Diagnostic;
use thiserror::Error;
use tracing::instrument;

use crate::collaborators::classifier::Classifier;
use crate::collaborators::repository::Repository;
use crate::engine::{EngineError, ExecutionEngine};
use crate::graph::{appointment_assistant_graph, DialogueGraph, GraphError};
use crate::observe::{DialogueEvent, DialogueObserver, TracingObserver};
use crate::runtime::checkpoint::{Checkpoint, CheckpointError, CheckpointStore};
use crate::runtime::config::{CheckpointBackend, RuntimeConfig};
use crate::runtime::locks::SessionLocks;
use crate::runtime::InMemoryCheckpointStore;
use crate::state::DialogueState;

/// Reply shown when a turn aborts on an internal failure. The previously
/// persisted checkpoint is untouched, so the caller can simply retry.
pub const GENERIC_FAILURE_REPLY: &str =
    "I'm sorry, something went wrong on my end. Could you try that again?";

#[derive(Debug, Error, Diagnostic)]
pub enum TurnError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Checkpoint(#[from] CheckpointError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Graph(#[from] GraphError),
}

/// Drives multi-turn conversations over a compiled dialogue graph.
pub struct DialogueAssistant {
    graph: Arc<DialogueGraph>,
    engine: ExecutionEngine,
    store: Arc<dyn CheckpointStore>,
    locks: SessionLocks,
    observer: Arc<dyn DialogueObserver>,
}

impl DialogueAssistant {
    /// Assemble an assistant from already-built parts.
    pub fn new(
        graph: DialogueGraph,
        store: Arc<dyn CheckpointStore>,
        observer: Arc<dyn DialogueObserver>,
        config: &RuntimeConfig,
    ) -> Self {
        let graph = Arc::new(graph);
        let engine = ExecutionEngine::with_observer(graph.clone(), observer.clone())
            .with_max_steps(config.max_steps_per_turn);
        Self {
            graph,
            engine,
            store,
            locks: SessionLocks::new(),
            observer,
        }
    }

    /// Build the canonical appointment-assistant graph and the configured
    /// checkpoint backend.
    pub async fn connect(
        classifier: Arc<dyn Classifier>,
        repository: Arc<dyn Repository>,
        config: RuntimeConfig,
    ) -> Result<Self, TurnError> {
        let graph = appointment_assistant_graph(classifier, repository, &config)?;
        let store: Arc<dyn CheckpointStore> = match &config.checkpoint {
            CheckpointBackend::InMemory => Arc::new(InMemoryCheckpointStore::new()),
            #[cfg(feature = "sqlite")]
            CheckpointBackend::Sqlite => {
                let db_name = config
                    .sqlite_db_name
                    .clone()
                    .unwrap_or_else(|| "careflow.db".to_string());
                let url = format!("sqlite://{db_name}");
                Arc::new(crate::runtime::SqliteCheckpointStore::connect(&url).await?)
            }
        };
        Ok(Self::new(
            graph,
            store,
            Arc::new(TracingObserver),
            &config,
        ))
    }

    /// Generate a fresh session identifier for callers that don't supply one.
    #[must_use]
    pub fn generate_session_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    /// Process one inbound message for a session.
    ///
    /// Retried requests are idempotent: if the persisted checkpoint was
    /// produced by the same `request_id`, the stored state is returned
    /// without re-running anything, so a retry can never double-apply an
    /// appointment status change.
    #[instrument(skip(self, user_message), err)]
    pub async fn handle_turn(
        &self,
        session_id: &str,
        request_id: &str,
        user_message: &str,
    ) -> Result<DialogueState, TurnError> {
        let lock = self.locks.acquire(session_id);
        let _guard = lock.lock().await;

        let existing = self.store.load(session_id).await?;
        if let Some(cp) = &existing
            && cp.state.last_request_id.as_deref() == Some(request_id)
        {
            tracing::info!(session = %session_id, request = %request_id, "duplicate request; returning persisted state");
            return Ok(cp.state.clone());
        }

        let (state, start) = match existing {
            Some(cp) if cp.interrupted => {
                let mut state = cp.state;
                state.begin_turn(request_id, user_message);
                let start = cp.next_nodes.first().copied().unwrap_or(self.graph.entry());
                tracing::info!(session = %session_id, resume = %start, "resuming session");
                (state, start)
            }
            Some(cp) => {
                // Terminal session: keep the accumulated state, start a new
                // flow from the entry node.
                let mut state = cp.state;
                state.begin_turn(request_id, user_message);
                (state, self.graph.entry())
            }
            None => {
                let mut state = DialogueState::new(session_id, user_message);
                state.last_request_id = Some(request_id.to_string());
                tracing::info!(session = %session_id, "starting new session");
                (state, self.graph.entry())
            }
        };

        let turn = state.version;
        let outcome = self.engine.run(state, start).await?;

        self.store
            .save(Checkpoint::from_outcome(session_id, &outcome))
            .await?;

        if let Some(halted_at) = outcome.state.current_node {
            self.observer.observe(&DialogueEvent::TurnCompleted {
                session_id: session_id.to_string(),
                turn,
                halted_at,
            });
        }

        Ok(outcome.state)
    }
}
