//! Observability interface for dialogue execution.
//!
//! Diagnostic signals (node entries, routing decisions, collaborator
//! fallbacks, interrupts) are emitted through [`DialogueObserver`] instead of
//! being folded into session state. The default observer forwards everything
//! to `tracing`; tests use [`MemoryObserver`], and streaming consumers can
//! attach a [`ChannelObserver`].

use std::sync::Mutex;

use crate::types::{NodeId, Route};

/// A diagnostic event emitted during a turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DialogueEvent {
    NodeEntered {
        node: NodeId,
        turn: u32,
    },
    RouteTaken {
        node: NodeId,
        route: Route,
    },
    CollaboratorFallback {
        node: NodeId,
        collaborator: &'static str,
        reason: String,
    },
    Interrupted {
        node: NodeId,
    },
    TurnCompleted {
        session_id: String,
        turn: u32,
        halted_at: NodeId,
    },
}

/// Sink for dialogue events. Implementations must not block.
pub trait DialogueObserver: Send + Sync {
    fn observe(&self, event: &DialogueEvent);
}

/// Default observer: structured `tracing` output.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl DialogueObserver for TracingObserver {
    fn observe(&self, event: &DialogueEvent) {
        match event {
            DialogueEvent::NodeEntered { node, turn } => {
                tracing::info!(node = %node, turn, "node entered");
            }
            DialogueEvent::RouteTaken { node, route } => {
                tracing::info!(node = %node, route = %route, "route taken");
            }
            DialogueEvent::CollaboratorFallback {
                node,
                collaborator,
                reason,
            } => {
                tracing::warn!(node = %node, collaborator, %reason, "collaborator fallback");
            }
            DialogueEvent::Interrupted { node } => {
                tracing::info!(node = %node, "turn interrupted");
            }
            DialogueEvent::TurnCompleted {
                session_id,
                turn,
                halted_at,
            } => {
                tracing::info!(session = %session_id, turn, halted_at = %halted_at, "turn completed");
            }
        }
    }
}

/// Collects events in memory for assertions.
#[derive(Debug, Default)]
pub struct MemoryObserver {
    events: Mutex<Vec<DialogueEvent>>,
}

impl MemoryObserver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything observed so far.
    #[must_use]
    pub fn snapshot(&self) -> Vec<DialogueEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl DialogueObserver for MemoryObserver {
    fn observe(&self, event: &DialogueEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

/// Forwards events over a channel; dropped receivers are ignored.
#[derive(Debug)]
pub struct ChannelObserver {
    tx: flume::Sender<DialogueEvent>,
}

impl ChannelObserver {
    #[must_use]
    pub fn new(tx: flume::Sender<DialogueEvent>) -> Self {
        Self { tx }
    }
}

impl DialogueObserver for ChannelObserver {
    fn observe(&self, event: &DialogueEvent) {
        let _ = self.tx.send(event.clone());
    }
}

/// Install a global `tracing` subscriber suitable for binaries and examples:
/// env-filtered fmt output plus span-aware error context.
///
/// Safe to call more than once; only the first call installs.
pub fn init_tracing() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_error::ErrorLayer::default())
        .try_init();
}
