//! Sequential graph execution with interrupt semantics.
//!
//! One call to [`ExecutionEngine::run`] is one turn: a strictly sequential
//! walk from the given node until an interrupt point or a terminal edge.
//! There is no fan-out within a turn; each node makes at most one
//! collaborator call.

use std::sync::Arc;

use miette::Diagnostic;
use thiserror::Error;
use tracing::instrument;

use crate::graph::{DialogueGraph, EdgeTarget};
use crate::node::{NodeContext, NodeError};
use crate::observe::{DialogueEvent, DialogueObserver, TracingObserver};
use crate::state::DialogueState;
use crate::types::{NodeId, Route};

/// Why a turn stopped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Halt {
    /// The node ran and is an interrupt-after point; `next` is where the
    /// session resumes when the following message arrives.
    InterruptAfter { node: NodeId, next: Vec<NodeId> },
    /// Execution stopped before running `node`; an external decision gates
    /// entry, and the session resumes into it.
    InterruptBefore { node: NodeId },
    /// A terminal edge was reached; no resumption is expected until a new
    /// external trigger.
    Terminal { node: NodeId },
}

/// Result of one turn.
#[derive(Clone, Debug)]
pub struct TurnOutcome {
    pub state: DialogueState,
    pub halt: Halt,
}

impl TurnOutcome {
    /// Nodes the session is paused before, in resume order.
    #[must_use]
    pub fn next_nodes(&self) -> Vec<NodeId> {
        match &self.halt {
            Halt::InterruptAfter { next, .. } => next.clone(),
            Halt::InterruptBefore { node } => vec![*node],
            Halt::Terminal { .. } => Vec::new(),
        }
    }

    /// Whether the session is waiting for the next inbound message.
    #[must_use]
    pub fn interrupted(&self) -> bool {
        !matches!(self.halt, Halt::Terminal { .. })
    }
}

/// Errors raised while walking the graph. Routing variants are configuration
/// failures: they mean the topology and the node set disagree, which tests
/// must catch before production traffic does.
#[derive(Debug, Error, Diagnostic)]
pub enum EngineError {
    #[error("node {node} selected route {route} with no mapped destination")]
    #[diagnostic(
        code(careflow::engine::unmapped_route),
        help("Declare the route in the node's route table; silently picking a branch is not allowed.")
    )]
    UnmappedRoute { node: NodeId, route: Route },

    #[error("node {node} has a conditional edge but produced no route")]
    #[diagnostic(code(careflow::engine::missing_route))]
    MissingRoute { node: NodeId },

    #[error("node {node} has no outgoing edge")]
    #[diagnostic(code(careflow::engine::dangling_node))]
    DanglingNode { node: NodeId },

    #[error("node {node} is not registered in the graph")]
    #[diagnostic(code(careflow::engine::unknown_node))]
    UnknownNode { node: NodeId },

    #[error("turn exceeded {max_steps} steps without reaching an interrupt or terminal node")]
    #[diagnostic(
        code(careflow::engine::step_limit),
        help("A cycle without an interrupt point is a topology bug.")
    )]
    StepLimitExceeded { max_steps: u32 },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Node(#[from] NodeError),
}

/// Walks a [`DialogueGraph`] from an entry or resume point to the next halt.
pub struct ExecutionEngine {
    graph: Arc<DialogueGraph>,
    observer: Arc<dyn DialogueObserver>,
    max_steps: u32,
}

impl ExecutionEngine {
    pub const DEFAULT_MAX_STEPS: u32 = 32;

    pub fn new(graph: Arc<DialogueGraph>) -> Self {
        Self::with_observer(graph, Arc::new(TracingObserver))
    }

    pub fn with_observer(graph: Arc<DialogueGraph>, observer: Arc<dyn DialogueObserver>) -> Self {
        Self {
            graph,
            observer,
            max_steps: Self::DEFAULT_MAX_STEPS,
        }
    }

    #[must_use]
    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = max_steps.max(1);
        self
    }

    /// Run one turn starting at `start`.
    ///
    /// On resume, `start` is the node the previous turn paused before; it is
    /// executed unconditionally (the pause is what gated it).
    #[instrument(skip(self, state), fields(session = %state.session_id, turn = state.version), err)]
    pub async fn run(
        &self,
        mut state: DialogueState,
        start: NodeId,
    ) -> Result<TurnOutcome, EngineError> {
        let turn = state.version;
        let mut current = start;

        for _ in 0..self.max_steps {
            let node = self
                .graph
                .node(current)
                .ok_or(EngineError::UnknownNode { node: current })?;
            self.observer.observe(&DialogueEvent::NodeEntered {
                node: current,
                turn,
            });

            let ctx = NodeContext {
                session_id: state.session_id.clone(),
                turn,
                observer: self.observer.clone(),
            };
            state = node.run(state, ctx).await?;

            if self.graph.route_table(current).is_some()
                && let Some(route) = state.route
            {
                self.observer.observe(&DialogueEvent::RouteTaken {
                    node: current,
                    route,
                });
            }

            let target = self.next_target(current, &state)?;

            if self.graph.is_interrupt_after(current) {
                self.observer
                    .observe(&DialogueEvent::Interrupted { node: current });
                let next = match target {
                    EdgeTarget::Node(next) => vec![next],
                    EdgeTarget::End => Vec::new(),
                };
                return Ok(TurnOutcome {
                    state,
                    halt: Halt::InterruptAfter {
                        node: current,
                        next,
                    },
                });
            }

            match target {
                EdgeTarget::End => {
                    return Ok(TurnOutcome {
                        state,
                        halt: Halt::Terminal { node: current },
                    });
                }
                EdgeTarget::Node(next) => {
                    if self.graph.is_interrupt_before(next) {
                        self.observer
                            .observe(&DialogueEvent::Interrupted { node: next });
                        return Ok(TurnOutcome {
                            state,
                            halt: Halt::InterruptBefore { node: next },
                        });
                    }
                    current = next;
                }
            }
        }

        Err(EngineError::StepLimitExceeded {
            max_steps: self.max_steps,
        })
    }

    /// Resolve the edge leaving `from`. Conditional edges read the route the
    /// node just recorded; an undeclared route fails loudly.
    fn next_target(&self, from: NodeId, state: &DialogueState) -> Result<EdgeTarget, EngineError> {
        if let Some(target) = self.graph.edge(from) {
            return Ok(target);
        }
        if let Some(table) = self.graph.route_table(from) {
            let route = state.route.ok_or(EngineError::MissingRoute { node: from })?;
            return table
                .target(route)
                .ok_or(EngineError::UnmappedRoute { node: from, route });
        }
        Err(EngineError::DanglingNode { node: from })
    }
}
