//! Minimal nodes for exercising the engine with custom topologies.

use async_trait::async_trait;
use careflow::node::{Node, NodeContext, NodeError};
use careflow::state::DialogueState;
use careflow::types::Route;

/// Records a fixed route (or none at all, when `route` is `None`).
pub struct SetRouteNode {
    pub route: Option<Route>,
}

#[async_trait]
impl Node for SetRouteNode {
    async fn run(
        &self,
        mut state: DialogueState,
        _ctx: NodeContext,
    ) -> Result<DialogueState, NodeError> {
        state.route = self.route;
        Ok(state)
    }
}

/// Appends a fixed reply to the history.
pub struct EchoNode {
    pub reply: &'static str,
}

#[async_trait]
impl Node for EchoNode {
    async fn run(
        &self,
        mut state: DialogueState,
        _ctx: NodeContext,
    ) -> Result<DialogueState, NodeError> {
        state.push_turn(self.reply);
        Ok(state)
    }
}

/// Does nothing.
pub struct NoopNode;

#[async_trait]
impl Node for NoopNode {
    async fn run(
        &self,
        state: DialogueState,
        _ctx: NodeContext,
    ) -> Result<DialogueState, NodeError> {
        Ok(state)
    }
}
