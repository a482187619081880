//! Maps the verified intent onto a concrete action path.

use async_trait::async_trait;

use crate::node::{Node, NodeContext, NodeError};
use crate::state::DialogueState;
use crate::types::{Intent, NodeId, Route};

pub struct ActionRouterNode;

#[async_trait]
impl Node for ActionRouterNode {
    async fn run(
        &self,
        mut state: DialogueState,
        _ctx: NodeContext,
    ) -> Result<DialogueState, NodeError> {
        let route = match state.current_intent {
            Some(Intent::ListAppointments) => Route::List,
            Some(Intent::ConfirmAppointment) => Route::Confirm,
            Some(Intent::CancelAppointment) => Route::Cancel,
            _ => Route::Wait,
        };
        tracing::info!(route = %route, "action routed");

        state.route = Some(route);
        state.current_node = Some(NodeId::ActionRouter);
        Ok(state)
    }
}
