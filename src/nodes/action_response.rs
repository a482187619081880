//! Composes the user-facing outcome message and closes out the action.

use async_trait::async_trait;

use crate::node::{Node, NodeContext, NodeError};
use crate::state::DialogueState;
use crate::types::{Intent, NodeId, Route};

const CODA: &str = "Is there anything else I can do for you?";

pub struct ActionResponseNode;

#[async_trait]
impl Node for ActionResponseNode {
    async fn run(
        &self,
        mut state: DialogueState,
        _ctx: NodeContext,
    ) -> Result<DialogueState, NodeError> {
        let reply = match state.pending_reply.take() {
            // A listing staged by ListAppointments.
            Some(text) => format!("{text}\n\n{CODA}"),
            None => {
                let applied = matches!(state.route, Some(Route::Confirmed));
                let action = match state.current_intent {
                    Some(Intent::CancelAppointment) => "canceled",
                    Some(Intent::ConfirmAppointment) => "confirmed",
                    _ => "updated",
                };
                let lead = if applied {
                    format!("Your appointment has been {action}.")
                } else {
                    format!("Your appointment has not been {action}.")
                };
                format!("{lead}\n{CODA}")
            }
        };

        state.push_turn(reply);
        state.clear_action();
        state.current_node = Some(NodeId::ActionResponse);
        Ok(state)
    }
}
