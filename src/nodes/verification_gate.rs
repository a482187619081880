//! Dispatches to whichever verification step is still outstanding.

use async_trait::async_trait;

use crate::node::{Node, NodeContext, NodeError};
use crate::state::DialogueState;
use crate::types::{NodeId, Route};

pub struct VerificationGateNode;

#[async_trait]
impl Node for VerificationGateNode {
    async fn run(
        &self,
        mut state: DialogueState,
        _ctx: NodeContext,
    ) -> Result<DialogueState, NodeError> {
        let route = if !(state.is_verified && state.user_record.is_some()) {
            Route::UserVerification
        } else if state.appointments.is_empty() || state.appointment_record.is_none() {
            Route::AppointmentVerification
        } else {
            Route::Verified
        };
        tracing::debug!(route = %route, "verification gate");

        state.route = Some(route);
        state.current_node = Some(NodeId::VerificationGate);
        Ok(state)
    }
}
