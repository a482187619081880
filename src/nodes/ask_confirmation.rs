//! Asks the caller to confirm the pending action.

use async_trait::async_trait;

use crate::node::{Node, NodeContext, NodeError};
use crate::state::DialogueState;
use crate::types::{Intent, NodeId};

pub struct AskConfirmationNode;

#[async_trait]
impl Node for AskConfirmationNode {
    async fn run(
        &self,
        mut state: DialogueState,
        _ctx: NodeContext,
    ) -> Result<DialogueState, NodeError> {
        let record = state.appointment_record.as_ref().ok_or(NodeError::MissingInput {
            what: "appointment_record",
        })?;
        let action = match state.current_intent {
            Some(Intent::CancelAppointment) => "cancel",
            Some(Intent::ConfirmAppointment) => "confirm",
            _ => {
                return Err(NodeError::ValidationFailed(
                    "confirmation requested without a confirm/cancel intent".to_string(),
                ));
            }
        };

        let question = format!(
            "You asked to {action} your {specialty} appointment with Dr. {doctor} at {clinic} on {date}. Should I go ahead? (yes/no)",
            specialty = record.specialty,
            doctor = record.doctor_full_name,
            clinic = record.clinic_name,
            date = record.appointment_date,
        );
        state.push_turn(question);
        state.current_node = Some(NodeId::AskConfirmation);
        Ok(state)
    }
}
