//! Classifies the caller's confirmation reply and applies the change.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::collaborators::call_with_timeout;
use crate::collaborators::classifier::{Classifier, ConfirmationDecision, ConfirmationOutcome};
use crate::collaborators::repository::{AppointmentStatus, Repository};
use crate::node::{Node, NodeContext, NodeError};
use crate::state::DialogueState;
use crate::types::{Intent, NodeId, Route};

pub struct ProcessConfirmationNode {
    classifier: Arc<dyn Classifier>,
    repository: Arc<dyn Repository>,
    classifier_timeout: Duration,
    repository_timeout: Duration,
    /// Unclear replies tolerated before the loop is terminated.
    max_attempts: u32,
}

impl ProcessConfirmationNode {
    pub fn new(
        classifier: Arc<dyn Classifier>,
        repository: Arc<dyn Repository>,
        classifier_timeout: Duration,
        repository_timeout: Duration,
        max_attempts: u32,
    ) -> Self {
        Self {
            classifier,
            repository,
            classifier_timeout,
            repository_timeout,
            max_attempts: max_attempts.max(1),
        }
    }
}

#[async_trait]
impl Node for ProcessConfirmationNode {
    async fn run(
        &self,
        mut state: DialogueState,
        ctx: NodeContext,
    ) -> Result<DialogueState, NodeError> {
        let record = state
            .appointment_record
            .clone()
            .ok_or(NodeError::MissingInput {
                what: "appointment_record",
            })?;

        let outcome = match call_with_timeout(
            self.classifier_timeout,
            self.classifier.classify_confirmation(&state.user_message),
        )
        .await
        {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::warn!(error = %err, "confirmation classification failed; using fallback");
                ctx.collaborator_fallback(
                    NodeId::ProcessConfirmation,
                    "confirmation_classifier",
                    err.to_string(),
                );
                ConfirmationOutcome::fallback()
            }
        };
        tracing::info!(decision = ?outcome.decision, "confirmation classified");

        let route = match outcome.decision {
            ConfirmationDecision::Confirm => {
                let new_status = match state.current_intent {
                    Some(Intent::CancelAppointment) => AppointmentStatus::CanceledByPatient,
                    Some(Intent::ConfirmAppointment) => AppointmentStatus::Confirmed,
                    _ => {
                        return Err(NodeError::ValidationFailed(
                            "confirmation processed without a confirm/cancel intent".to_string(),
                        ));
                    }
                };
                match call_with_timeout(
                    self.repository_timeout,
                    self.repository
                        .update_appointment_status(&record.appointment_id, new_status),
                )
                .await
                {
                    Ok(updated) => {
                        tracing::info!(
                            appointment = %updated.id,
                            status = %new_status,
                            "appointment status updated"
                        );
                        state.appointment_record = None;
                        state.appointments.clear();
                        Route::Confirmed
                    }
                    Err(err) => {
                        // The change was not applied; the response truthfully
                        // reports that nothing happened.
                        tracing::warn!(error = %err, "status update failed");
                        ctx.collaborator_fallback(
                            NodeId::ProcessConfirmation,
                            "repository",
                            err.to_string(),
                        );
                        state.appointment_record = None;
                        state.appointments.clear();
                        Route::Rejected
                    }
                }
            }
            ConfirmationDecision::Reject => {
                state.appointment_record = None;
                state.appointments.clear();
                Route::Rejected
            }
            ConfirmationDecision::Unclear => {
                state.confirmation_attempts = state.confirmation_attempts.saturating_add(1);
                if state.confirmation_attempts >= self.max_attempts {
                    tracing::warn!(
                        attempts = state.confirmation_attempts,
                        "confirmation retries exhausted; abandoning the action"
                    );
                    state.appointment_record = None;
                    state.appointments.clear();
                    Route::Rejected
                } else {
                    Route::Unclear
                }
            }
        };

        state.confirmation_intent = Some(outcome);
        state.route = Some(route);
        state.current_node = Some(NodeId::ProcessConfirmation);
        Ok(state)
    }
}
