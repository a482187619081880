//! Resolves which appointment the caller means.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::collaborators::call_with_timeout;
use crate::collaborators::repository::Repository;
use crate::node::{Node, NodeContext, NodeError};
use crate::state::DialogueState;
use crate::types::{Intent, NodeId, Route};
use crate::verify::matcher::{AppointmentMatcher, MatchOutcome};

pub struct VerificationAppointmentNode {
    repository: Arc<dyn Repository>,
    matcher: AppointmentMatcher,
    timeout: Duration,
}

impl VerificationAppointmentNode {
    pub fn new(
        repository: Arc<dyn Repository>,
        matcher: AppointmentMatcher,
        timeout: Duration,
    ) -> Self {
        Self {
            repository,
            matcher,
            timeout,
        }
    }
}

#[async_trait]
impl Node for VerificationAppointmentNode {
    async fn run(
        &self,
        mut state: DialogueState,
        ctx: NodeContext,
    ) -> Result<DialogueState, NodeError> {
        // Populate the session cache once; it is cleared when an action
        // completes so the next request re-reads current data.
        if state.appointments.is_empty() {
            let patient_id = state
                .user_record
                .as_ref()
                .ok_or(NodeError::MissingInput {
                    what: "user_record",
                })?
                .user_id
                .clone();
            let rows = match call_with_timeout(
                self.timeout,
                self.repository.find_appointments_by_patient(&patient_id),
            )
            .await
            {
                Ok(rows) => rows,
                Err(err) => {
                    tracing::warn!(error = %err, "appointment fetch failed; treating as empty");
                    ctx.collaborator_fallback(
                        NodeId::VerificationAppointment,
                        "repository",
                        err.to_string(),
                    );
                    Vec::new()
                }
            };
            tracing::info!(count = rows.len(), "appointments cached for session");
            state.appointments = rows;
        }

        let route = match state.current_intent {
            // Listing needs no specific appointment.
            Some(Intent::ListAppointments) => Route::Verified,
            Some(Intent::ConfirmAppointment) | Some(Intent::CancelAppointment) => {
                if state.appointment_record.is_some() {
                    Route::Verified
                } else {
                    match self
                        .matcher
                        .resolve(&state.appointments, &state.appointment_info)
                        .await
                    {
                        MatchOutcome::Matched {
                            record,
                            confidence,
                            method,
                        } => {
                            tracing::info!(
                                appointment = %record.appointment_id,
                                confidence,
                                ?method,
                                "appointment resolved"
                            );
                            state.appointment_record = Some(record);
                            state.appointment_diagnostics = None;
                            Route::Verified
                        }
                        MatchOutcome::Failed(diagnostics) => {
                            for field in &diagnostics.likely_incorrect {
                                state.appointment_info.clear(*field);
                            }
                            state.appointment_diagnostics = Some(diagnostics);
                            Route::NotVerified
                        }
                    }
                }
            }
            // No appointment action to verify; ask the caller what they want.
            _ => Route::NotVerified,
        };

        state.route = Some(route);
        state.current_node = Some(NodeId::VerificationAppointment);
        Ok(state)
    }
}
