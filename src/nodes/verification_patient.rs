//! Progressive identity verification against the patient repository.

use async_trait::async_trait;

use crate::node::{Node, NodeContext, NodeError};
use crate::state::DialogueState;
use crate::types::{NodeId, Route};
use crate::verify::resolver::{VerificationOutcome, VerificationResolver};

pub struct VerificationPatientNode {
    resolver: VerificationResolver,
}

impl VerificationPatientNode {
    pub fn new(resolver: VerificationResolver) -> Self {
        Self { resolver }
    }
}

#[async_trait]
impl Node for VerificationPatientNode {
    async fn run(
        &self,
        mut state: DialogueState,
        _ctx: NodeContext,
    ) -> Result<DialogueState, NodeError> {
        let route = match self.resolver.resolve(&state.user_info).await {
            VerificationOutcome::Verified(record) => {
                state.user_record = Some(record);
                state.is_verified = true;
                state.verification_diagnostics = None;
                Route::Verified
            }
            VerificationOutcome::Failed(diagnostics) => {
                // Clear fields that look wrong so the clarification turn
                // re-asks only for them, not for values that already match.
                for field in &diagnostics.likely_incorrect {
                    state.user_info.clear(*field);
                }
                state.verification_diagnostics = Some(diagnostics);
                Route::NotVerified
            }
        };

        state.route = Some(route);
        state.current_node = Some(NodeId::VerificationPatient);
        Ok(state)
    }
}
