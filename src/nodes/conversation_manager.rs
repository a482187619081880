//! Entry node: intent classification and entity capture.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::collaborators::call_with_timeout;
use crate::collaborators::classifier::{Classifier, IntentOutcome, IntentRequest};
use crate::node::{Node, NodeContext, NodeError};
use crate::state::DialogueState;
use crate::types::{Intent, NodeId, Route};

pub struct ConversationManagerNode {
    classifier: Arc<dyn Classifier>,
    timeout: Duration,
}

impl ConversationManagerNode {
    pub fn new(classifier: Arc<dyn Classifier>, timeout: Duration) -> Self {
        Self {
            classifier,
            timeout,
        }
    }
}

#[async_trait]
impl Node for ConversationManagerNode {
    async fn run(
        &self,
        mut state: DialogueState,
        ctx: NodeContext,
    ) -> Result<DialogueState, NodeError> {
        let request = IntentRequest {
            user_message: state.user_message.clone(),
            history: state.history.clone(),
            is_verified: state.is_verified,
        };
        let outcome =
            match call_with_timeout(self.timeout, self.classifier.classify_intent(request)).await {
                Ok(outcome) => outcome,
                Err(err) => {
                    tracing::warn!(error = %err, "intent classification failed; using fallback");
                    ctx.collaborator_fallback(
                        NodeId::ConversationManager,
                        "intent_classifier",
                        err.to_string(),
                    );
                    IntentOutcome::fallback()
                }
            };

        state.current_intent = Some(outcome.intent);
        state.intent_confidence = outcome.confidence;

        let route = match outcome.intent {
            Intent::GeneralQa => Route::Qa,
            _ => {
                // Identity fields are only collected while unverified; a
                // verified caller's record is authoritative.
                if !state.is_verified
                    && let Some(identity) = outcome.identity
                {
                    state.user_info.merge(identity);
                }
                if let Some(criteria) = outcome.appointment {
                    state.appointment_info.merge(criteria);
                }
                Route::Appointment
            }
        };
        tracing::info!(intent = %outcome.intent, route = %route, "conversation routed");

        state.route = Some(route);
        state.current_node = Some(NodeId::ConversationManager);
        Ok(state)
    }
}
