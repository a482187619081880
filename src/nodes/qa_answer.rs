//! Answers general questions about the clinic.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::collaborators::call_with_timeout;
use crate::collaborators::classifier::{Answer, AnswerRequest, Classifier};
use crate::node::{Node, NodeContext, NodeError};
use crate::state::DialogueState;
use crate::types::NodeId;

pub struct QaAnswerNode {
    classifier: Arc<dyn Classifier>,
    timeout: Duration,
}

impl QaAnswerNode {
    pub fn new(classifier: Arc<dyn Classifier>, timeout: Duration) -> Self {
        Self {
            classifier,
            timeout,
        }
    }
}

#[async_trait]
impl Node for QaAnswerNode {
    async fn run(
        &self,
        mut state: DialogueState,
        ctx: NodeContext,
    ) -> Result<DialogueState, NodeError> {
        let request = AnswerRequest {
            question: state.user_message.clone(),
            history: state.history.clone(),
        };
        let answer =
            match call_with_timeout(self.timeout, self.classifier.answer_question(request)).await {
                Ok(answer) => answer,
                Err(err) => {
                    tracing::warn!(error = %err, "QA answering failed; using fallback");
                    ctx.collaborator_fallback(NodeId::QaAnswer, "qa_answerer", err.to_string());
                    Answer::fallback()
                }
            };

        state.push_turn(answer.text);
        state.current_node = Some(NodeId::QaAnswer);
        Ok(state)
    }
}
