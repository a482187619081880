//! Classifier boundary: intent, confirmation, QA answers, semantic matching.
//!
//! All four operations share one shape: render a context, get back a typed
//! result with a confidence score. Implementations are expected to be LLM- or
//! model-backed; the core only depends on the typed results and on the
//! documented fallback constructors used when a call fails or times out.

use async_trait::async_trait;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use super::TimeoutError;
use crate::state::{AppointmentCriteria, IdentityFields, TurnRecord};
use crate::types::Intent;

/// Context handed to intent classification.
#[derive(Clone, Debug, PartialEq)]
pub struct IntentRequest {
    pub user_message: String,
    pub history: Vec<TurnRecord>,
    pub is_verified: bool,
}

/// Intent classification result, with any entities extracted along the way.
#[derive(Clone, Debug, PartialEq)]
pub struct IntentOutcome {
    pub intent: Intent,
    pub confidence: f32,
    /// Identity fields spotted in the message, if any.
    pub identity: Option<IdentityFields>,
    /// Appointment criteria spotted in the message, if any.
    pub appointment: Option<AppointmentCriteria>,
}

impl IntentOutcome {
    /// Documented fallback when classification fails: the lowest-confidence
    /// default intent, with nothing extracted.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            intent: Intent::GeneralQa,
            confidence: 0.0,
            identity: None,
            appointment: None,
        }
    }
}

/// Context handed to QA answering.
#[derive(Clone, Debug, PartialEq)]
pub struct AnswerRequest {
    pub question: String,
    pub history: Vec<TurnRecord>,
}

/// A generated answer to a general question.
#[derive(Clone, Debug, PartialEq)]
pub struct Answer {
    pub text: String,
    pub confidence: f32,
}

impl Answer {
    /// Documented fallback when answering fails.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            text: "I'm sorry, I couldn't look that up right now. Could you ask again in a moment?"
                .to_string(),
            confidence: 0.0,
        }
    }
}

/// What the caller meant by their confirmation reply.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationDecision {
    Confirm,
    Reject,
    Unclear,
}

/// Confirmation classification result. Stored in session state so the
/// response node can describe what happened.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConfirmationOutcome {
    pub decision: ConfirmationDecision,
    pub confidence: f32,
    #[serde(default)]
    pub reasoning: Option<String>,
}

impl ConfirmationOutcome {
    /// Documented fallback when classification fails: treat the reply as
    /// unclear and re-ask rather than guessing at a state change.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            decision: ConfirmationDecision::Unclear,
            confidence: 0.0,
            reasoning: Some("classifier unavailable".to_string()),
        }
    }
}

/// Textual rendering of criteria and candidates for semantic matching.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SemanticMatchRequest {
    pub criteria_text: String,
    pub appointments_text: String,
}

/// Semantic appointment-match result.
#[derive(Clone, Debug, PartialEq)]
pub struct SemanticMatchOutcome {
    pub match_found: bool,
    pub confidence: f32,
    pub matched_id: Option<String>,
    pub reasoning: String,
}

impl SemanticMatchOutcome {
    /// Documented no-match sentinel used when the semantic call fails.
    #[must_use]
    pub fn no_match(reasoning: impl Into<String>) -> Self {
        Self {
            match_found: false,
            confidence: 0.0,
            matched_id: None,
            reasoning: reasoning.into(),
        }
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum ClassifierError {
    #[error("classifier provider error: {message}")]
    #[diagnostic(
        code(careflow::classifier::provider),
        help("The turn degrades to the documented fallback value and continues.")
    )]
    Provider { message: String },

    #[error("classifier call timed out after {seconds}s")]
    #[diagnostic(code(careflow::classifier::timeout))]
    Timeout { seconds: u64 },
}

impl TimeoutError for ClassifierError {
    fn timed_out(after: Duration) -> Self {
        ClassifierError::Timeout {
            seconds: after.as_secs(),
        }
    }
}

/// Natural-language understanding required by the dialogue core.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Classify the inbound message and extract any identity fields or
    /// appointment criteria it carries.
    async fn classify_intent(
        &self,
        request: IntentRequest,
    ) -> Result<IntentOutcome, ClassifierError>;

    /// Answer a general question about the clinic.
    async fn answer_question(&self, request: AnswerRequest) -> Result<Answer, ClassifierError>;

    /// Classify a free-text reply to a yes/no confirmation question.
    async fn classify_confirmation(
        &self,
        reply: &str,
    ) -> Result<ConfirmationOutcome, ClassifierError>;

    /// Pick the best appointment candidate for the rendered criteria.
    async fn match_appointment(
        &self,
        request: SemanticMatchRequest,
    ) -> Result<SemanticMatchOutcome, ClassifierError>;
}
