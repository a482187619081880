//! Core identifiers for the dialogue graph.
//!
//! Nodes and routes are closed enums rather than strings: every conditional
//! edge is declared against [`Route`] variants, so a routing value that was
//! never mapped is a configuration error the engine can report precisely
//! instead of a silently-picked branch.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies a processing step in the dialogue graph.
///
/// The set is fixed: the appointment-assistant dialogue has exactly these
/// nodes, and checkpoints persist them via [`encode`](Self::encode) /
/// [`decode`](Self::decode).
///
/// # Examples
///
/// ```
/// use careflow::types::NodeId;
///
/// let encoded = NodeId::ConversationManager.encode();
/// assert_eq!(encoded, "conversation_manager");
/// assert_eq!(NodeId::decode(encoded), Some(NodeId::ConversationManager));
/// assert_eq!(NodeId::decode("not_a_node"), None);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeId {
    /// Classifies the inbound message and routes between QA and the
    /// appointment flow.
    ConversationManager,
    /// Answers a general question. Interrupt-after in the canonical graph.
    QaAnswer,
    /// Dispatches to whichever verification step is still outstanding.
    VerificationGate,
    /// Progressive identity verification against the patient repository.
    VerificationPatient,
    /// Resolves which appointment the caller means.
    VerificationAppointment,
    /// Asks for missing or suspect fields. Interrupt-after.
    Clarification,
    /// Maps the verified intent onto a concrete action path.
    ActionRouter,
    /// Formats the session's appointments for display.
    ListAppointments,
    /// Asks the caller to confirm the pending action. Interrupt-after.
    AskConfirmation,
    /// Classifies the caller's confirmation reply and applies the change.
    ProcessConfirmation,
    /// Composes the user-facing outcome message. Interrupt-after.
    ActionResponse,
}

impl NodeId {
    /// Every node in the dialogue, in graph-declaration order.
    pub const ALL: [NodeId; 11] = [
        NodeId::ConversationManager,
        NodeId::QaAnswer,
        NodeId::VerificationGate,
        NodeId::VerificationPatient,
        NodeId::VerificationAppointment,
        NodeId::Clarification,
        NodeId::ActionRouter,
        NodeId::ListAppointments,
        NodeId::AskConfirmation,
        NodeId::ProcessConfirmation,
        NodeId::ActionResponse,
    ];

    /// Encode into the persisted string form used by checkpoint rows.
    #[must_use]
    pub fn encode(&self) -> &'static str {
        match self {
            NodeId::ConversationManager => "conversation_manager",
            NodeId::QaAnswer => "qa_answer",
            NodeId::VerificationGate => "verification_gate",
            NodeId::VerificationPatient => "verification_patient",
            NodeId::VerificationAppointment => "verification_appointment",
            NodeId::Clarification => "clarification",
            NodeId::ActionRouter => "action_router",
            NodeId::ListAppointments => "list_appointments",
            NodeId::AskConfirmation => "ask_confirmation",
            NodeId::ProcessConfirmation => "process_confirmation",
            NodeId::ActionResponse => "action_response",
        }
    }

    /// Decode a persisted string form. Unknown strings return `None` so a
    /// corrupted checkpoint surfaces as a load error rather than a wrong
    /// resume point.
    pub fn decode(s: &str) -> Option<Self> {
        NodeId::ALL.into_iter().find(|id| id.encode() == s)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.encode())
    }
}

/// The symbolic outcome of a node, read by conditional edges.
///
/// A node that feeds a conditional edge must leave one of these in
/// `DialogueState::route`; the edge's route table maps it to a destination.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Route {
    /// General question; answer it directly.
    Qa,
    /// Appointment-related request; enter the verification flow.
    Appointment,
    /// Identity not yet established.
    UserVerification,
    /// Identity established, appointment not yet resolved.
    AppointmentVerification,
    /// The current verification step succeeded.
    Verified,
    /// The current verification step failed; clarify.
    NotVerified,
    /// No actionable intent yet; ask what the caller wants.
    Wait,
    /// List the caller's appointments.
    List,
    /// Confirm the matched appointment.
    Confirm,
    /// Cancel the matched appointment.
    Cancel,
    /// The caller approved the pending action and it was applied.
    Confirmed,
    /// The caller declined, or the action could not be applied.
    Rejected,
    /// The confirmation reply could not be classified.
    Unclear,
}

impl Route {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Route::Qa => "qa",
            Route::Appointment => "appointment",
            Route::UserVerification => "user_verification",
            Route::AppointmentVerification => "appointment_verification",
            Route::Verified => "verified",
            Route::NotVerified => "not_verified",
            Route::Wait => "wait",
            Route::List => "list",
            Route::Confirm => "confirm",
            Route::Cancel => "cancel",
            Route::Confirmed => "confirmed",
            Route::Rejected => "rejected",
            Route::Unclear => "unclear",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The classified purpose of an inbound message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    GeneralQa,
    ListAppointments,
    ConfirmAppointment,
    CancelAppointment,
}

impl Intent {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::GeneralQa => "general_qa",
            Intent::ListAppointments => "list_appointments",
            Intent::ConfirmAppointment => "confirm_appointment",
            Intent::CancelAppointment => "cancel_appointment",
        }
    }

    /// True for intents that require the verification flow before acting.
    #[must_use]
    pub fn is_appointment_action(&self) -> bool {
        !matches!(self, Intent::GeneralQa)
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
