//! Asks for whatever verification or matching diagnosed as missing or wrong.

use async_trait::async_trait;

use crate::node::{Node, NodeContext, NodeError};
use crate::state::DialogueState;
use crate::types::NodeId;
use crate::verify::diagnostics::{
    AppointmentField, IdentityField, MatchDiagnostics, MatchFailure, VerificationDiagnostics,
};

const WAIT_PROMPT: &str =
    "I can list, confirm, or cancel your appointments. What would you like to do?";

pub struct ClarificationNode;

#[async_trait]
impl Node for ClarificationNode {
    async fn run(
        &self,
        mut state: DialogueState,
        _ctx: NodeContext,
    ) -> Result<DialogueState, NodeError> {
        // The node that diagnosed the problem is still recorded as current.
        let reply = match state.current_node {
            Some(NodeId::VerificationPatient) => {
                render_identity_request(state.verification_diagnostics.as_ref())
            }
            Some(NodeId::VerificationAppointment) => {
                render_appointment_request(state.appointment_diagnostics.as_ref())
            }
            _ => WAIT_PROMPT.to_string(),
        };

        state.push_turn(reply);
        state.current_node = Some(NodeId::Clarification);
        Ok(state)
    }
}

fn render_identity_request(diagnostics: Option<&VerificationDiagnostics>) -> String {
    let fields: Vec<&'static str> = match diagnostics {
        Some(d) => {
            let mut fields: Vec<&'static str> = d
                .missing
                .iter()
                .chain(d.likely_incorrect.iter())
                .map(IdentityField::label)
                .collect();
            if fields.is_empty() {
                fields = IdentityField::ALL.iter().map(IdentityField::label).collect();
            }
            fields
        }
        None => IdentityField::ALL.iter().map(IdentityField::label).collect(),
    };

    let mut text = format!(
        "To look up your records I still need your {}.",
        join_labels(&fields)
    );
    if diagnostics.is_some_and(|d| !d.likely_incorrect.is_empty()) {
        text.push_str(" Some of the details you provided didn't match our records, so please double-check them.");
    }
    text
}

fn render_appointment_request(diagnostics: Option<&MatchDiagnostics>) -> String {
    if diagnostics.is_some_and(|d| d.reason == MatchFailure::NoAppointments) {
        return "I couldn't find any appointments on file for you.".to_string();
    }

    let fields: Vec<&'static str> = match diagnostics {
        Some(d) => {
            let mut fields: Vec<&'static str> = d
                .likely_incorrect
                .iter()
                .chain(d.missing.iter())
                .map(AppointmentField::label)
                .collect();
            if fields.is_empty() {
                fields = AppointmentField::ALL
                    .iter()
                    .map(AppointmentField::label)
                    .collect();
            }
            fields
        }
        None => AppointmentField::ALL
            .iter()
            .map(AppointmentField::label)
            .collect(),
    };

    let mut text = format!(
        "Which appointment do you mean? It would help to know the {}.",
        join_labels(&fields)
    );
    if diagnostics.is_some_and(|d| !d.likely_incorrect.is_empty()) {
        text.push_str(" Some of the details you gave didn't match any appointment on file.");
    }
    text
}

fn join_labels(labels: &[&str]) -> String {
    match labels {
        [] => String::new(),
        [only] => (*only).to_string(),
        [head @ .., last] => format!("{} and {}", head.join(", "), last),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verify::diagnostics::VerificationFailure;

    #[test]
    fn identity_request_names_missing_and_suspect_fields() {
        let diagnostics = VerificationDiagnostics {
            reason: VerificationFailure::SingleFieldIncorrect,
            missing: vec![],
            likely_incorrect: vec![IdentityField::PhoneNumber],
            possibly_correct: vec![IdentityField::FullName, IdentityField::DateOfBirth],
        };
        let text = render_identity_request(Some(&diagnostics));
        assert!(text.contains("phone number"));
        assert!(!text.contains("full name and"));
        assert!(text.contains("double-check"));
    }

    #[test]
    fn appointment_request_with_no_diagnostics_asks_for_everything() {
        let text = render_appointment_request(None);
        assert!(text.contains("doctor's name"));
        assert!(text.contains("specialty"));
    }

    #[test]
    fn label_joining_is_grammatical() {
        assert_eq!(join_labels(&["full name"]), "full name");
        assert_eq!(
            join_labels(&["full name", "phone number"]),
            "full name and phone number"
        );
        assert_eq!(
            join_labels(&["a", "b", "c"]),
            "a, b and c"
        );
    }
}
