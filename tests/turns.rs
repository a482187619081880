//! End-to-end turn scenarios over the canonical appointment-assistant graph.

mod common;

use common::fixtures::*;
use common::mocks::{MockClassifier, MockRepository};
use common::harness;

use careflow::collaborators::classifier::ConfirmationDecision;
use careflow::collaborators::repository::AppointmentStatus;
use careflow::observe::DialogueEvent;
use careflow::runtime::checkpoint::CheckpointStore;
use careflow::types::{Intent, NodeId};
use careflow::verify::diagnostics::MatchFailure;

#[tokio::test]
async fn qa_question_interrupts_after_answer() {
    let classifier = MockClassifier::new();
    classifier.push_intent(intent(Intent::GeneralQa));
    classifier.push_answer("We're open 9am to 5pm, Monday through Friday.");
    let h = harness(classifier, MockRepository::new());

    let state = h
        .assistant
        .handle_turn("sess-qa", "req-1", "What are your opening hours?")
        .await
        .unwrap();

    assert_eq!(state.current_node, Some(NodeId::QaAnswer));
    assert_eq!(
        state.last_reply(),
        Some("We're open 9am to 5pm, Monday through Friday.")
    );

    let cp = h.store.load("sess-qa").await.unwrap().expect("checkpoint");
    assert!(cp.interrupted);
    assert_eq!(cp.next_nodes, vec![NodeId::ConversationManager]);
    assert_eq!(cp.state, state);
}

#[tokio::test]
async fn verified_caller_without_criteria_is_asked_for_appointment_details() {
    let classifier = MockClassifier::new();
    classifier.push_intent(cancel_intent_with_identity());
    let repository = MockRepository::new()
        .with_user(jane_doe())
        .with_appointment(smith_appointment())
        .with_appointment(jones_appointment());
    let h = harness(classifier, repository);

    let state = h
        .assistant
        .handle_turn(
            "sess-b",
            "req-1",
            "Cancel my appointment, I'm Jane Doe, +15551234567, 1990-01-01",
        )
        .await
        .unwrap();

    // Identity verified on the way through.
    assert!(state.is_verified);
    assert_eq!(
        state.user_record.as_ref().map(|r| r.user_id.as_str()),
        Some("u-jane")
    );
    // No appointment criteria were given, so the flow pauses in
    // clarification asking for them.
    assert_eq!(state.current_node, Some(NodeId::Clarification));
    assert_eq!(
        state
            .appointment_diagnostics
            .as_ref()
            .map(|d| d.reason),
        Some(MatchFailure::NoInfoProvided)
    );
    let reply = state.last_reply().expect("clarification reply");
    assert!(reply.contains("Which appointment"), "reply was: {reply}");

    let cp = h.store.load("sess-b").await.unwrap().expect("checkpoint");
    assert!(cp.interrupted);
    assert_eq!(cp.next_nodes, vec![NodeId::ConversationManager]);
}

#[tokio::test]
async fn cancel_flow_applies_status_change_and_is_idempotent_on_retry() {
    let classifier = MockClassifier::new();
    classifier.push_intent(cancel_intent_with_identity_and_doctor("Smith"));
    classifier.push_confirmation(ConfirmationDecision::Confirm);
    let repository = MockRepository::new()
        .with_user(jane_doe())
        .with_appointment(smith_appointment())
        .with_appointment(jones_appointment());
    let h = harness(classifier, repository);

    // Turn 1: identity + criteria resolve directly to the Smith appointment
    // and the flow pauses on the confirmation question.
    let state = h
        .assistant
        .handle_turn("sess-c", "req-1", "Cancel my appointment with Dr. Smith")
        .await
        .unwrap();
    assert_eq!(state.current_node, Some(NodeId::AskConfirmation));
    assert_eq!(
        state
            .appointment_record
            .as_ref()
            .map(|r| r.appointment_id.as_str()),
        Some("appt-1")
    );
    let question = state.last_reply().expect("confirmation question");
    assert!(question.contains("cancel"), "question was: {question}");
    let cp = h.store.load("sess-c").await.unwrap().expect("checkpoint");
    assert_eq!(cp.next_nodes, vec![NodeId::ProcessConfirmation]);

    // Turn 2: the caller confirms; the cancellation is applied exactly once.
    let state = h
        .assistant
        .handle_turn("sess-c", "req-2", "yes please")
        .await
        .unwrap();
    assert_eq!(state.current_node, Some(NodeId::ActionResponse));
    assert_eq!(h.repository.update_calls(), 1);
    assert_eq!(
        h.repository.appointment_status("appt-1"),
        Some(AppointmentStatus::CanceledByPatient)
    );
    assert!(state.appointment_record.is_none());
    assert!(state.appointments.is_empty());
    let reply = state.last_reply().expect("outcome reply");
    assert!(reply.contains("has been canceled"), "reply was: {reply}");

    // Retrying the same request must not re-run the turn: the persisted
    // state comes back unchanged and no second update is issued.
    let replay = h
        .assistant
        .handle_turn("sess-c", "req-2", "yes please")
        .await
        .unwrap();
    assert_eq!(replay, state);
    assert_eq!(h.repository.update_calls(), 1);
}

#[tokio::test]
async fn repeated_unclear_replies_terminate_the_confirmation_loop() {
    let classifier = MockClassifier::new();
    classifier.push_intent(cancel_intent_with_identity_and_doctor("Smith"));
    for _ in 0..3 {
        classifier.push_confirmation(ConfirmationDecision::Unclear);
    }
    let repository = MockRepository::new()
        .with_user(jane_doe())
        .with_appointment(smith_appointment());
    let h = harness(classifier, repository);

    let state = h
        .assistant
        .handle_turn("sess-d", "req-1", "Cancel my Smith appointment")
        .await
        .unwrap();
    assert_eq!(state.current_node, Some(NodeId::AskConfirmation));

    // Two unclear replies re-ask the question.
    for (req, reply) in [("req-2", "hmm"), ("req-3", "maybe?")] {
        let state = h.assistant.handle_turn("sess-d", req, reply).await.unwrap();
        assert_eq!(state.current_node, Some(NodeId::AskConfirmation));
        assert!(state.confirmation_attempts >= 1);
    }

    // The third exhausts the bound: the action is abandoned, nothing was
    // ever applied, and the caller is told so.
    let state = h
        .assistant
        .handle_turn("sess-d", "req-4", "what?")
        .await
        .unwrap();
    assert_eq!(state.current_node, Some(NodeId::ActionResponse));
    assert_eq!(h.repository.update_calls(), 0);
    let reply = state.last_reply().expect("outcome reply");
    assert!(reply.contains("has not been canceled"), "reply was: {reply}");
    // Counters reset for the next action.
    assert_eq!(state.confirmation_attempts, 0);
}

#[tokio::test]
async fn list_flow_renders_appointments_and_returns_to_the_manager() {
    let classifier = MockClassifier::new();
    classifier.push_intent(cancel_intent_with_identity()); // verifies identity, no criteria
    classifier.push_intent(intent(Intent::ListAppointments));
    let repository = MockRepository::new()
        .with_user(jane_doe())
        .with_appointment(smith_appointment());
    let h = harness(classifier, repository);

    // Turn 1 verifies identity and pauses in clarification.
    h.assistant
        .handle_turn("sess-e", "req-1", "Cancel it. Jane Doe, +15551234567, 1990-01-01")
        .await
        .unwrap();

    // Turn 2 lists.
    let state = h
        .assistant
        .handle_turn("sess-e", "req-2", "Actually, just list my appointments")
        .await
        .unwrap();
    assert_eq!(state.current_node, Some(NodeId::ActionResponse));
    let reply = state.last_reply().expect("listing reply");
    assert!(reply.contains("Dear Jane"), "reply was: {reply}");
    assert!(reply.contains("Dr. Emily Smith (Cardiology)"));
    assert!(reply.contains("anything else"));

    let cp = h.store.load("sess-e").await.unwrap().expect("checkpoint");
    assert_eq!(cp.next_nodes, vec![NodeId::ConversationManager]);
}

#[tokio::test]
async fn intent_classifier_failure_degrades_to_the_qa_fallback() {
    let classifier = MockClassifier::new();
    classifier
        .fail_intents
        .store(true, std::sync::atomic::Ordering::SeqCst);
    let h = harness(classifier, MockRepository::new());

    let state = h
        .assistant
        .handle_turn("sess-f", "req-1", "mumble")
        .await
        .unwrap();

    // Fallback intent is GeneralQa; with no scripted answer the QA fallback
    // text is used, and the turn still completes at an interrupt point.
    assert_eq!(state.current_node, Some(NodeId::QaAnswer));
    assert_eq!(state.current_intent, Some(Intent::GeneralQa));
    assert!(state.last_reply().unwrap().contains("I'm sorry"));

    let events = h.observer.snapshot();
    assert!(events.iter().any(|e| matches!(
        e,
        DialogueEvent::CollaboratorFallback {
            node: NodeId::ConversationManager,
            collaborator: "intent_classifier",
            ..
        }
    )));
}

#[tokio::test]
async fn concurrent_turns_for_one_session_are_serialized() {
    let classifier = MockClassifier::new();
    classifier.push_intent(intent(Intent::GeneralQa));
    classifier.push_intent(intent(Intent::GeneralQa));
    classifier.push_answer("first");
    classifier.push_answer("second");
    let h = std::sync::Arc::new(harness(classifier, MockRepository::new()));

    let (a, b) = tokio::join!(
        {
            let h = h.clone();
            async move { h.assistant.handle_turn("sess-g", "req-1", "one").await }
        },
        {
            let h = h.clone();
            async move { h.assistant.handle_turn("sess-g", "req-2", "two").await }
        }
    );
    let (a, b) = (a.unwrap(), b.unwrap());

    // Both turns completed and neither update was lost: the later version
    // contains both history entries.
    let latest = if a.version > b.version { &a } else { &b };
    assert_eq!(latest.history.len(), 2);
    let cp = h.store.load("sess-g").await.unwrap().expect("checkpoint");
    assert_eq!(cp.state.version, latest.version);
}
