//! State and checkpoint round-trips, plus store consistency.

mod common;

use chrono::Utc;
use proptest::prelude::*;

use common::fixtures::{jane_doe, smith_appointment};

use careflow::collaborators::classifier::{ConfirmationDecision, ConfirmationOutcome};
use careflow::runtime::checkpoint::{Checkpoint, CheckpointStore, InMemoryCheckpointStore};
use careflow::state::{
    AppointmentCriteria, AppointmentRecord, DialogueState, IdentityFields, TurnRecord,
    VerificationRecord,
};
use careflow::types::{Intent, NodeId, Route};
use careflow::verify::diagnostics::{
    IdentityField, VerificationDiagnostics, VerificationFailure,
};

/// A state with every optional field populated.
fn populated_state() -> DialogueState {
    let mut state = DialogueState::new("sess-1", "cancel my appointment");
    state.version = 4;
    state.last_request_id = Some("req-9".to_string());
    state.history = vec![
        TurnRecord {
            user_message: "hi".to_string(),
            system_message: "hello".to_string(),
        },
        TurnRecord {
            user_message: "cancel my appointment".to_string(),
            system_message: "which one?".to_string(),
        },
    ];
    state.current_node = Some(NodeId::Clarification);
    state.current_intent = Some(Intent::CancelAppointment);
    state.intent_confidence = 0.92;
    state.route = Some(Route::NotVerified);
    state.is_verified = true;
    state.user_info = IdentityFields {
        full_name: Some("Jane Doe".to_string()),
        phone_number: Some("+15551234567".to_string()),
        date_of_birth: Some("1990-01-01".to_string()),
    };
    state.user_record = Some(VerificationRecord::from(&jane_doe()));
    state.verification_diagnostics = Some(VerificationDiagnostics {
        reason: VerificationFailure::SingleFieldIncorrect,
        missing: vec![],
        likely_incorrect: vec![IdentityField::DateOfBirth],
        possibly_correct: vec![IdentityField::FullName, IdentityField::PhoneNumber],
    });
    state.appointments = vec![smith_appointment()];
    state.appointment_info = AppointmentCriteria {
        doctor_full_name: Some("Smith".to_string()),
        clinic_name: None,
        appointment_date: None,
        specialty: None,
    };
    state.appointment_record = Some(AppointmentRecord::from(&smith_appointment()));
    state.confirmation_intent = Some(ConfirmationOutcome {
        decision: ConfirmationDecision::Unclear,
        confidence: 0.4,
        reasoning: Some("ambiguous reply".to_string()),
    });
    state.confirmation_attempts = 2;
    state.pending_reply = Some("staged".to_string());
    state
}

#[test]
fn state_round_trips_field_for_field() {
    let state = populated_state();
    let json = serde_json::to_string(&state).unwrap();
    let back: DialogueState = serde_json::from_str(&json).unwrap();
    assert_eq!(state, back);
}

#[test]
fn state_deserializes_with_missing_optional_fields() {
    // A minimal persisted shape from an older writer still loads.
    let json = r#"{"version": 1, "session_id": "s", "user_message": "hi"}"#;
    let state: DialogueState = serde_json::from_str(json).unwrap();
    assert_eq!(state.session_id, "s");
    assert!(state.history.is_empty());
    assert!(state.user_record.is_none());
    assert_eq!(state.confirmation_attempts, 0);
}

proptest! {
    #[test]
    fn history_and_scalars_round_trip(
        session_id in "[a-z0-9-]{1,16}",
        user_message in ".{0,64}",
        version in 1u32..1000,
        history in prop::collection::vec((".{0,32}", ".{0,32}"), 0..8),
        attempts in 0u32..10,
    ) {
        let mut state = DialogueState::new(session_id, user_message);
        state.version = version;
        state.confirmation_attempts = attempts;
        state.history = history
            .into_iter()
            .map(|(u, s)| TurnRecord { user_message: u, system_message: s })
            .collect();
        let json = serde_json::to_string(&state).unwrap();
        let back: DialogueState = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(state, back);
    }
}

#[tokio::test]
async fn in_memory_store_is_read_your_writes() {
    let store = InMemoryCheckpointStore::new();
    let cp = Checkpoint {
        session_id: "s1".to_string(),
        state: populated_state(),
        next_nodes: vec![NodeId::ConversationManager],
        interrupted: true,
        created_at: Utc::now(),
    };
    store.save(cp.clone()).await.unwrap();
    let loaded = store.load("s1").await.unwrap().expect("checkpoint");
    assert_eq!(loaded.state, cp.state);
    assert_eq!(loaded.next_nodes, cp.next_nodes);
    assert!(loaded.interrupted);
    assert!(store.load("other").await.unwrap().is_none());
}

#[cfg(feature = "sqlite")]
#[tokio::test]
async fn sqlite_store_round_trips_and_keeps_only_the_latest() {
    use careflow::runtime::SqliteCheckpointStore;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("careflow-test.db");
    let url = format!("sqlite://{}", db_path.display());
    let store = SqliteCheckpointStore::connect(&url).await.unwrap();

    let mut cp = Checkpoint {
        session_id: "s1".to_string(),
        state: populated_state(),
        next_nodes: vec![NodeId::ProcessConfirmation],
        interrupted: true,
        created_at: Utc::now(),
    };
    store.save(cp.clone()).await.unwrap();

    let loaded = store.load("s1").await.unwrap().expect("checkpoint");
    assert_eq!(loaded.state, cp.state);
    assert_eq!(loaded.next_nodes, vec![NodeId::ProcessConfirmation]);
    assert!(loaded.interrupted);

    // Overwrite with the next turn; only the latest row survives.
    cp.state.version += 1;
    cp.next_nodes = vec![NodeId::ConversationManager];
    cp.interrupted = true;
    store.save(cp.clone()).await.unwrap();
    let loaded = store.load("s1").await.unwrap().expect("checkpoint");
    assert_eq!(loaded.state.version, cp.state.version);
    assert_eq!(loaded.next_nodes, vec![NodeId::ConversationManager]);
}
