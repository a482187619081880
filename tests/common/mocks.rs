//! Scripted collaborator mocks.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use careflow::collaborators::classifier::{
    Answer, AnswerRequest, Classifier, ClassifierError, ConfirmationDecision, ConfirmationOutcome,
    IntentOutcome, IntentRequest, SemanticMatchOutcome, SemanticMatchRequest,
};
use careflow::collaborators::repository::{
    AppointmentRow, AppointmentStatus, Repository, RepositoryError, UserCriteria, UserRow,
};

/// Classifier returning scripted outcomes in FIFO order. When a queue is
/// empty the documented fallback value is returned, which keeps unscripted
/// paths deterministic.
#[derive(Default)]
pub struct MockClassifier {
    intents: Mutex<VecDeque<IntentOutcome>>,
    answers: Mutex<VecDeque<Answer>>,
    confirmations: Mutex<VecDeque<ConfirmationOutcome>>,
    semantic: Mutex<VecDeque<SemanticMatchOutcome>>,
    semantic_calls: AtomicUsize,
    pub fail_intents: AtomicBool,
}

impl MockClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_intent(&self, outcome: IntentOutcome) {
        self.intents.lock().unwrap().push_back(outcome);
    }

    pub fn push_answer(&self, text: &str) {
        self.answers.lock().unwrap().push_back(Answer {
            text: text.to_string(),
            confidence: 0.9,
        });
    }

    pub fn push_confirmation(&self, decision: ConfirmationDecision) {
        self.confirmations.lock().unwrap().push_back(ConfirmationOutcome {
            decision,
            confidence: 0.9,
            reasoning: None,
        });
    }

    pub fn push_semantic(&self, outcome: SemanticMatchOutcome) {
        self.semantic.lock().unwrap().push_back(outcome);
    }

    pub fn semantic_calls(&self) -> usize {
        self.semantic_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Classifier for MockClassifier {
    async fn classify_intent(
        &self,
        _request: IntentRequest,
    ) -> Result<IntentOutcome, ClassifierError> {
        if self.fail_intents.load(Ordering::SeqCst) {
            return Err(ClassifierError::Provider {
                message: "scripted failure".to_string(),
            });
        }
        Ok(self
            .intents
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(IntentOutcome::fallback))
    }

    async fn answer_question(&self, _request: AnswerRequest) -> Result<Answer, ClassifierError> {
        Ok(self
            .answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(Answer::fallback))
    }

    async fn classify_confirmation(
        &self,
        _reply: &str,
    ) -> Result<ConfirmationOutcome, ClassifierError> {
        Ok(self
            .confirmations
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(ConfirmationOutcome::fallback))
    }

    async fn match_appointment(
        &self,
        _request: SemanticMatchRequest,
    ) -> Result<SemanticMatchOutcome, ClassifierError> {
        self.semantic_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .semantic
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| SemanticMatchOutcome::no_match("no scripted match")))
    }
}

/// Fixture-backed repository with call counting on status updates.
#[derive(Default)]
pub struct MockRepository {
    users: Vec<UserRow>,
    appointments: Mutex<Vec<AppointmentRow>>,
    update_calls: AtomicUsize,
    pub fail_updates: AtomicBool,
}

impl MockRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, user: UserRow) -> Self {
        self.users.push(user);
        self
    }

    pub fn with_appointment(self, row: AppointmentRow) -> Self {
        self.appointments.lock().unwrap().push(row);
        self
    }

    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    pub fn appointment_status(&self, id: &str) -> Option<AppointmentStatus> {
        self.appointments
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id)
            .map(|r| r.status)
    }
}

#[async_trait]
impl Repository for MockRepository {
    async fn find_user(&self, criteria: &UserCriteria) -> Result<Vec<UserRow>, RepositoryError> {
        Ok(self
            .users
            .iter()
            .filter(|u| {
                criteria
                    .full_name
                    .as_deref()
                    .is_none_or(|v| u.full_name == v)
                    && criteria
                        .phone_number
                        .as_deref()
                        .is_none_or(|v| u.phone_number == v)
                    && criteria
                        .date_of_birth
                        .as_deref()
                        .is_none_or(|v| u.date_of_birth == v)
            })
            .cloned()
            .collect())
    }

    async fn find_appointments_by_patient(
        &self,
        _patient_id: &str,
    ) -> Result<Vec<AppointmentRow>, RepositoryError> {
        Ok(self.appointments.lock().unwrap().clone())
    }

    async fn update_appointment_status(
        &self,
        appointment_id: &str,
        status: AppointmentStatus,
    ) -> Result<AppointmentRow, RepositoryError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(RepositoryError::Backend {
                message: "scripted failure".to_string(),
            });
        }
        let mut rows = self.appointments.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|r| r.id == appointment_id)
            .ok_or_else(|| RepositoryError::AppointmentNotFound {
                id: appointment_id.to_string(),
            })?;
        row.status = status;
        Ok(row.clone())
    }
}
