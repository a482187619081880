//! Per-session dialogue state.
//!
//! One [`DialogueState`] exists per conversation session. It is an explicit,
//! versioned struct with typed optional fields: which node owns which field is
//! visible in the node code, and the compiler rejects reads of fields that do
//! not exist. The whole struct round-trips through serde unchanged, which is
//! what the checkpoint store relies on.

use serde::{Deserialize, Serialize};

use crate::collaborators::classifier::ConfirmationOutcome;
use crate::collaborators::repository::{AppointmentRow, UserRow};
use crate::types::{Intent, NodeId, Route};
use crate::verify::diagnostics::{
    AppointmentField, IdentityField, MatchDiagnostics, VerificationDiagnostics,
};

/// One completed exchange: the inbound message and the reply it produced.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnRecord {
    pub user_message: String,
    pub system_message: String,
}

/// Identity fields collected from the caller, uncorroborated until the
/// verification resolver confirms them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityFields {
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
    pub date_of_birth: Option<String>,
}

impl IdentityFields {
    #[must_use]
    pub fn get(&self, field: IdentityField) -> Option<&str> {
        let value = match field {
            IdentityField::FullName => &self.full_name,
            IdentityField::PhoneNumber => &self.phone_number,
            IdentityField::DateOfBirth => &self.date_of_birth,
        };
        value.as_deref().filter(|v| !v.trim().is_empty())
    }

    pub fn clear(&mut self, field: IdentityField) {
        match field {
            IdentityField::FullName => self.full_name = None,
            IdentityField::PhoneNumber => self.phone_number = None,
            IdentityField::DateOfBirth => self.date_of_birth = None,
        }
    }

    /// Overlay newly extracted values; existing values are only replaced by
    /// non-empty ones, so a vague follow-up message cannot erase what the
    /// caller already provided.
    pub fn merge(&mut self, other: IdentityFields) {
        let IdentityFields {
            full_name,
            phone_number,
            date_of_birth,
        } = other;
        for (slot, incoming) in [
            (&mut self.full_name, full_name),
            (&mut self.phone_number, phone_number),
            (&mut self.date_of_birth, date_of_birth),
        ] {
            if let Some(value) = incoming
                && !value.trim().is_empty()
            {
                *slot = Some(value);
            }
        }
    }

    #[must_use]
    pub fn missing_fields(&self) -> Vec<IdentityField> {
        IdentityField::ALL
            .into_iter()
            .filter(|f| self.get(*f).is_none())
            .collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        IdentityField::ALL.into_iter().all(|f| self.get(f).is_none())
    }
}

/// Appointment criteria collected from the caller.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentCriteria {
    pub doctor_full_name: Option<String>,
    pub clinic_name: Option<String>,
    pub appointment_date: Option<String>,
    pub specialty: Option<String>,
}

impl AppointmentCriteria {
    #[must_use]
    pub fn get(&self, field: AppointmentField) -> Option<&str> {
        let value = match field {
            AppointmentField::DoctorFullName => &self.doctor_full_name,
            AppointmentField::ClinicName => &self.clinic_name,
            AppointmentField::AppointmentDate => &self.appointment_date,
            AppointmentField::Specialty => &self.specialty,
        };
        value.as_deref().filter(|v| !v.trim().is_empty())
    }

    pub fn clear(&mut self, field: AppointmentField) {
        match field {
            AppointmentField::DoctorFullName => self.doctor_full_name = None,
            AppointmentField::ClinicName => self.clinic_name = None,
            AppointmentField::AppointmentDate => self.appointment_date = None,
            AppointmentField::Specialty => self.specialty = None,
        }
    }

    /// Overlay newly extracted values, keeping existing non-empty ones.
    pub fn merge(&mut self, other: AppointmentCriteria) {
        let AppointmentCriteria {
            doctor_full_name,
            clinic_name,
            appointment_date,
            specialty,
        } = other;
        for (slot, incoming) in [
            (&mut self.doctor_full_name, doctor_full_name),
            (&mut self.clinic_name, clinic_name),
            (&mut self.appointment_date, appointment_date),
            (&mut self.specialty, specialty),
        ] {
            if let Some(value) = incoming
                && !value.trim().is_empty()
            {
                *slot = Some(value);
            }
        }
    }

    /// The criteria the caller actually provided, in declaration order.
    #[must_use]
    pub fn provided(&self) -> Vec<(AppointmentField, &str)> {
        AppointmentField::ALL
            .into_iter()
            .filter_map(|f| self.get(f).map(|v| (f, v)))
            .collect()
    }

    #[must_use]
    pub fn missing_fields(&self) -> Vec<AppointmentField> {
        AppointmentField::ALL
            .into_iter()
            .filter(|f| self.get(*f).is_none())
            .collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.provided().is_empty()
    }
}

/// Corroborated identity, created only by the verification resolver.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRecord {
    pub user_id: String,
    pub full_name: String,
    pub phone_number: String,
    pub date_of_birth: String,
}

impl From<&UserRow> for VerificationRecord {
    fn from(row: &UserRow) -> Self {
        Self {
            user_id: row.id.clone(),
            full_name: row.full_name.clone(),
            phone_number: row.phone_number.clone(),
            date_of_birth: row.date_of_birth.clone(),
        }
    }
}

/// The resolved appointment, created only by the appointment matcher.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentRecord {
    pub appointment_id: String,
    pub doctor_full_name: String,
    pub clinic_name: String,
    pub appointment_date: String,
    pub specialty: String,
}

impl From<&AppointmentRow> for AppointmentRecord {
    fn from(row: &AppointmentRow) -> Self {
        Self {
            appointment_id: row.id.clone(),
            doctor_full_name: row.provider.full_name.clone(),
            clinic_name: row.clinic.name.clone(),
            appointment_date: row.starts_at.clone(),
            specialty: row.provider.specialty.clone(),
        }
    }
}

/// The complete per-session state threaded through the graph.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DialogueState {
    /// Bumped once per turn; checkpoints carry the version they persisted.
    pub version: u32,
    pub session_id: String,
    /// Request id of the turn that produced this state. Used to make retried
    /// requests idempotent.
    #[serde(default)]
    pub last_request_id: Option<String>,
    /// The inbound message currently being processed.
    pub user_message: String,
    /// Append-only exchange history.
    #[serde(default)]
    pub history: Vec<TurnRecord>,
    #[serde(default)]
    pub current_node: Option<NodeId>,
    #[serde(default)]
    pub current_intent: Option<Intent>,
    #[serde(default)]
    pub intent_confidence: f32,
    #[serde(default)]
    pub route: Option<Route>,

    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub user_info: IdentityFields,
    #[serde(default)]
    pub user_record: Option<VerificationRecord>,
    #[serde(default)]
    pub verification_diagnostics: Option<VerificationDiagnostics>,

    /// Appointments cached for the session after the first repository fetch.
    #[serde(default)]
    pub appointments: Vec<AppointmentRow>,
    #[serde(default)]
    pub appointment_info: AppointmentCriteria,
    #[serde(default)]
    pub appointment_record: Option<AppointmentRecord>,
    #[serde(default)]
    pub appointment_diagnostics: Option<MatchDiagnostics>,

    #[serde(default)]
    pub confirmation_intent: Option<ConfirmationOutcome>,
    #[serde(default)]
    pub confirmation_attempts: u32,

    /// Reply staged by an intermediate node for ActionResponse to render.
    #[serde(default)]
    pub pending_reply: Option<String>,
}

impl DialogueState {
    /// Fresh state for a brand-new session.
    #[must_use]
    pub fn new(session_id: impl Into<String>, user_message: impl Into<String>) -> Self {
        Self {
            version: 1,
            session_id: session_id.into(),
            last_request_id: None,
            user_message: user_message.into(),
            history: Vec::new(),
            current_node: None,
            current_intent: None,
            intent_confidence: 0.0,
            route: None,
            is_verified: false,
            user_info: IdentityFields::default(),
            user_record: None,
            verification_diagnostics: None,
            appointments: Vec::new(),
            appointment_info: AppointmentCriteria::default(),
            appointment_record: None,
            appointment_diagnostics: None,
            confirmation_intent: None,
            confirmation_attempts: 0,
            pending_reply: None,
        }
    }

    /// Prepare a resumed state for the next inbound message.
    pub fn begin_turn(&mut self, request_id: &str, user_message: &str) {
        self.version = self.version.saturating_add(1);
        self.last_request_id = Some(request_id.to_string());
        self.user_message = user_message.to_string();
    }

    /// Append the exchange for the current inbound message.
    pub fn push_turn(&mut self, system_message: impl Into<String>) {
        self.history.push(TurnRecord {
            user_message: self.user_message.clone(),
            system_message: system_message.into(),
        });
    }

    /// The reply produced by the most recent turn, if any.
    #[must_use]
    pub fn last_reply(&self) -> Option<&str> {
        self.history.last().map(|t| t.system_message.as_str())
    }

    /// Forget the corroborated identity so the flow re-verifies from scratch.
    pub fn reset_identity(&mut self) {
        self.is_verified = false;
        self.user_record = None;
        self.user_info = IdentityFields::default();
        self.verification_diagnostics = None;
    }

    /// Close out a completed or abandoned action so the next request
    /// re-resolves the appointment.
    pub fn clear_action(&mut self) {
        self.appointment_info = AppointmentCriteria::default();
        self.appointment_diagnostics = None;
        self.confirmation_intent = None;
        self.confirmation_attempts = 0;
        self.pending_reply = None;
    }
}
