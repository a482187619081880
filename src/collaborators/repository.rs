//! Repository boundary: patients, appointments, and status transitions.
//!
//! Row shapes mirror what the dialogue actually reads. How they are produced
//! (SQL, ORM, fixtures) is the implementor's concern.

use async_trait::async_trait;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

use super::TimeoutError;

/// Lifecycle status of an appointment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    CanceledByPatient,
    CanceledByClinic,
}

impl AppointmentStatus {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::CanceledByPatient => "canceled_by_patient",
            AppointmentStatus::CanceledByClinic => "canceled_by_clinic",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A patient row as returned by identity lookups.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRow {
    pub id: String,
    pub full_name: String,
    pub phone_number: String,
    pub date_of_birth: String,
}

/// Provider details embedded in an appointment row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderInfo {
    pub full_name: String,
    pub specialty: String,
}

/// Clinic details embedded in an appointment row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClinicInfo {
    pub name: String,
    pub address_line1: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
}

/// An appointment row as returned by per-patient queries.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentRow {
    pub id: String,
    pub starts_at: String,
    pub ends_at: String,
    pub reason: String,
    pub status: AppointmentStatus,
    pub provider: ProviderInfo,
    pub clinic: ClinicInfo,
}

/// Exact-match lookup criteria for [`Repository::find_user`].
///
/// Only `Some` fields participate in the match; the verification resolver
/// issues an all-fields lookup first and then independent single-field
/// probes to estimate which collected values are plausible.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCriteria {
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
    pub date_of_birth: Option<String>,
}

impl UserCriteria {
    pub fn exact(full_name: &str, phone_number: &str, date_of_birth: &str) -> Self {
        Self {
            full_name: Some(full_name.to_string()),
            phone_number: Some(phone_number.to_string()),
            date_of_birth: Some(date_of_birth.to_string()),
        }
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum RepositoryError {
    #[error("appointment not found: {id}")]
    #[diagnostic(code(careflow::repository::not_found))]
    AppointmentNotFound { id: String },

    #[error("repository backend error: {message}")]
    #[diagnostic(
        code(careflow::repository::backend),
        help("Check database connectivity; the turn degrades to a no-match fallback.")
    )]
    Backend { message: String },

    #[error("repository call timed out after {seconds}s")]
    #[diagnostic(code(careflow::repository::timeout))]
    Timeout { seconds: u64 },
}

impl TimeoutError for RepositoryError {
    fn timed_out(after: Duration) -> Self {
        RepositoryError::Timeout {
            seconds: after.as_secs(),
        }
    }
}

/// Relational access required by the dialogue core.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Exact-match patient lookup over the provided criteria fields.
    async fn find_user(&self, criteria: &UserCriteria) -> Result<Vec<UserRow>, RepositoryError>;

    /// All appointments for a verified patient.
    async fn find_appointments_by_patient(
        &self,
        patient_id: &str,
    ) -> Result<Vec<AppointmentRow>, RepositoryError>;

    /// Apply a status transition and return the updated row.
    async fn update_appointment_status(
        &self,
        appointment_id: &str,
        status: AppointmentStatus,
    ) -> Result<AppointmentRow, RepositoryError>;
}
