//! Structured explanations of why verification or matching failed.
//!
//! Diagnostics drive two things downstream: the clarification message (which
//! fields to re-ask) and the state cleanup (suspect fields are cleared so the
//! caller is not asked to re-confirm values that already look correct).

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the three identity fields collected during verification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityField {
    FullName,
    PhoneNumber,
    DateOfBirth,
}

impl IdentityField {
    pub const ALL: [IdentityField; 3] = [
        IdentityField::FullName,
        IdentityField::PhoneNumber,
        IdentityField::DateOfBirth,
    ];

    /// Human-readable label for clarification prompts.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            IdentityField::FullName => "full name",
            IdentityField::PhoneNumber => "phone number",
            IdentityField::DateOfBirth => "date of birth",
        }
    }
}

impl fmt::Display for IdentityField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One of the four appointment criteria collected during matching.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentField {
    DoctorFullName,
    ClinicName,
    AppointmentDate,
    Specialty,
}

impl AppointmentField {
    pub const ALL: [AppointmentField; 4] = [
        AppointmentField::DoctorFullName,
        AppointmentField::ClinicName,
        AppointmentField::AppointmentDate,
        AppointmentField::Specialty,
    ];

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            AppointmentField::DoctorFullName => "doctor's name",
            AppointmentField::ClinicName => "clinic name",
            AppointmentField::AppointmentDate => "appointment date",
            AppointmentField::Specialty => "specialty",
        }
    }
}

impl fmt::Display for AppointmentField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Why identity verification did not produce a record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationFailure {
    /// Nothing was provided at all.
    NoInfoProvided,
    /// Some required fields are still missing.
    IncompleteInfo,
    /// All three independent probes came back empty.
    UserNotFound,
    /// Exactly two fields look wrong.
    MultipleFieldsIncorrect,
    /// Exactly one field looks wrong.
    SingleFieldIncorrect,
    /// Every field matches some row, just never the same row.
    NoCompleteMatch,
}

/// Diagnostic payload produced by the verification resolver on failure.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationDiagnostics {
    pub reason: VerificationFailure,
    #[serde(default)]
    pub missing: Vec<IdentityField>,
    #[serde(default)]
    pub likely_incorrect: Vec<IdentityField>,
    #[serde(default)]
    pub possibly_correct: Vec<IdentityField>,
}

impl VerificationDiagnostics {
    pub fn missing(reason: VerificationFailure, missing: Vec<IdentityField>) -> Self {
        Self {
            reason,
            missing,
            likely_incorrect: Vec::new(),
            possibly_correct: Vec::new(),
        }
    }
}

/// Why appointment matching did not produce a record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchFailure {
    /// The patient has no appointments to match against.
    NoAppointments,
    /// No criteria were provided at all.
    NoInfoProvided,
    /// Fewer than the minimum required criteria were provided.
    IncompleteInfo,
    /// The best candidate lacks exactly one provided criterion.
    SingleFieldMismatch,
    /// At least one criterion matches the best candidate, but not all.
    PartialMatch,
    /// No appointment shares any provided criterion.
    NoMatches,
}

/// Diagnostic payload produced by the appointment matcher on failure.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchDiagnostics {
    pub reason: MatchFailure,
    #[serde(default)]
    pub missing: Vec<AppointmentField>,
    #[serde(default)]
    pub likely_incorrect: Vec<AppointmentField>,
    #[serde(default)]
    pub possibly_correct: Vec<AppointmentField>,
    /// Best partial candidate, when one exists.
    #[serde(default)]
    pub best_candidate_id: Option<String>,
}

impl MatchDiagnostics {
    pub fn missing(reason: MatchFailure, missing: Vec<AppointmentField>) -> Self {
        Self {
            reason,
            missing,
            likely_incorrect: Vec::new(),
            possibly_correct: Vec::new(),
            best_candidate_id: None,
        }
    }
}
