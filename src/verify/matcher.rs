//! Appointment matching: direct containment pass, semantic fallback, and
//! diagnostic degradation.

use std::sync::Arc;
use std::time::Duration;

use tracing::instrument;

use crate::collaborators::call_with_timeout;
use crate::collaborators::classifier::{Classifier, SemanticMatchOutcome, SemanticMatchRequest};
use crate::collaborators::repository::AppointmentRow;
use crate::state::{AppointmentCriteria, AppointmentRecord};
use crate::verify::diagnostics::{AppointmentField, MatchDiagnostics, MatchFailure};

/// How a match was established.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchMethod {
    /// Normalized containment over every provided criterion, unique hit.
    Direct,
    /// The semantic classifier picked the candidate.
    Semantic,
}

/// Result of an appointment-matching attempt.
#[derive(Clone, Debug, PartialEq)]
pub enum MatchOutcome {
    Matched {
        record: AppointmentRecord,
        confidence: f32,
        method: MatchMethod,
    },
    Failed(MatchDiagnostics),
}

/// Matches collected criteria against the session's cached appointments.
pub struct AppointmentMatcher {
    classifier: Arc<dyn Classifier>,
    timeout: Duration,
    /// Minimum number of non-empty criteria before matching is attempted.
    min_required_fields: usize,
}

impl AppointmentMatcher {
    pub fn new(classifier: Arc<dyn Classifier>, timeout: Duration) -> Self {
        Self {
            classifier,
            timeout,
            min_required_fields: 1,
        }
    }

    #[must_use]
    pub fn with_min_required_fields(mut self, min_required_fields: usize) -> Self {
        self.min_required_fields = min_required_fields.max(1);
        self
    }

    #[instrument(skip(self, appointments, criteria), fields(candidates = appointments.len()))]
    pub async fn resolve(
        &self,
        appointments: &[AppointmentRow],
        criteria: &AppointmentCriteria,
    ) -> MatchOutcome {
        if appointments.is_empty() {
            return MatchOutcome::Failed(MatchDiagnostics::missing(
                MatchFailure::NoAppointments,
                criteria.missing_fields(),
            ));
        }
        let provided = criteria.provided();
        if provided.is_empty() {
            return MatchOutcome::Failed(MatchDiagnostics::missing(
                MatchFailure::NoInfoProvided,
                AppointmentField::ALL.to_vec(),
            ));
        }
        if provided.len() < self.min_required_fields {
            return MatchOutcome::Failed(MatchDiagnostics::missing(
                MatchFailure::IncompleteInfo,
                criteria.missing_fields(),
            ));
        }

        // Direct pass: a single appointment satisfying every provided
        // criterion wins outright, no classifier involved.
        let direct: Vec<&AppointmentRow> = appointments
            .iter()
            .filter(|row| provided.iter().all(|(f, v)| field_matches(row, *f, v)))
            .collect();
        if let [only] = direct.as_slice() {
            tracing::info!(appointment = %only.id, "direct appointment match");
            return MatchOutcome::Matched {
                record: AppointmentRecord::from(*only),
                confidence: 1.0,
                method: MatchMethod::Direct,
            };
        }

        // Zero or multiple direct candidates: let the semantic classifier
        // weigh the textual rendering of the criteria against every
        // candidate.
        let request = SemanticMatchRequest {
            criteria_text: render_criteria(criteria),
            appointments_text: render_appointments(appointments),
        };
        let semantic = match call_with_timeout(self.timeout, self.classifier.match_appointment(request))
            .await
        {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::warn!(error = %err, "semantic match failed; degrading to diagnosis");
                SemanticMatchOutcome::no_match("classifier unavailable")
            }
        };
        if semantic.match_found
            && let Some(id) = &semantic.matched_id
            && let Some(row) = appointments.iter().find(|r| &r.id == id)
        {
            tracing::info!(
                appointment = %row.id,
                confidence = semantic.confidence,
                "semantic appointment match"
            );
            return MatchOutcome::Matched {
                record: AppointmentRecord::from(row),
                confidence: semantic.confidence,
                method: MatchMethod::Semantic,
            };
        }

        MatchOutcome::Failed(self.diagnose(appointments, criteria, &provided))
    }

    /// Recompute per-appointment partial-match counts and explain the miss.
    fn diagnose(
        &self,
        appointments: &[AppointmentRow],
        criteria: &AppointmentCriteria,
        provided: &[(AppointmentField, &str)],
    ) -> MatchDiagnostics {
        let mut best: Option<(&AppointmentRow, Vec<AppointmentField>)> = None;
        for row in appointments {
            let matched: Vec<AppointmentField> = provided
                .iter()
                .filter(|(f, v)| field_matches(row, *f, v))
                .map(|(f, _)| *f)
                .collect();
            let better = match &best {
                None => true,
                Some((_, current)) => matched.len() > current.len(),
            };
            if better {
                best = Some((row, matched));
            }
        }

        let (best_candidate_id, matched_fields) = match best {
            Some((row, matched)) => (Some(row.id.clone()), matched),
            None => (None, Vec::new()),
        };
        let reason = if matched_fields.is_empty() {
            MatchFailure::NoMatches
        } else if provided.len() - matched_fields.len() == 1 {
            MatchFailure::SingleFieldMismatch
        } else {
            MatchFailure::PartialMatch
        };
        let likely_incorrect: Vec<AppointmentField> = provided
            .iter()
            .map(|(f, _)| *f)
            .filter(|f| !matched_fields.contains(f))
            .collect();

        tracing::info!(
            ?reason,
            best = best_candidate_id.as_deref().unwrap_or("-"),
            "appointment match failed"
        );

        MatchDiagnostics {
            reason,
            missing: criteria.missing_fields(),
            likely_incorrect,
            possibly_correct: matched_fields,
            best_candidate_id,
        }
    }
}

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Bidirectional substring containment over normalized values. "Smith"
/// matches "Dr. Emily Smith" and vice versa; blanks never match.
fn contains_either(a: &str, b: &str) -> bool {
    let (a, b) = (normalize(a), normalize(b));
    !a.is_empty() && !b.is_empty() && (a.contains(&b) || b.contains(&a))
}

fn field_value(row: &AppointmentRow, field: AppointmentField) -> &str {
    match field {
        AppointmentField::DoctorFullName => &row.provider.full_name,
        AppointmentField::ClinicName => &row.clinic.name,
        AppointmentField::AppointmentDate => &row.starts_at,
        AppointmentField::Specialty => &row.provider.specialty,
    }
}

fn field_matches(row: &AppointmentRow, field: AppointmentField, value: &str) -> bool {
    contains_either(field_value(row, field), value)
}

/// Render the provided criteria for the semantic classifier.
fn render_criteria(criteria: &AppointmentCriteria) -> String {
    let mut parts = Vec::new();
    if let Some(doctor) = criteria.get(AppointmentField::DoctorFullName) {
        parts.push(format!("- Doctor: {doctor}"));
    }
    if let Some(clinic) = criteria.get(AppointmentField::ClinicName) {
        parts.push(format!("- Clinic: {clinic}"));
    }
    if let Some(date) = criteria.get(AppointmentField::AppointmentDate) {
        parts.push(format!("- Date/Time: {date}"));
    }
    if let Some(specialty) = criteria.get(AppointmentField::Specialty) {
        parts.push(format!("- Specialty: {specialty}"));
    }
    if parts.is_empty() {
        "No specific criteria provided".to_string()
    } else {
        parts.join("\n")
    }
}

/// Render every candidate for the semantic classifier.
fn render_appointments(appointments: &[AppointmentRow]) -> String {
    let mut text = String::new();
    for (idx, row) in appointments.iter().enumerate() {
        text.push_str(&format!(
            "Appointment {n}:\n\
             - ID: {id}\n\
             - Date/Time: {starts} to {ends}\n\
             - Doctor: {doctor}\n\
             - Specialty: {specialty}\n\
             - Clinic: {clinic}\n\
             - Address: {address}, {city}, {state}\n\
             - Reason: {reason}\n\
             - Status: {status}\n\
             ---\n",
            n = idx + 1,
            id = row.id,
            starts = row.starts_at,
            ends = row.ends_at,
            doctor = row.provider.full_name,
            specialty = row.provider.specialty,
            clinic = row.clinic.name,
            address = row.clinic.address_line1,
            city = row.clinic.city,
            state = row.clinic.state,
            reason = row.reason,
            status = row.status,
        ));
    }
    text
}
