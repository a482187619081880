//! Progressive identity verification with partial-match diagnosis.

use std::sync::Arc;
use std::time::Duration;

use tracing::instrument;

use crate::collaborators::repository::{Repository, UserCriteria, UserRow};
use crate::collaborators::call_with_timeout;
use crate::state::{IdentityFields, VerificationRecord};
use crate::verify::diagnostics::{
    IdentityField, VerificationDiagnostics, VerificationFailure,
};

/// Result of a verification attempt.
#[derive(Clone, Debug, PartialEq)]
pub enum VerificationOutcome {
    Verified(VerificationRecord),
    Failed(VerificationDiagnostics),
}

/// Resolves a caller's identity against the patient repository.
///
/// The algorithm is progressive: an exact lookup over all three fields first,
/// then three independent single-field probes to estimate which of the
/// provided values are plausible. Repository failures degrade to the
/// no-match sentinel (an empty row set) so a flaky backend produces a
/// clarification, not a crashed turn.
pub struct VerificationResolver {
    repository: Arc<dyn Repository>,
    timeout: Duration,
}

impl VerificationResolver {
    pub fn new(repository: Arc<dyn Repository>, timeout: Duration) -> Self {
        Self {
            repository,
            timeout,
        }
    }

    #[instrument(skip(self, info))]
    pub async fn resolve(&self, info: &IdentityFields) -> VerificationOutcome {
        let missing = info.missing_fields();
        if missing.len() == IdentityField::ALL.len() {
            return VerificationOutcome::Failed(VerificationDiagnostics::missing(
                VerificationFailure::NoInfoProvided,
                missing,
            ));
        }
        if !missing.is_empty() {
            return VerificationOutcome::Failed(VerificationDiagnostics::missing(
                VerificationFailure::IncompleteInfo,
                missing,
            ));
        }

        let (Some(full_name), Some(phone_number), Some(date_of_birth)) = (
            info.get(IdentityField::FullName),
            info.get(IdentityField::PhoneNumber),
            info.get(IdentityField::DateOfBirth),
        ) else {
            // Guarded by the missing-fields check above.
            return VerificationOutcome::Failed(VerificationDiagnostics::missing(
                VerificationFailure::IncompleteInfo,
                info.missing_fields(),
            ));
        };

        let exact = self
            .lookup(&UserCriteria::exact(full_name, phone_number, date_of_birth))
            .await;
        if let Some(row) = exact.first() {
            tracing::info!(user_id = %row.id, "identity verified by exact match");
            return VerificationOutcome::Verified(VerificationRecord::from(row));
        }

        // No complete match: probe each field on its own to see which of the
        // provided values exist anywhere in the repository.
        let probes = [
            (
                IdentityField::FullName,
                UserCriteria {
                    full_name: Some(full_name.to_string()),
                    ..UserCriteria::default()
                },
            ),
            (
                IdentityField::PhoneNumber,
                UserCriteria {
                    phone_number: Some(phone_number.to_string()),
                    ..UserCriteria::default()
                },
            ),
            (
                IdentityField::DateOfBirth,
                UserCriteria {
                    date_of_birth: Some(date_of_birth.to_string()),
                    ..UserCriteria::default()
                },
            ),
        ];

        let mut likely_incorrect = Vec::new();
        let mut possibly_correct = Vec::new();
        for (field, criteria) in probes {
            if self.lookup(&criteria).await.is_empty() {
                likely_incorrect.push(field);
            } else {
                possibly_correct.push(field);
            }
        }

        let reason = match likely_incorrect.len() {
            3 => VerificationFailure::UserNotFound,
            2 => VerificationFailure::MultipleFieldsIncorrect,
            1 => VerificationFailure::SingleFieldIncorrect,
            _ => VerificationFailure::NoCompleteMatch,
        };
        tracing::info!(
            ?reason,
            likely = likely_incorrect.len(),
            possible = possibly_correct.len(),
            "identity verification failed"
        );

        VerificationOutcome::Failed(VerificationDiagnostics {
            reason,
            missing: Vec::new(),
            likely_incorrect,
            possibly_correct,
        })
    }

    async fn lookup(&self, criteria: &UserCriteria) -> Vec<UserRow> {
        match call_with_timeout(self.timeout, self.repository.find_user(criteria)).await {
            Ok(rows) => rows,
            Err(err) => {
                tracing::warn!(error = %err, "user lookup failed; treating as no match");
                Vec::new()
            }
        }
    }
}
