//! External collaborators consumed by the dialogue core.
//!
//! The engine treats natural-language understanding and relational storage as
//! black boxes behind two traits: [`Classifier`] and [`Repository`]. Both are
//! injected into nodes at graph construction time, so tests swap in mocks and
//! transports wire in real implementations without touching the core.
//!
//! Every call into a collaborator is wrapped in a bounded timeout via
//! [`call_with_timeout`]; a timeout is an ordinary collaborator failure that
//! callers recover from with the documented fallback values.

pub mod classifier;
pub mod repository;

pub use classifier::{
    Answer, AnswerRequest, Classifier, ClassifierError, ConfirmationDecision, ConfirmationOutcome,
    IntentOutcome, IntentRequest, SemanticMatchOutcome, SemanticMatchRequest,
};
pub use repository::{
    AppointmentRow, AppointmentStatus, ClinicInfo, ProviderInfo, Repository, RepositoryError,
    UserCriteria, UserRow,
};

use std::future::Future;
use std::time::Duration;

/// Errors that can represent an elapsed call deadline.
pub trait TimeoutError {
    fn timed_out(after: Duration) -> Self;
}

/// Await `fut` for at most `limit`, mapping expiry into the error type's
/// timeout variant.
pub async fn call_with_timeout<T, E, F>(limit: Duration, fut: F) -> Result<T, E>
where
    E: TimeoutError,
    F: Future<Output = Result<T, E>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(E::timed_out(limit)),
    }
}
