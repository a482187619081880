//! Verification algorithms: identity resolution and appointment matching.
//!
//! Both produce either a positive record or a structured diagnostic that the
//! clarification flow turns into a targeted re-ask. Records are created here
//! and nowhere else.

pub mod diagnostics;
pub mod matcher;
pub mod resolver;

pub use diagnostics::{
    AppointmentField, IdentityField, MatchDiagnostics, MatchFailure, VerificationDiagnostics,
    VerificationFailure,
};
pub use matcher::{AppointmentMatcher, MatchMethod, MatchOutcome};
pub use resolver::{VerificationOutcome, VerificationResolver};
