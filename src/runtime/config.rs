//! Runtime configuration.

use std::time::Duration;

/// Which checkpoint backend to use.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CheckpointBackend {
    InMemory,
    #[cfg(feature = "sqlite")]
    Sqlite,
}

/// Tunables for the dialogue runtime.
#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    pub checkpoint: CheckpointBackend,
    /// Database file for the SQLite backend, resolved from
    /// `CAREFLOW_SQLITE_DB` when not set explicitly.
    pub sqlite_db_name: Option<String>,
    /// Deadline for each classifier call.
    pub classifier_timeout: Duration,
    /// Deadline for each repository call.
    pub repository_timeout: Duration,
    /// Unclear confirmation replies tolerated before the action is abandoned.
    pub max_confirmation_attempts: u32,
    /// Minimum non-empty appointment criteria before matching is attempted.
    pub min_match_fields: usize,
    /// Upper bound on nodes executed in one turn.
    pub max_steps_per_turn: u32,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            #[cfg(feature = "sqlite")]
            checkpoint: CheckpointBackend::Sqlite,
            #[cfg(not(feature = "sqlite"))]
            checkpoint: CheckpointBackend::InMemory,
            sqlite_db_name: Self::resolve_sqlite_db_name(None),
            classifier_timeout: Duration::from_secs(10),
            repository_timeout: Duration::from_secs(5),
            max_confirmation_attempts: 3,
            min_match_fields: 1,
            max_steps_per_turn: 32,
        }
    }
}

impl RuntimeConfig {
    fn resolve_sqlite_db_name(provided: Option<String>) -> Option<String> {
        if provided.is_some() {
            return provided;
        }
        dotenvy::dotenv().ok();
        Some(std::env::var("CAREFLOW_SQLITE_DB").unwrap_or_else(|_| "careflow.db".to_string()))
    }

    /// In-memory checkpoints; the usual choice for tests.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            checkpoint: CheckpointBackend::InMemory,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_sqlite_db_name(mut self, name: impl Into<String>) -> Self {
        self.sqlite_db_name = Self::resolve_sqlite_db_name(Some(name.into()));
        self
    }

    #[must_use]
    pub fn with_classifier_timeout(mut self, timeout: Duration) -> Self {
        self.classifier_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_repository_timeout(mut self, timeout: Duration) -> Self {
        self.repository_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_max_confirmation_attempts(mut self, attempts: u32) -> Self {
        self.max_confirmation_attempts = attempts.max(1);
        self
    }
}
