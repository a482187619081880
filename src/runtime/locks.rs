//! Per-session serialization.
//!
//! Checkpoint read-modify-write is not atomic, so two turns for the same
//! session must never interleave. Each session gets one async mutex held for
//! the whole turn; different sessions proceed independently.

use std::sync::{Arc, Mutex};

use rustc_hash::FxHashMap;

#[derive(Debug, Default)]
pub struct SessionLocks {
    inner: Mutex<FxHashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl SessionLocks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch (or create) the lock for a session. The caller holds the
    /// returned mutex for the duration of the turn.
    #[must_use]
    pub fn acquire(&self, session_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut map = match self.inner.lock() {
            Ok(map) => map,
            Err(poisoned) => poisoned.into_inner(),
        };
        map.entry(session_id.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }
}
