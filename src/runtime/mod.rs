//! Runtime infrastructure: checkpoints, persistence, locks, configuration.
//!
//! The runtime layer is what makes a turn durable: each completed turn is
//! persisted as the session's latest [`Checkpoint`], and the next inbound
//! message resumes from exactly where the graph paused.

pub mod checkpoint;
pub mod config;
pub mod locks;
pub mod persistence;
#[cfg(feature = "sqlite")]
pub mod store_sqlite;

pub use checkpoint::{
    Checkpoint, CheckpointError, CheckpointStore, InMemoryCheckpointStore,
};
pub use config::{CheckpointBackend, RuntimeConfig};
pub use locks::SessionLocks;
pub use persistence::PersistedCheckpoint;
#[cfg(feature = "sqlite")]
pub use store_sqlite::SqliteCheckpointStore;
