//! SQLite-backed checkpoint store.
//!
//! One row per session, overwritten on every save. Uses the persistence
//! models for encoding; embedded migrations run on connect when the
//! `sqlite-migrations` feature (default) is enabled.

use std::sync::Arc;

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::instrument;

use super::checkpoint::{Checkpoint, CheckpointError, CheckpointStore, Result};
use super::persistence::{state_from_json, state_to_json};
use crate::types::NodeId;

/// Durable checkpoint storage on SQLite.
pub struct SqliteCheckpointStore {
    pool: Arc<SqlitePool>,
}

impl std::fmt::Debug for SqliteCheckpointStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteCheckpointStore").finish()
    }
}

impl SqliteCheckpointStore {
    /// Connect (or create) a SQLite database at `database_url`, e.g.
    /// `sqlite://careflow.db`.
    #[instrument(skip(database_url))]
    pub async fn connect(database_url: &str) -> Result<Self> {
        ensure_sqlite_file(database_url);
        let pool = SqlitePool::connect(database_url)
            .await
            .map_err(|e| CheckpointError::Backend {
                message: format!("connect error: {e}"),
            })?;
        #[cfg(feature = "sqlite-migrations")]
        {
            if let Err(e) = sqlx::migrate!("./migrations").run(&pool).await {
                return Err(CheckpointError::Backend {
                    message: format!("migration failure: {e}"),
                });
            }
        }
        Ok(Self {
            pool: Arc::new(pool),
        })
    }
}

/// SQLite won't create the database file on connect; make sure it exists.
fn ensure_sqlite_file(database_url: &str) {
    if let Some(path) = database_url.strip_prefix("sqlite://") {
        let path = path.trim();
        if !path.is_empty() && path != ":memory:" {
            let p = std::path::Path::new(path);
            if let Some(parent) = p.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            if !p.exists() {
                let _ = std::fs::File::create_new(p);
            }
        }
    }
}

#[async_trait::async_trait]
impl CheckpointStore for SqliteCheckpointStore {
    #[instrument(skip(self), err)]
    async fn load(&self, session_id: &str) -> Result<Option<Checkpoint>> {
        let row_opt: Option<SqliteRow> = sqlx::query(
            r#"
            SELECT session_id, state_json, next_nodes_json, interrupted, created_at
            FROM checkpoints
            WHERE session_id = ?1
            "#,
        )
        .bind(session_id)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| CheckpointError::Backend {
            message: format!("select checkpoint: {e}"),
        })?;

        let row = match row_opt {
            Some(row) => row,
            None => return Ok(None),
        };

        let state_json: String = row.get("state_json");
        let next_nodes_json: String = row.get("next_nodes_json");
        let interrupted: i64 = row.get("interrupted");
        let created_at_raw: String = row.get("created_at");

        let state = state_from_json(&state_json)?;
        let next_encoded: Vec<String> = serde_json::from_str(&next_nodes_json)
            .map_err(|source| CheckpointError::Serde { source })?;
        let next_nodes = next_encoded
            .iter()
            .map(|s| {
                NodeId::decode(s).ok_or_else(|| CheckpointError::Corrupt {
                    what: format!("unknown node id {s:?}"),
                })
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let created_at = chrono::DateTime::parse_from_rfc3339(&created_at_raw)
            .map(|dt| dt.with_timezone(&chrono::Utc))
            .unwrap_or_else(|_| chrono::Utc::now());

        Ok(Some(Checkpoint {
            session_id: session_id.to_string(),
            state,
            next_nodes,
            interrupted: interrupted != 0,
            created_at,
        }))
    }

    #[instrument(skip(self, checkpoint), fields(session = %checkpoint.session_id), err)]
    async fn save(&self, checkpoint: Checkpoint) -> Result<()> {
        let state_json = state_to_json(&checkpoint.state)?;
        let next_encoded: Vec<String> = checkpoint
            .next_nodes
            .iter()
            .map(|n| n.encode().to_string())
            .collect();
        let next_nodes_json = serde_json::to_string(&next_encoded)
            .map_err(|source| CheckpointError::Serde { source })?;

        sqlx::query(
            r#"
            INSERT INTO checkpoints (session_id, state_json, next_nodes_json, interrupted, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, datetime('now'))
            ON CONFLICT(session_id) DO UPDATE SET
                state_json = excluded.state_json,
                next_nodes_json = excluded.next_nodes_json,
                interrupted = excluded.interrupted,
                created_at = excluded.created_at,
                updated_at = datetime('now')
            "#,
        )
        .bind(&checkpoint.session_id)
        .bind(&state_json)
        .bind(&next_nodes_json)
        .bind(i64::from(checkpoint.interrupted))
        .bind(checkpoint.created_at.to_rfc3339())
        .execute(&*self.pool)
        .await
        .map_err(|e| CheckpointError::Backend {
            message: format!("upsert checkpoint: {e}"),
        })?;

        Ok(())
    }
}
