//! SQLite implementation of the status store.

use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};

use super::StatusStore;
use crate::domain::{EventId, EventStatus};
use crate::error::ScoutError;

/// Name of the watermark row in `scout_state`.
const WATERMARK: &str = "watermark";

const SCHEMA: [&str; 3] = [
    // event_id is NULL for keys not of the form `event_{id}`.
    "CREATE TABLE IF NOT EXISTS event_status (
        key TEXT PRIMARY KEY,
        event_id INTEGER,
        display_name TEXT NOT NULL,
        status TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_event_status_status ON event_status(status)",
    "CREATE TABLE IF NOT EXISTS scout_state (
        name TEXT PRIMARY KEY,
        value INTEGER NOT NULL,
        updated_at TEXT NOT NULL
    )",
];

/// SQLite-backed status store using `sqlx::SqlitePool`.
///
/// The pool holds a single connection, so every statement is serialised.
#[derive(Debug, Clone)]
pub struct SqliteStatusStore {
    pool: SqlitePool,
}

impl SqliteStatusStore {
    /// Opens (creating if missing) the database file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ScoutError::StoreRead`] if the file cannot be opened or
    /// the schema cannot be created.
    pub async fn open(path: &Path) -> Result<Self, ScoutError> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);
        Self::connect(options).await
    }

    /// Opens an ephemeral in-memory database.
    ///
    /// # Errors
    ///
    /// Returns [`ScoutError::StoreRead`] if the database cannot be created.
    pub async fn in_memory() -> Result<Self, ScoutError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        Self::connect(options).await
    }

    async fn connect(options: SqliteConnectOptions) -> Result<Self, ScoutError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    async fn run_migrations(&self) -> Result<(), ScoutError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }
}

/// Raw `(event_id, display_name, updated_at)` of a row, for tests.
#[cfg(test)]
pub(crate) type RawRow = (Option<i64>, String, chrono::DateTime<Utc>);

#[cfg(test)]
impl SqliteStatusStore {
    pub(crate) async fn raw_row(&self, key: &str) -> Option<RawRow> {
        sqlx::query_as::<_, RawRow>(
            "SELECT event_id, display_name, updated_at FROM event_status WHERE key = ?1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .ok()
        .flatten()
    }
}

fn parse_status(raw: &str) -> Result<EventStatus, ScoutError> {
    raw.parse::<EventStatus>()
        .map_err(|e| ScoutError::StoreRead(e.to_string()))
}

fn write_error(e: sqlx::Error) -> ScoutError {
    ScoutError::StoreWrite(e.to_string())
}

#[async_trait]
impl StatusStore for SqliteStatusStore {
    async fn get(&self, key: &str) -> Result<Option<EventStatus>, ScoutError> {
        let status =
            sqlx::query_scalar::<_, String>("SELECT status FROM event_status WHERE key = ?1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        status.as_deref().map(parse_status).transpose()
    }

    async fn put(
        &self,
        key: &str,
        display_name: &str,
        status: EventStatus,
    ) -> Result<(), ScoutError> {
        let event_id = EventId::from_store_key(key).and_then(|id| i64::try_from(id.get()).ok());

        sqlx::query(
            "INSERT INTO event_status (key, event_id, display_name, status, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5) \
             ON CONFLICT(key) DO UPDATE SET \
                display_name = excluded.display_name, \
                status = excluded.status, \
                updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(event_id)
        .bind(display_name)
        .bind(status.as_str())
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(write_error)?;

        Ok(())
    }

    async fn list_keys_with_status(&self, status: EventStatus) -> Result<Vec<String>, ScoutError> {
        let keys = sqlx::query_scalar::<_, String>(
            "SELECT key FROM event_status WHERE status = ?1 ORDER BY event_id, key",
        )
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(keys)
    }

    async fn count_by_status(&self) -> Result<Vec<(EventStatus, u64)>, ScoutError> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT status, COUNT(*) FROM event_status GROUP BY status ORDER BY status",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|(status, count)| {
                Ok((parse_status(&status)?, u64::try_from(count).unwrap_or(0)))
            })
            .collect()
    }

    async fn load_watermark(&self) -> Result<Option<u64>, ScoutError> {
        let value = sqlx::query_scalar::<_, i64>("SELECT value FROM scout_state WHERE name = ?1")
            .bind(WATERMARK)
            .fetch_optional(&self.pool)
            .await?;

        value
            .map(|raw| {
                u64::try_from(raw)
                    .map_err(|_| ScoutError::StoreRead(format!("negative watermark {raw}")))
            })
            .transpose()
    }

    async fn save_watermark(&self, watermark: u64) -> Result<(), ScoutError> {
        let value = i64::try_from(watermark)
            .map_err(|_| ScoutError::StoreWrite(format!("watermark {watermark} out of range")))?;

        sqlx::query(
            "INSERT INTO scout_state (name, value, updated_at) VALUES (?1, ?2, ?3) \
             ON CONFLICT(name) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        )
        .bind(WATERMARK)
        .bind(value)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(write_error)?;

        Ok(())
    }

    async fn close(&self) -> Result<(), ScoutError> {
        self.pool.close().await;
        tracing::debug!("status store closed");
        Ok(())
    }
}
