//! Persistence layer: durable identifier statuses and the scan watermark.
//!
//! Provides the [`StatusStore`] trait for the key → status map consumed by
//! the discovery service. The concrete implementation uses
//! `sqlx::SqlitePool` for an embedded, file-backed database.

pub mod sqlite;

use std::fmt::Debug;

use async_trait::async_trait;

pub use sqlite::SqliteStatusStore;

use crate::domain::EventStatus;
use crate::error::ScoutError;

/// Durable mapping from identifier key to classification status.
///
/// Implementations serialise their own I/O; callers issue one call at a
/// time but may share the store behind an `Arc`.
#[async_trait]
pub trait StatusStore: Send + Sync + Debug {
    /// Returns the status stored for `key`, or `None` if the key is absent.
    ///
    /// # Errors
    ///
    /// Returns [`ScoutError::StoreRead`] on I/O failure or when the stored
    /// status is not recognised.
    async fn get(&self, key: &str) -> Result<Option<EventStatus>, ScoutError>;

    /// Inserts or updates the name and status of `key` atomically.
    ///
    /// # Errors
    ///
    /// Returns [`ScoutError::StoreWrite`] on I/O failure.
    async fn put(
        &self,
        key: &str,
        display_name: &str,
        status: EventStatus,
    ) -> Result<(), ScoutError>;

    /// Returns every key currently carrying `status`.
    ///
    /// # Errors
    ///
    /// Returns [`ScoutError::StoreRead`] on I/O failure.
    async fn list_keys_with_status(&self, status: EventStatus) -> Result<Vec<String>, ScoutError>;

    /// Returns the number of keys per status.
    ///
    /// # Errors
    ///
    /// Returns [`ScoutError::StoreRead`] on I/O failure.
    async fn count_by_status(&self) -> Result<Vec<(EventStatus, u64)>, ScoutError>;

    /// Returns the persisted watermark, if any.
    ///
    /// # Errors
    ///
    /// Returns [`ScoutError::StoreRead`] on I/O failure.
    async fn load_watermark(&self) -> Result<Option<u64>, ScoutError>;

    /// Persists the watermark.
    ///
    /// # Errors
    ///
    /// Returns [`ScoutError::StoreWrite`] on I/O failure.
    async fn save_watermark(&self, watermark: u64) -> Result<(), ScoutError>;

    /// Flushes and releases the underlying resource.
    ///
    /// # Errors
    ///
    /// Returns [`ScoutError::StoreWrite`] if pending writes cannot be
    /// flushed.
    async fn close(&self) -> Result<(), ScoutError>;
}
