//! Digest delivery.
//!
//! A run's [`RunReport`](crate::service::RunReport) is turned into a
//! [`Digest`] and handed to a [`Notifier`]. Delivery is best effort: a
//! failure is logged by the caller and never retried.

pub mod digest;
pub mod log;
pub mod webhook;

use std::fmt::Debug;

use async_trait::async_trait;

pub use digest::Digest;
pub use log::LogNotifier;
pub use webhook::WebhookNotifier;

use crate::error::ScoutError;

/// Delivers digests to the user.
#[async_trait]
pub trait Notifier: Send + Sync + Debug {
    /// Sends one digest.
    ///
    /// # Errors
    ///
    /// Returns [`ScoutError::Notify`] if delivery fails.
    async fn send(&self, digest: &Digest) -> Result<(), ScoutError>;
}
