//! Notifier that only writes to the log.

use async_trait::async_trait;

use super::{Digest, Notifier};
use crate::error::ScoutError;

/// Writes digests through `tracing`. Used when no webhook is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, digest: &Digest) -> Result<(), ScoutError> {
        tracing::info!(
            subject = %digest.subject,
            events = digest.event_count,
            html = %digest.html,
            "digest"
        );
        Ok(())
    }
}
