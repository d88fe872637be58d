//! Notifier posting digests to an HTTP endpoint as JSON.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};

use super::{Digest, Notifier};
use crate::error::ScoutError;

/// POSTs each digest as `{subject, html, event_count, run_id}`.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: Client,
    url: Url,
}

impl WebhookNotifier {
    /// Builds a notifier for `url`.
    ///
    /// # Errors
    ///
    /// Returns [`ScoutError::Config`] if `url` is not a valid URL or the
    /// HTTP client cannot be built.
    pub fn new(url: &str, timeout: Duration) -> Result<Self, ScoutError> {
        let url = Url::parse(url).map_err(|e| ScoutError::Config(format!("webhook url: {e}")))?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ScoutError::Config(format!("webhook client: {e}")))?;

        Ok(Self { client, url })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send(&self, digest: &Digest) -> Result<(), ScoutError> {
        self.client
            .post(self.url.clone())
            .json(digest)
            .send()
            .await
            .map_err(|e| ScoutError::Notify(format!("webhook request failed: {e}")))?
            .error_for_status()
            .map_err(|e| ScoutError::Notify(format!("webhook rejected digest: {e}")))?;

        tracing::info!(subject = %digest.subject, events = digest.event_count, "digest delivered");
        Ok(())
    }
}
