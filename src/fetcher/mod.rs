//! Resource fetcher: probe one identifier and classify the result.
//!
//! [`EventFetcher`] is the seam between the discovery service and the
//! network. [`HttpEventFetcher`] is the production implementation.

pub mod extract;
pub mod http;

use std::fmt::Debug;

use async_trait::async_trait;

pub use extract::PageSelectors;
pub use http::{HttpEventFetcher, HttpFetcherConfig, RetryPolicy};

use crate::domain::{EventId, ProbeOutcome};

/// Probes identifiers on the listing site.
///
/// Implementations handle their own retries and never fail: every problem
/// is expressed as a [`ProbeOutcome`]. An [`ProbeOutcome::Interesting`]
/// record is returned with empty links; the caller fills them.
#[async_trait]
pub trait EventFetcher: Send + Sync + Debug {
    /// Fetches and classifies the page of `id`.
    async fn fetch(&self, id: EventId) -> ProbeOutcome;
}
