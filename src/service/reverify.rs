//! Bounded re-probe of provisional identifiers.
//!
//! Identifiers stored as `NotFound` or `FetchError` may have been
//! published or recovered since they were last probed. Each run re-fetches
//! the highest `cap` of them.

use std::sync::Arc;

use tracing::Instrument;

use crate::domain::{Diagnostics, EventId, EventLinks, EventRecord, EventStatus, ProbeOutcome};
use crate::fetcher::EventFetcher;
use crate::persistence::StatusStore;

/// Result of one re-verification pass.
#[derive(Debug, Clone, Default)]
pub struct ReverifyOutcome {
    /// Identifiers re-fetched, ascending.
    pub checked: Vec<EventId>,
    /// Events upgraded to `Pushed`, links filled.
    pub events: Vec<EventRecord>,
    /// Problems met during the pass.
    pub diagnostics: Diagnostics,
}

/// Re-fetches the most recent provisional identifiers.
#[derive(Debug, Clone)]
pub struct ReverificationPass {
    store: Arc<dyn StatusStore>,
    fetcher: Arc<dyn EventFetcher>,
    links: EventLinks,
    cap: usize,
    span: tracing::Span,
}

impl ReverificationPass {
    /// Creates a pass that re-fetches at most `cap` identifiers per run.
    #[must_use]
    pub fn new(
        store: Arc<dyn StatusStore>,
        fetcher: Arc<dyn EventFetcher>,
        links: EventLinks,
        cap: usize,
        span: tracing::Span,
    ) -> Self {
        Self {
            store,
            fetcher,
            links,
            cap,
            span,
        }
    }

    /// Runs the pass. Never fails: store and fetch problems are collected
    /// in [`ReverifyOutcome::diagnostics`].
    pub async fn run(&self) -> ReverifyOutcome {
        self.run_inner().instrument(self.span.clone()).await
    }

    async fn run_inner(&self) -> ReverifyOutcome {
        let mut outcome = ReverifyOutcome::default();
        let candidates = self.candidates(&mut outcome.diagnostics).await;

        tracing::info!(
            candidates = candidates.len(),
            cap = self.cap,
            "re-verification started"
        );

        let skip = candidates.len().saturating_sub(self.cap);
        for id in candidates.into_iter().skip(skip) {
            self.recheck(id, &mut outcome).await;
            outcome.checked.push(id);
        }

        tracing::info!(
            checked = outcome.checked.len(),
            upgraded = outcome.events.len(),
            "re-verification finished"
        );
        outcome
    }

    /// Provisional identifiers, ascending and deduplicated.
    async fn candidates(&self, diagnostics: &mut Diagnostics) -> Vec<EventId> {
        let mut ids = Vec::new();

        for status in EventStatus::PROVISIONAL {
            let keys = match self.store.list_keys_with_status(status).await {
                Ok(keys) => keys,
                Err(e) => {
                    diagnostics.note(format!("could not list {status} entries: {e}"));
                    continue;
                }
            };
            for key in keys {
                match EventId::from_store_key(&key) {
                    Some(id) => ids.push(id),
                    None => diagnostics.note(format!("unrecognised store key {key:?}, skipped")),
                }
            }
        }

        ids.sort_unstable();
        ids.dedup();
        ids
    }

    async fn recheck(&self, id: EventId, outcome: &mut ReverifyOutcome) {
        let probe = self.fetcher.fetch(id).await;
        let key = id.store_key();

        let status = match &probe {
            ProbeOutcome::NotFound => {
                tracing::debug!(event_id = %id, "still not found");
                return;
            }
            ProbeOutcome::FetchError { reason } => {
                outcome.diagnostics.record(id, format!("fetch failed: {reason}"));
                EventStatus::FetchError
            }
            ProbeOutcome::NotInterested { title, .. } => {
                tracing::debug!(event_id = %id, %title, "resolved as not interested");
                EventStatus::NotInterested
            }
            ProbeOutcome::Interesting(_) => EventStatus::Pushed,
        };

        if let Err(e) = self.store.put(&key, probe.display_name(), status).await {
            outcome
                .diagnostics
                .record(id, format!("could not store status {status}: {e}"));
        }

        if let ProbeOutcome::Interesting(mut record) = probe {
            self.links.fill(&mut record);
            tracing::info!(event_id = %id, name = %record.name, "late event found");
            outcome.events.push(record);
        }
    }
}
