//! Forward scan over sequential identifiers.
//!
//! The engine walks forward from `max(stored watermark, configured floor)`,
//! probing every identifier that does not already carry a terminal status.
//! It stops once `max_not_found` consecutive probes answered `NotFound`,
//! then persists the watermark `last - streak - 1` so the next scan starts
//! just before the trailing not-found run.
//!
//! A failed status lookup skips the identifier without touching the
//! streak. If lookups keep failing the scan stops early and backs the
//! watermark off past the failed run instead.

use std::sync::Arc;

use tracing::Instrument;

use crate::domain::{Diagnostics, EventId, EventLinks, EventRecord, ProbeOutcome};
use crate::error::ScoutError;
use crate::fetcher::EventFetcher;
use crate::persistence::StatusStore;

/// Limits of a forward scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanSettings {
    /// Lowest identifier a scan may start from.
    pub floor: u64,
    /// Consecutive `NotFound` results that end a scan. Must be at least 1.
    pub max_not_found: u64,
}

/// Result of one forward scan.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    /// First identifier considered.
    pub start: EventId,
    /// Last identifier considered.
    pub end: EventId,
    /// Watermark persisted at the end of the scan.
    pub watermark: u64,
    /// Newly interesting events, in identifier order, links filled.
    pub events: Vec<EventRecord>,
    /// Per-identifier problems met during the scan.
    pub diagnostics: Diagnostics,
}

/// Counters of the scan state machine.
#[derive(Debug, Default)]
struct Cursor {
    /// Consecutive `NotFound` probes.
    not_found: u64,
    /// Consecutive failed status lookups.
    lookup_failures: u64,
}

/// Owns the scan watermark and drives fetcher and store forward.
#[derive(Debug, Clone)]
pub struct DiscoveryEngine {
    store: Arc<dyn StatusStore>,
    fetcher: Arc<dyn EventFetcher>,
    links: EventLinks,
    settings: ScanSettings,
    span: tracing::Span,
}

impl DiscoveryEngine {
    /// Creates an engine. All scan logging is recorded under `span`.
    #[must_use]
    pub fn new(
        store: Arc<dyn StatusStore>,
        fetcher: Arc<dyn EventFetcher>,
        links: EventLinks,
        settings: ScanSettings,
        span: tracing::Span,
    ) -> Self {
        Self {
            store,
            fetcher,
            links,
            settings,
            span,
        }
    }

    /// Runs one forward scan and persists the new watermark.
    ///
    /// Per-identifier failures are collected in
    /// [`ScanOutcome::diagnostics`] and never abort the scan.
    ///
    /// # Errors
    ///
    /// Returns [`ScoutError::WatermarkRead`] or
    /// [`ScoutError::WatermarkWrite`] when the watermark cannot be loaded
    /// or persisted.
    pub async fn scan(&self) -> Result<ScanOutcome, ScoutError> {
        self.scan_inner().instrument(self.span.clone()).await
    }

    async fn scan_inner(&self) -> Result<ScanOutcome, ScoutError> {
        let stored = self
            .store
            .load_watermark()
            .await
            .map_err(|e| ScoutError::WatermarkRead(e.to_string()))?;
        let start = EventId::new(stored.unwrap_or(0).max(self.settings.floor));
        let limit = self.settings.max_not_found.max(1);

        tracing::info!(
            %start,
            stored = ?stored,
            floor = self.settings.floor,
            max_not_found = limit,
            "forward scan started"
        );

        let mut state = Cursor::default();
        let mut events = Vec::new();
        let mut diagnostics = Diagnostics::new();
        let mut id = start;
        let mut backoff;

        loop {
            self.step(id, &mut state, &mut events, &mut diagnostics)
                .await;

            backoff = state.not_found;
            if state.not_found >= limit {
                break;
            }
            if state.lookup_failures >= limit {
                backoff = state.not_found.max(state.lookup_failures);
                diagnostics.note(format!(
                    "forward scan stopped at {id} after {} consecutive status lookup failures",
                    state.lookup_failures
                ));
                break;
            }
            if id.get() == u64::MAX {
                break;
            }
            id = id.next();
        }

        let watermark = id.get().saturating_sub(backoff).saturating_sub(1);
        self.store
            .save_watermark(watermark)
            .await
            .map_err(|e| ScoutError::WatermarkWrite {
                watermark,
                reason: e.to_string(),
            })?;

        tracing::info!(
            %start,
            end = %id,
            watermark,
            found = events.len(),
            problems = diagnostics.lines().len(),
            "forward scan finished"
        );

        Ok(ScanOutcome {
            start,
            end: id,
            watermark,
            events,
            diagnostics,
        })
    }

    /// Handles one identifier and updates the counters.
    async fn step(
        &self,
        id: EventId,
        state: &mut Cursor,
        events: &mut Vec<EventRecord>,
        diagnostics: &mut Diagnostics,
    ) {
        let key = id.store_key();

        match self.store.get(&key).await {
            Err(e) => {
                state.lookup_failures += 1;
                diagnostics.record(id, format!("status lookup failed, skipped: {e}"));
                return;
            }
            Ok(Some(status)) if status.is_terminal() => {
                state.lookup_failures = 0;
                tracing::trace!(event_id = %id, %status, "already classified, skipped");
                return;
            }
            Ok(_) => state.lookup_failures = 0,
        }

        let outcome = self.fetcher.fetch(id).await;
        let status = outcome.status();

        if let Err(e) = self.store.put(&key, outcome.display_name(), status).await {
            diagnostics.record(id, format!("could not store status {status}: {e}"));
        }

        match outcome {
            ProbeOutcome::NotFound => {
                state.not_found += 1;
                tracing::debug!(event_id = %id, streak = state.not_found, "not found");
            }
            ProbeOutcome::FetchError { reason } => {
                state.not_found = 0;
                diagnostics.record(id, format!("fetch failed: {reason}"));
            }
            ProbeOutcome::NotInterested { title, time } => {
                state.not_found = 0;
                tracing::debug!(event_id = %id, %title, %time, "not interested");
            }
            ProbeOutcome::Interesting(mut record) => {
                state.not_found = 0;
                self.links.fill(&mut record);
                tracing::info!(event_id = %id, name = %record.name, "new event");
                events.push(record);
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::domain::EventStatus;
    use crate::service::testing::{
        Faults, FlakyStore, ScriptedFetcher, links, memory_store, seed,
    };

    fn engine<S: StatusStore + 'static>(
        store: Arc<S>,
        fetcher: Arc<ScriptedFetcher>,
        floor: u64,
        max_not_found: u64,
    ) -> DiscoveryEngine {
        DiscoveryEngine::new(
            store,
            fetcher,
            links(),
            ScanSettings {
                floor,
                max_not_found,
            },
            tracing::Span::none(),
        )
    }

    fn ids(raw: impl IntoIterator<Item = u64>) -> Vec<EventId> {
        raw.into_iter().map(EventId::new).collect()
    }

    #[tokio::test]
    async fn stops_after_threshold_and_backs_off_watermark() {
        let store = Arc::new(memory_store().await);
        let fetcher = Arc::new(
            ScriptedFetcher::new()
                .interesting(100, "Opening Night")
                .not_interested(101),
        );

        let Ok(outcome) = engine(Arc::clone(&store), Arc::clone(&fetcher), 100, 5).scan().await else {
            panic!("scan failed");
        };

        // 102..=106 are the five NotFound probes.
        assert_eq!(fetcher.calls(), ids(100..=106));
        assert_eq!(outcome.start, EventId::new(100));
        assert_eq!(outcome.end, EventId::new(106));
        assert_eq!(outcome.watermark, 106 - 5 - 1);
        assert!(matches!(store.load_watermark().await, Ok(Some(100))));

        assert_eq!(outcome.events.len(), 1);
        let Some(event) = outcome.events.first() else {
            panic!("expected an event");
        };
        assert_eq!(event.name, "Opening Night");
        assert_eq!(event.canonical_url, "https://www.example.com/event/100");
        assert_eq!(event.mobile_url, "https://m.example.com/?id=100");

        assert!(matches!(
            store.get("event_100").await,
            Ok(Some(EventStatus::Pushed))
        ));
        assert!(matches!(
            store.get("event_101").await,
            Ok(Some(EventStatus::NotInterested))
        ));
        assert!(matches!(
            store.get("event_104").await,
            Ok(Some(EventStatus::NotFound))
        ));
    }

    #[tokio::test]
    async fn terminal_statuses_are_never_fetched() {
        let store = Arc::new(memory_store().await);
        seed(
            store.as_ref(),
            &[(10, EventStatus::Pushed), (11, EventStatus::NotInterested)],
        )
        .await;
        let fetcher = Arc::new(ScriptedFetcher::new().not_interested(12));

        let Ok(outcome) = engine(store, Arc::clone(&fetcher), 10, 2).scan().await else {
            panic!("scan failed");
        };

        assert_eq!(fetcher.calls(), ids(12..=14));
        assert!(outcome.events.is_empty());
    }

    #[tokio::test]
    async fn skipped_terminal_ids_do_not_reset_streak() {
        let store = Arc::new(memory_store().await);
        seed(store.as_ref(), &[(21, EventStatus::Pushed)]).await;
        let fetcher = Arc::new(ScriptedFetcher::new());

        let Ok(outcome) = engine(store, Arc::clone(&fetcher), 20, 3).scan().await else {
            panic!("scan failed");
        };

        // 20 NF, 21 skipped, 22 NF, 23 NF -> three in a row.
        assert_eq!(fetcher.calls(), ids([20, 22, 23]));
        assert_eq!(outcome.end, EventId::new(23));
        assert_eq!(outcome.watermark, 23 - 3 - 1);
    }

    #[tokio::test]
    async fn fetch_error_resets_streak_and_is_reported() {
        let store = Arc::new(memory_store().await);
        let fetcher = Arc::new(ScriptedFetcher::new().error(31));

        let Ok(outcome) = engine(Arc::clone(&store), Arc::clone(&fetcher), 30, 2).scan().await else {
            panic!("scan failed");
        };

        // 30 NF, 31 error resets, 32 NF, 33 NF.
        assert_eq!(fetcher.calls(), ids(30..=33));
        assert!(outcome.events.is_empty());
        assert_eq!(outcome.diagnostics.lines().len(), 1);
        assert!(outcome.diagnostics.to_string().contains("event 31"));
        assert!(matches!(
            store.get("event_31").await,
            Ok(Some(EventStatus::FetchError))
        ));
    }

    #[tokio::test]
    async fn empty_scan_still_persists_watermark() {
        let store = Arc::new(memory_store().await);
        let fetcher = Arc::new(ScriptedFetcher::new());

        let Ok(outcome) = engine(Arc::clone(&store), fetcher, 50, 1).scan().await else {
            panic!("scan failed");
        };

        assert!(outcome.events.is_empty());
        assert!(outcome.diagnostics.is_empty());
        assert_eq!(outcome.end, EventId::new(50));
        assert_eq!(outcome.watermark, 48);
        assert!(matches!(store.load_watermark().await, Ok(Some(48))));
    }

    #[tokio::test]
    async fn stored_watermark_above_floor_wins() {
        let store = Arc::new(memory_store().await);
        let _ = store.save_watermark(500).await;
        let fetcher = Arc::new(ScriptedFetcher::new());

        let Ok(outcome) = engine(store, Arc::clone(&fetcher), 100, 1).scan().await else {
            panic!("scan failed");
        };
        assert_eq!(outcome.start, EventId::new(500));
        assert_eq!(fetcher.calls(), ids([500]));
    }

    #[tokio::test]
    async fn floor_above_stored_watermark_wins() {
        let store = Arc::new(memory_store().await);
        let _ = store.save_watermark(5).await;
        let fetcher = Arc::new(ScriptedFetcher::new());

        let Ok(outcome) = engine(store, Arc::clone(&fetcher), 900, 1).scan().await else {
            panic!("scan failed");
        };
        assert_eq!(outcome.start, EventId::new(900));
    }

    #[tokio::test]
    async fn second_scan_resumes_without_refetching_resolved_ids() {
        let store = Arc::new(memory_store().await);
        let first = Arc::new(
            ScriptedFetcher::new()
                .interesting(1, "A")
                .not_interested(2)
                .interesting(3, "B"),
        );
        let Ok(outcome) = engine(Arc::clone(&store), first, 1, 2).scan().await else {
            panic!("first scan failed");
        };
        assert_eq!(outcome.events.len(), 2);
        assert_eq!(outcome.watermark, 2);

        let second = Arc::new(ScriptedFetcher::new().interesting(5, "C"));
        let Ok(outcome) = engine(store, Arc::clone(&second), 1, 2).scan().await else {
            panic!("second scan failed");
        };
        // 2 and 3 are terminal; 4 and 5 are probed again.
        assert_eq!(second.calls(), ids(4..=7));
        assert_eq!(outcome.events.len(), 1);
    }

    #[tokio::test]
    async fn lookup_failure_skips_identifier() {
        let inner = memory_store().await;
        let faults = Faults {
            get_keys: HashSet::from(["event_61".to_string()]),
            ..Faults::default()
        };
        let store = Arc::new(FlakyStore::new(inner, faults));
        let fetcher = Arc::new(ScriptedFetcher::new().interesting(62, "After Gap"));

        let Ok(outcome) = engine(store, Arc::clone(&fetcher), 60, 2).scan().await else {
            panic!("scan failed");
        };

        assert!(!fetcher.calls().contains(&EventId::new(61)));
        assert_eq!(outcome.events.len(), 1);
        assert!(outcome.diagnostics.to_string().contains("event 61"));
    }

    #[tokio::test]
    async fn lookup_failure_inside_streak_keeps_watermark_formula() {
        let inner = memory_store().await;
        let faults = Faults {
            get_keys: HashSet::from(["event_11".to_string()]),
            ..Faults::default()
        };
        let store = Arc::new(FlakyStore::new(inner, faults));
        let fetcher = Arc::new(ScriptedFetcher::new().not_interested(9));

        let Ok(outcome) = engine(Arc::clone(&store), Arc::clone(&fetcher), 9, 3).scan().await
        else {
            panic!("scan failed");
        };

        // 10 NF, 11 skipped on lookup failure, 12 NF, 13 NF.
        assert_eq!(fetcher.calls(), ids([9, 10, 12, 13]));
        assert_eq!(outcome.end, EventId::new(13));
        assert_eq!(outcome.watermark, 13 - 3 - 1);
        assert!(outcome.watermark >= 9);
        assert!(matches!(store.load_watermark().await, Ok(Some(9))));
    }

    #[tokio::test]
    async fn persistent_lookup_failures_end_the_scan() {
        let inner = memory_store().await;
        let faults = Faults {
            get_all: true,
            ..Faults::default()
        };
        let store = Arc::new(FlakyStore::new(inner, faults));
        let fetcher = Arc::new(ScriptedFetcher::new());

        let Ok(outcome) = engine(store, Arc::clone(&fetcher), 70, 3).scan().await else {
            panic!("scan failed");
        };

        assert!(fetcher.calls().is_empty());
        assert_eq!(outcome.end, EventId::new(72));
        assert_eq!(outcome.watermark, 72 - 3 - 1);
    }

    #[tokio::test]
    async fn status_write_failure_is_not_fatal() {
        let inner = memory_store().await;
        let faults = Faults {
            put_keys: HashSet::from(["event_80".to_string()]),
            ..Faults::default()
        };
        let store = Arc::new(FlakyStore::new(inner, faults));
        let fetcher = Arc::new(ScriptedFetcher::new().interesting(80, "Unsaved"));

        let Ok(outcome) = engine(store, fetcher, 80, 1).scan().await else {
            panic!("scan failed");
        };

        assert_eq!(outcome.events.len(), 1);
        assert!(outcome.diagnostics.to_string().contains("could not store"));
    }

    #[tokio::test]
    async fn watermark_write_failure_aborts() {
        let inner = memory_store().await;
        let faults = Faults {
            save_watermark: true,
            ..Faults::default()
        };
        let store = Arc::new(FlakyStore::new(inner, faults));
        let fetcher = Arc::new(ScriptedFetcher::new());

        let result = engine(store, fetcher, 90, 1).scan().await;
        let Err(err) = result else {
            panic!("expected watermark failure");
        };
        assert!(matches!(err, ScoutError::WatermarkWrite { watermark: 88, .. }));
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn watermark_read_failure_aborts_before_fetching() {
        let inner = memory_store().await;
        let faults = Faults {
            load_watermark: true,
            ..Faults::default()
        };
        let store = Arc::new(FlakyStore::new(inner, faults));
        let fetcher = Arc::new(ScriptedFetcher::new());

        let result = engine(store, Arc::clone(&fetcher), 1, 1).scan().await;
        assert!(matches!(result, Err(ScoutError::WatermarkRead(_))));
        assert!(fetcher.calls().is_empty());
    }
}
