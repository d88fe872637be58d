//! One complete run: forward scan, then re-verification.

use std::sync::Arc;

use chrono::Utc;
use tracing::Instrument;
use uuid::Uuid;

use super::discovery::{DiscoveryEngine, ScanSettings};
use super::report::RunReport;
use super::reverify::ReverificationPass;
use crate::domain::EventLinks;
use crate::error::ScoutError;
use crate::fetcher::EventFetcher;
use crate::persistence::StatusStore;

/// Coordinates the discovery engine and the re-verification pass over a
/// shared store and fetcher.
///
/// Strictly sequential: one identifier is probed at a time and the pass
/// only starts once the scan has persisted its watermark.
#[derive(Debug, Clone)]
pub struct ScoutService {
    store: Arc<dyn StatusStore>,
    fetcher: Arc<dyn EventFetcher>,
    links: EventLinks,
    settings: ScanSettings,
    reverify_cap: usize,
}

impl ScoutService {
    /// Creates a new service.
    #[must_use]
    pub fn new(
        store: Arc<dyn StatusStore>,
        fetcher: Arc<dyn EventFetcher>,
        links: EventLinks,
        settings: ScanSettings,
        reverify_cap: usize,
    ) -> Self {
        Self {
            store,
            fetcher,
            links,
            settings,
            reverify_cap,
        }
    }

    /// Executes one run.
    ///
    /// # Errors
    ///
    /// Returns a fatal [`ScoutError`] when the watermark cannot be read or
    /// persisted. Nothing from the run is reported in that case.
    pub async fn run(&self) -> Result<RunReport, ScoutError> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let span = tracing::info_span!("scout_run", %run_id);

        let scan = DiscoveryEngine::new(
            Arc::clone(&self.store),
            Arc::clone(&self.fetcher),
            self.links.clone(),
            self.settings,
            span.clone(),
        )
        .scan()
        .await?;

        let pass = ReverificationPass::new(
            Arc::clone(&self.store),
            Arc::clone(&self.fetcher),
            self.links.clone(),
            self.reverify_cap,
            span.clone(),
        )
        .run()
        .await;

        let mut events = scan.events;
        events.extend(pass.events);
        let mut diagnostics = scan.diagnostics;
        diagnostics.extend(pass.diagnostics);

        let report = RunReport {
            run_id,
            started_at,
            scan_start: scan.start,
            scan_end: scan.end,
            watermark: scan.watermark,
            events,
            diagnostics,
        };

        span.in_scope(|| {
            tracing::info!(
                events = report.events.len(),
                rechecked = pass.checked.len(),
                problems = report.diagnostics.lines().len(),
                "run finished"
            );
        });
        self.log_totals().instrument(span).await;

        Ok(report)
    }

    async fn log_totals(&self) {
        match self.store.count_by_status().await {
            Ok(counts) => {
                for (status, count) in counts {
                    tracing::info!(%status, count, "stored identifiers");
                }
            }
            Err(e) => tracing::warn!(error = %e, "could not count stored identifiers"),
        }
    }
}
