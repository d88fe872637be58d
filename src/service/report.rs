//! Summary of one completed run.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{Diagnostics, EventId, EventRecord};

/// Everything a run produced, ready to hand to a notifier.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Identifier of the run, also recorded on its tracing span.
    pub run_id: Uuid,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// First identifier of the forward scan.
    pub scan_start: EventId,
    /// Last identifier of the forward scan.
    pub scan_end: EventId,
    /// Watermark persisted by the forward scan.
    pub watermark: u64,
    /// New events: forward scan first, then re-verification upgrades.
    pub events: Vec<EventRecord>,
    /// Problems met during the run.
    #[serde(skip)]
    pub diagnostics: Diagnostics,
}

impl RunReport {
    /// Free-text diagnostic message: one line per problem, then the scan
    /// range and stored watermark.
    #[must_use]
    pub fn message(&self) -> String {
        let mut out = self.diagnostics.to_string();
        let _ = write!(
            out,
            "scan start {}, scan end {}, stored watermark {}",
            self.scan_start, self.scan_end, self.watermark
        );
        out
    }
}
