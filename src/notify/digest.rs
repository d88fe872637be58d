//! HTML digest of a run.

use std::fmt::Write as _;

use serde::Serialize;
use uuid::Uuid;

use crate::domain::EventRecord;
use crate::error::ScoutError;
use crate::service::RunReport;

const REMINDER: &str =
    "Before buying, check the other ticketing platforms and make sure you are free that day.";

/// A message ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Digest {
    /// Subject line.
    pub subject: String,
    /// HTML body.
    pub html: String,
    /// Number of events listed in the body.
    pub event_count: usize,
    /// Run the digest belongs to, if the run got far enough to have one.
    pub run_id: Option<Uuid>,
}

impl Digest {
    /// Builds the digest of a successful run. `None` when the run found
    /// no new event: nothing is sent then.
    #[must_use]
    pub fn for_run(report: &RunReport) -> Option<Self> {
        if report.events.is_empty() {
            return None;
        }

        let mut html = format!("<p>{}</p>", escape(REMINDER));
        for event in &report.events {
            push_event(&mut html, event);
        }
        let _ = write!(html, "<p>{}</p>", escape(&report.message()).replace('\n', "<br>"));

        Some(Self {
            subject: format!("{} new events listed", report.events.len()),
            html,
            event_count: report.events.len(),
            run_id: Some(report.run_id),
        })
    }

    /// Builds the notice sent when a run aborts.
    #[must_use]
    pub fn for_failure(error: &ScoutError) -> Self {
        Self {
            subject: "event scout run failed".into(),
            html: format!(
                "<p>The run aborted with error {}:</p><p>{}</p>",
                error.error_code(),
                escape(&error.to_string())
            ),
            event_count: 0,
            run_id: None,
        }
    }
}

fn push_event(html: &mut String, event: &EventRecord) {
    let _ = write!(
        html,
        "<p><a href=\"{}\"><strong>{}</strong></a>, <strong>time</strong>: {}, \
         <strong>artist</strong>: {}, <strong>venue</strong>: {}, \
         <strong>price</strong>: {}, <a href=\"{}\">open in app</a></p>",
        escape(&event.canonical_url),
        escape(&event.name),
        escape(&event.time),
        escape(&event.artist),
        escape(&event.venue),
        escape(&event.price),
        escape(&event.mobile_url),
    );
}

/// Escapes text for HTML element content and double-quoted attributes.
fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
