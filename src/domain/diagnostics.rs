//! Per-identifier problems collected during a run.
//!
//! Problems are logged as they happen and also accumulated here so the
//! final report carries them as one diagnostic message.

use std::fmt;

use super::EventId;

/// Accumulated diagnostic lines of a run, in the order they occurred.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    lines: Vec<String>,
}

impl Diagnostics {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a problem tied to one identifier.
    pub fn record(&mut self, id: EventId, problem: impl fmt::Display) {
        tracing::warn!(event_id = %id, %problem, "probe problem");
        self.lines.push(format!("event {id}: {problem}"));
    }

    /// Records a problem not tied to an identifier.
    pub fn note(&mut self, problem: impl fmt::Display) {
        tracing::warn!(%problem, "run problem");
        self.lines.push(problem.to_string());
    }

    /// Appends all lines of `other`.
    pub fn extend(&mut self, other: Self) {
        self.lines.extend(other.lines);
    }

    /// Returns the collected lines.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Returns `true` if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
