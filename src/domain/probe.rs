//! Result of probing one identifier.

use super::{EventRecord, EventStatus};

/// Display name stored for identifiers whose name is not known.
pub const UNKNOWN_NAME: &str = "unknown";

/// What a single probe found.
///
/// Non-interesting outcomes carry only what the caller needs for the
/// stored display name and diagnostic logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The page passed the interest criteria. Links are not yet filled.
    Interesting(EventRecord),
    /// The page exists but fails the interest criteria.
    NotInterested {
        /// Page title, possibly empty.
        title: String,
        /// Start time text, possibly empty.
        time: String,
    },
    /// The site reported the identifier as nonexistent.
    NotFound,
    /// Transport, status or parse failure after all attempts.
    FetchError {
        /// Human-readable cause, including the last HTTP status if any.
        reason: String,
    },
}

impl ProbeOutcome {
    /// Status persisted for this outcome.
    #[must_use]
    pub const fn status(&self) -> EventStatus {
        match self {
            Self::Interesting(_) => EventStatus::Pushed,
            Self::NotInterested { .. } => EventStatus::NotInterested,
            Self::NotFound => EventStatus::NotFound,
            Self::FetchError { .. } => EventStatus::FetchError,
        }
    }

    /// Display name persisted alongside the status.
    #[must_use]
    pub fn display_name(&self) -> &str {
        match self {
            Self::Interesting(record) if !record.name.is_empty() => &record.name,
            Self::NotInterested { title, .. } if !title.is_empty() => title,
            _ => UNKNOWN_NAME,
        }
    }
}
