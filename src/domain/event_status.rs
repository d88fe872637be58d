//! Persisted classification of a probed identifier.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Classification stored per identifier.
///
/// `Pushed` and `NotInterested` are terminal: an identifier carrying either
/// is never probed again. `NotFound` and `FetchError` are provisional and
/// are the only statuses eligible for re-verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    /// Judged interesting and already surfaced to the user.
    Pushed,
    /// The record exists but fails the interest criteria.
    NotInterested,
    /// The site answered with a definitive "does not exist".
    NotFound,
    /// The probe failed for a reason other than nonexistence.
    FetchError,
}

impl EventStatus {
    /// Every status, in declaration order.
    pub const ALL: [Self; 4] = [
        Self::Pushed,
        Self::NotInterested,
        Self::NotFound,
        Self::FetchError,
    ];

    /// Statuses eligible for re-verification.
    pub const PROVISIONAL: [Self; 2] = [Self::NotFound, Self::FetchError];

    /// Returns the string stored in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pushed => "pushed",
            Self::NotInterested => "not_interested",
            Self::NotFound => "not_found",
            Self::FetchError => "fetch_error",
        }
    }

    /// Returns `true` if the identifier must never be probed again.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Pushed | Self::NotInterested)
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a stored status string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown event status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for EventStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}
