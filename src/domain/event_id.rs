//! Type-safe event identifier.
//!
//! [`EventId`] is a newtype wrapper around the numeric identifier minted by
//! the listing site. Identifiers are assigned sequentially but gaps are
//! normal, so an identifier is only ever a handle to probe.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Prefix of every per-identifier key in the status store.
const STORE_KEY_PREFIX: &str = "event_";

/// Identifier of an event on the listing site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(u64);

impl EventId {
    /// Creates an `EventId` from its raw value.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Returns the next identifier, saturating at `u64::MAX`.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Key under which this identifier's status is stored.
    #[must_use]
    pub fn store_key(self) -> String {
        format!("{STORE_KEY_PREFIX}{}", self.0)
    }

    /// Re-extracts the identifier embedded in a store key.
    ///
    /// Returns `None` for keys that were not produced by
    /// [`EventId::store_key`].
    #[must_use]
    pub fn from_store_key(key: &str) -> Option<Self> {
        key.strip_prefix(STORE_KEY_PREFIX)?.parse().ok()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EventId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}
