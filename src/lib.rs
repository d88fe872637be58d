//! # event-scout
//!
//! Discovers newly listed events on a ticketing site by probing its
//! sequential event identifiers, and sends a digest of the ones that match
//! the user's interests.
//!
//! Each run walks forward from a persisted watermark until a streak of
//! missing identifiers suggests the end of the published range, then
//! re-probes a bounded set of identifiers that were missing or failed
//! before. Every identifier's classification is stored so settled pages
//! are never fetched twice.
//!
//! ## Architecture
//!
//! ```text
//! main (config, logging)
//!     │
//!     ├── ScoutService (service/)
//!     │       ├── DiscoveryEngine    forward scan + watermark
//!     │       └── ReverificationPass bounded re-probe
//!     │
//!     ├── HttpEventFetcher (fetcher/)  reqwest + scraper
//!     ├── InterestCriteria (domain/)
//!     │
//!     ├── SqliteStatusStore (persistence/)
//!     │
//!     └── Notifier (notify/)  log or webhook digest
//! ```

pub mod config;
pub mod domain;
pub mod error;
pub mod fetcher;
pub mod logging;
pub mod notify;
pub mod persistence;
pub mod service;
