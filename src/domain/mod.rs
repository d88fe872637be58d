//! Domain layer: identifiers, classifications, and interest rules.
//!
//! This module contains the model shared by the store, the fetcher and
//! the discovery service: the event identifier and its store key, the
//! persisted status enum, the transient event record, the outcome of a
//! single probe, and the interest criteria that classify a page.

pub mod criteria;
pub mod diagnostics;
pub mod event_id;
pub mod event_record;
pub mod event_status;
pub mod probe;

pub use criteria::{InterestCriteria, PageFields, Verdict};
pub use diagnostics::Diagnostics;
pub use event_id::EventId;
pub use event_record::{EventLinks, EventRecord};
pub use event_status::EventStatus;
pub use probe::ProbeOutcome;
