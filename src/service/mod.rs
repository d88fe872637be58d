//! Service layer: scan orchestration.
//!
//! [`ScoutService`] runs one [`DiscoveryEngine`] forward scan followed by
//! one [`ReverificationPass`] and folds both into a [`RunReport`].

pub mod discovery;
pub mod report;
pub mod reverify;
pub mod scout_service;

#[cfg(test)]
pub(crate) mod testing;

pub use discovery::{DiscoveryEngine, ScanOutcome, ScanSettings};
pub use report::RunReport;
pub use reverify::{ReverificationPass, ReverifyOutcome};
pub use scout_service::ScoutService;
