//! Test doubles for the service layer.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::{EventId, EventLinks, EventRecord, EventStatus, ProbeOutcome};
use crate::error::ScoutError;
use crate::fetcher::EventFetcher;
use crate::persistence::{SqliteStatusStore, StatusStore};

/// Fetcher answering from a fixed script. Unscripted ids are `NotFound`.
#[derive(Debug, Default)]
pub(crate) struct ScriptedFetcher {
    script: HashMap<EventId, ProbeOutcome>,
    calls: Mutex<Vec<EventId>>,
}

impl ScriptedFetcher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with(mut self, id: u64, outcome: ProbeOutcome) -> Self {
        self.script.insert(EventId::new(id), outcome);
        self
    }

    pub(crate) fn interesting(self, id: u64, name: &str) -> Self {
        self.with(id, ProbeOutcome::Interesting(record(id, name)))
    }

    pub(crate) fn not_interested(self, id: u64) -> Self {
        self.with(
            id,
            ProbeOutcome::NotInterested {
                title: format!("show {id}"),
                time: "2026.11.02 20:00".into(),
            },
        )
    }

    pub(crate) fn error(self, id: u64) -> Self {
        self.with(
            id,
            ProbeOutcome::FetchError {
                reason: "HTTP 503 after 5 attempts".into(),
            },
        )
    }

    /// Identifiers fetched so far, in call order.
    pub(crate) fn calls(&self) -> Vec<EventId> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl EventFetcher for ScriptedFetcher {
    async fn fetch(&self, id: EventId) -> ProbeOutcome {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(id);
        }
        self.script
            .get(&id)
            .cloned()
            .unwrap_or(ProbeOutcome::NotFound)
    }
}

pub(crate) fn record(id: u64, name: &str) -> EventRecord {
    EventRecord {
        id: EventId::new(id),
        name: name.into(),
        time: "2026.11.02 15:00".into(),
        artist: "Echo Band".into(),
        venue: "Shanghai MAO".into(),
        price: "180".into(),
        canonical_url: String::new(),
        mobile_url: String::new(),
    }
}

pub(crate) fn links() -> EventLinks {
    EventLinks::new("https://www.example.com", "https://m.example.com/?id={id}")
}

/// Store wrapper injecting failures on selected operations.
#[derive(Debug, Default)]
pub(crate) struct Faults {
    pub(crate) get_keys: HashSet<String>,
    pub(crate) get_all: bool,
    pub(crate) put_keys: HashSet<String>,
    pub(crate) list: bool,
    pub(crate) load_watermark: bool,
    pub(crate) save_watermark: bool,
}

#[derive(Debug)]
pub(crate) struct FlakyStore {
    inner: SqliteStatusStore,
    faults: Faults,
}

impl FlakyStore {
    pub(crate) fn new(inner: SqliteStatusStore, faults: Faults) -> Self {
        Self { inner, faults }
    }
}

#[async_trait]
impl StatusStore for FlakyStore {
    async fn get(&self, key: &str) -> Result<Option<EventStatus>, ScoutError> {
        if self.faults.get_all || self.faults.get_keys.contains(key) {
            return Err(ScoutError::StoreRead(format!("injected read failure on {key}")));
        }
        self.inner.get(key).await
    }

    async fn put(
        &self,
        key: &str,
        display_name: &str,
        status: EventStatus,
    ) -> Result<(), ScoutError> {
        if self.faults.put_keys.contains(key) {
            return Err(ScoutError::StoreWrite(format!("injected write failure on {key}")));
        }
        self.inner.put(key, display_name, status).await
    }

    async fn list_keys_with_status(&self, status: EventStatus) -> Result<Vec<String>, ScoutError> {
        if self.faults.list {
            return Err(ScoutError::StoreRead("injected list failure".into()));
        }
        self.inner.list_keys_with_status(status).await
    }

    async fn count_by_status(&self) -> Result<Vec<(EventStatus, u64)>, ScoutError> {
        self.inner.count_by_status().await
    }

    async fn load_watermark(&self) -> Result<Option<u64>, ScoutError> {
        if self.faults.load_watermark {
            return Err(ScoutError::StoreRead("injected watermark read failure".into()));
        }
        self.inner.load_watermark().await
    }

    async fn save_watermark(&self, watermark: u64) -> Result<(), ScoutError> {
        if self.faults.save_watermark {
            return Err(ScoutError::StoreWrite("injected watermark write failure".into()));
        }
        self.inner.save_watermark(watermark).await
    }

    async fn close(&self) -> Result<(), ScoutError> {
        self.inner.close().await
    }
}

#[allow(clippy::panic)]
pub(crate) async fn memory_store() -> SqliteStatusStore {
    let Ok(store) = SqliteStatusStore::in_memory().await else {
        panic!("in-memory store");
    };
    store
}

/// Seeds `store` with `(id, status)` pairs.
pub(crate) async fn seed(store: &dyn StatusStore, entries: &[(u64, EventStatus)]) {
    for (id, status) in entries {
        let _ = store
            .put(&EventId::new(*id).store_key(), "seeded", *status)
            .await;
    }
}
