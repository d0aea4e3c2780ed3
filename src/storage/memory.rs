use super::envelope::{RecordKind, SnapshotEnvelope};
use super::{PersistenceError, PersistenceGateway};
use crate::facility::occupancy::OccupancySnapshot;
use crate::facility::revenue::RevenueSnapshot;
use crate::observability::logging::{LogEvent, LogHandle};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

const MODULE: &str = "parkade::storage::memory";

#[derive(Debug, Default)]
struct MemoryStore {
    occupancy: Option<Vec<u8>>,
    revenue: Option<Vec<u8>>,
    fail_writes: bool,
    occupancy_saves: u64,
    revenue_saves: u64,
}

/// In-process gateway holding sealed records in memory.
///
/// Clones share the same store, so a test can keep one handle while the
/// engine owns another.
#[derive(Debug, Clone)]
pub struct MemoryGateway {
    store: Arc<Mutex<MemoryStore>>,
    log: LogHandle,
}

impl Default for MemoryGateway {
    fn default() -> Self {
        Self::new(LogHandle::disabled())
    }
}

impl MemoryGateway {
    pub fn new(log: LogHandle) -> Self {
        Self {
            store: Arc::new(Mutex::new(MemoryStore::default())),
            log,
        }
    }

    /// Makes subsequent saves fail (and be logged) until reset.
    pub fn fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    /// Number of successful occupancy saves.
    pub fn occupancy_saves(&self) -> u64 {
        self.lock().occupancy_saves
    }

    /// Number of successful revenue saves.
    pub fn revenue_saves(&self) -> u64 {
        self.lock().revenue_saves
    }

    /// Raw sealed occupancy record, if any.
    pub fn occupancy_bytes(&self) -> Option<Vec<u8>> {
        self.lock().occupancy.clone()
    }

    /// Raw sealed revenue record, if any.
    pub fn revenue_bytes(&self) -> Option<Vec<u8>> {
        self.lock().revenue.clone()
    }

    /// Replaces the stored occupancy record verbatim.
    pub fn put_occupancy_bytes(&self, bytes: Vec<u8>) {
        self.lock().occupancy = Some(bytes);
    }

    /// Replaces the stored revenue record verbatim.
    pub fn put_revenue_bytes(&self, bytes: Vec<u8>) {
        self.lock().revenue = Some(bytes);
    }

    fn lock(&self) -> MutexGuard<'_, MemoryStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn decode<T: DeserializeOwned>(&self, bytes: Option<Vec<u8>>, kind: RecordKind) -> Option<T> {
        let bytes = bytes?;
        let decoded =
            SnapshotEnvelope::from_bytes(&bytes).and_then(|envelope| envelope.open::<T>(kind));
        match decoded {
            Ok(snapshot) => Some(snapshot),
            Err(err) => {
                self.log.warn(LogEvent::new(
                    MODULE,
                    "load_failed",
                    format!("ignoring unreadable {kind} record: {err}"),
                ));
                None
            }
        }
    }

    fn encode<T: Serialize>(&self, kind: RecordKind, snapshot: &T) -> Option<Vec<u8>> {
        let encoded = if self.lock().fail_writes {
            Err(PersistenceError::Injected)
        } else {
            SnapshotEnvelope::seal(kind, snapshot).and_then(|envelope| envelope.to_bytes())
        };
        match encoded {
            Ok(bytes) => Some(bytes),
            Err(err) => {
                self.log.error(LogEvent::new(
                    MODULE,
                    "save_failed",
                    format!("failed to persist {kind} record: {err}"),
                ));
                None
            }
        }
    }
}

impl PersistenceGateway for MemoryGateway {
    fn load_occupancy(&mut self) -> Option<OccupancySnapshot> {
        let bytes = self.occupancy_bytes();
        self.decode(bytes, RecordKind::Occupancy)
    }

    fn save_occupancy(&mut self, snapshot: &OccupancySnapshot) {
        if let Some(bytes) = self.encode(RecordKind::Occupancy, snapshot) {
            let mut store = self.lock();
            store.occupancy = Some(bytes);
            store.occupancy_saves += 1;
        }
    }

    fn load_revenue(&mut self) -> Option<RevenueSnapshot> {
        let bytes = self.revenue_bytes();
        self.decode(bytes, RecordKind::Revenue)
    }

    fn save_revenue(&mut self, snapshot: &RevenueSnapshot) {
        if let Some(bytes) = self.encode(RecordKind::Revenue, snapshot) {
            let mut store = self.lock();
            store.revenue = Some(bytes);
            store.revenue_saves += 1;
        }
    }
}
