//! Durable snapshots of the occupancy and revenue ledgers.
//!
//! The engine never depends on an encoding: it hands plain snapshots to a
//! [`PersistenceGateway`] and receives them back at startup. Gateways absorb
//! their own failures; a missing or unreadable record means "no prior state"
//! and a failed write is logged, never surfaced.

pub mod envelope;
pub mod file;
pub mod memory;

use crate::facility::occupancy::OccupancySnapshot;
use crate::facility::revenue::RevenueSnapshot;
use std::path::PathBuf;
use thiserror::Error;

pub use envelope::{RecordKind, SnapshotEnvelope, ENVELOPE_FORMAT, ENVELOPE_VERSION};
pub use file::FileGateway;
pub use memory::MemoryGateway;

/// Load/save contract consumed by the allocation engine.
pub trait PersistenceGateway: Send + Sync {
    fn load_occupancy(&mut self) -> Option<OccupancySnapshot>;
    fn save_occupancy(&mut self, snapshot: &OccupancySnapshot);
    fn load_revenue(&mut self) -> Option<RevenueSnapshot>;
    fn save_revenue(&mut self, snapshot: &RevenueSnapshot);
}

impl<G: PersistenceGateway + ?Sized> PersistenceGateway for Box<G> {
    fn load_occupancy(&mut self) -> Option<OccupancySnapshot> {
        (**self).load_occupancy()
    }

    fn save_occupancy(&mut self, snapshot: &OccupancySnapshot) {
        (**self).save_occupancy(snapshot)
    }

    fn load_revenue(&mut self) -> Option<RevenueSnapshot> {
        (**self).load_revenue()
    }

    fn save_revenue(&mut self, snapshot: &RevenueSnapshot) {
        (**self).save_revenue(snapshot)
    }
}

/// Failures inside a gateway. Logged at the gateway boundary, never returned
/// to engine callers.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to encode or decode snapshot: {0}")]
    Codec(#[from] serde_json::Error),
    #[error("unsupported record format {format:?} version {version}")]
    Format { format: String, version: u32 },
    #[error("record holds {found} data, expected {expected}")]
    KindMismatch {
        expected: RecordKind,
        found: RecordKind,
    },
    #[error("checksum mismatch: expected {expected}, computed {computed}")]
    Checksum { expected: String, computed: String },
    #[error("simulated storage failure")]
    Injected,
}
