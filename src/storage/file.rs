use super::envelope::{RecordKind, SnapshotEnvelope};
use super::{PersistenceError, PersistenceGateway};
use crate::config::StorageConfig;
use crate::facility::occupancy::OccupancySnapshot;
use crate::facility::revenue::RevenueSnapshot;
use crate::observability::logging::{LogEvent, LogHandle};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const MODULE: &str = "parkade::storage::file";

/// Gateway keeping each ledger in its own JSON record on disk.
///
/// Writes go to a sibling temp file that is renamed over the record, so a
/// crash mid-write leaves the previous record intact.
#[derive(Debug, Clone)]
pub struct FileGateway {
    occupancy_path: PathBuf,
    revenue_path: PathBuf,
    log: LogHandle,
}

impl FileGateway {
    pub fn new(occupancy_path: PathBuf, revenue_path: PathBuf, log: LogHandle) -> Self {
        Self {
            occupancy_path,
            revenue_path,
            log,
        }
    }

    pub fn from_config(storage: &StorageConfig, log: LogHandle) -> Self {
        Self::new(storage.occupancy_path(), storage.revenue_path(), log)
    }

    pub fn occupancy_path(&self) -> &Path {
        &self.occupancy_path
    }

    pub fn revenue_path(&self) -> &Path {
        &self.revenue_path
    }

    /// Reads and verifies a record. `Ok(None)` when the file does not exist.
    pub fn read_record<T: DeserializeOwned>(
        path: &Path,
        kind: RecordKind,
    ) -> Result<Option<T>, PersistenceError> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(PersistenceError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let envelope = SnapshotEnvelope::from_bytes(&bytes)?;
        envelope.open(kind).map(Some)
    }

    /// Seals `snapshot` and atomically replaces the record at `path`.
    pub fn write_record<T: Serialize>(
        path: &Path,
        kind: RecordKind,
        snapshot: &T,
    ) -> Result<(), PersistenceError> {
        let bytes = SnapshotEnvelope::seal(kind, snapshot)?.to_bytes()?;
        let write_err = |source| PersistenceError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let staging = staging_path(path);
        fs::write(&staging, &bytes).map_err(write_err)?;
        fs::rename(&staging, path).map_err(|source| {
            let _ = fs::remove_file(&staging);
            write_err(source)
        })
    }

    fn load<T: DeserializeOwned>(&self, path: &Path, kind: RecordKind) -> Option<T> {
        match Self::read_record(path, kind) {
            Ok(Some(snapshot)) => {
                self.log.info(LogEvent::new(
                    MODULE,
                    "load",
                    format!("restored {kind} record from {}", path.display()),
                ));
                Some(snapshot)
            }
            Ok(None) => {
                self.log.info(LogEvent::new(
                    MODULE,
                    "load",
                    format!("no previous {kind} data found at {}", path.display()),
                ));
                None
            }
            Err(err) => {
                self.log.warn(LogEvent::new(
                    MODULE,
                    "load_failed",
                    format!(
                        "ignoring unreadable {kind} record {}: {err}",
                        path.display()
                    ),
                ));
                None
            }
        }
    }

    fn save<T: Serialize>(&self, path: &Path, kind: RecordKind, snapshot: &T) {
        if let Err(err) = Self::write_record(path, kind, snapshot) {
            self.log.error(LogEvent::new(
                MODULE,
                "save_failed",
                format!("failed to persist {kind} record {}: {err}", path.display()),
            ));
        }
    }
}

impl PersistenceGateway for FileGateway {
    fn load_occupancy(&mut self) -> Option<OccupancySnapshot> {
        self.load(&self.occupancy_path, RecordKind::Occupancy)
    }

    fn save_occupancy(&mut self, snapshot: &OccupancySnapshot) {
        self.save(&self.occupancy_path, RecordKind::Occupancy, snapshot)
    }

    fn load_revenue(&mut self) -> Option<RevenueSnapshot> {
        self.load(&self.revenue_path, RecordKind::Revenue)
    }

    fn save_revenue(&mut self, snapshot: &RevenueSnapshot) {
        self.save(&self.revenue_path, RecordKind::Revenue, snapshot)
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
