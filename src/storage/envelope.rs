use super::PersistenceError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Format tag written into every record.
pub const ENVELOPE_FORMAT: &str = "parkade-snapshot";
/// Current record layout version.
pub const ENVELOPE_VERSION: u32 = 1;

/// Which ledger a record holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Occupancy,
    Revenue,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Occupancy => f.write_str("occupancy"),
            RecordKind::Revenue => f.write_str("revenue"),
        }
    }
}

/// Self-describing wrapper around a serialized snapshot.
///
/// `checksum` is the hex SHA-256 of `payload`, so truncated or hand-edited
/// records are detected on load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotEnvelope {
    pub format: String,
    pub version: u32,
    pub kind: RecordKind,
    pub checksum: String,
    pub payload: String,
}

impl SnapshotEnvelope {
    /// Serializes `snapshot` and seals it with its checksum.
    pub fn seal<T: Serialize>(kind: RecordKind, snapshot: &T) -> Result<Self, PersistenceError> {
        let payload = serde_json::to_string(snapshot)?;
        Ok(Self {
            format: ENVELOPE_FORMAT.to_string(),
            version: ENVELOPE_VERSION,
            kind,
            checksum: compute_checksum(payload.as_bytes()),
            payload,
        })
    }

    /// Verifies format, kind and checksum, then decodes the payload.
    pub fn open<T: DeserializeOwned>(&self, expected: RecordKind) -> Result<T, PersistenceError> {
        if self.format != ENVELOPE_FORMAT || self.version != ENVELOPE_VERSION {
            return Err(PersistenceError::Format {
                format: self.format.clone(),
                version: self.version,
            });
        }
        if self.kind != expected {
            return Err(PersistenceError::KindMismatch {
                expected,
                found: self.kind,
            });
        }
        let computed = compute_checksum(self.payload.as_bytes());
        if computed != self.checksum {
            return Err(PersistenceError::Checksum {
                expected: self.checksum.clone(),
                computed,
            });
        }
        Ok(serde_json::from_str(&self.payload)?)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, PersistenceError> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PersistenceError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

fn compute_checksum(payload: &[u8]) -> String {
    let digest = Sha256::digest(payload);
    to_hex(&digest)
}

fn to_hex(bytes: &[u8]) -> String {
    let mut encoded = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        encoded.push_str(&format!("{:02x}", byte));
    }
    encoded
}
