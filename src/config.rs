pub mod security;

use crate::facility::model::{Money, VehicleCategory};
use crate::observability::logging::LogLevel;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

type ConfigMap = Map<String, Value>;

/// Default occupancy record file name.
pub const DEFAULT_OCCUPANCY_FILE: &str = "parking_data.json";
/// Default revenue record file name.
pub const DEFAULT_REVENUE_FILE: &str = "revenue_data.json";
/// Default shared admin secret.
pub const DEFAULT_ADMIN_SECRET: &str = "admin123";
/// Default hourly rate in currency units.
pub const DEFAULT_HOURLY_RATE: f64 = 20.0;

/// Slot count per category. Fixed for the lifetime of a facility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryCapacities {
    pub two_wheeler: u32,
    pub three_wheeler: u32,
    pub four_wheeler: u32,
}

impl CategoryCapacities {
    pub fn new(two_wheeler: u32, three_wheeler: u32, four_wheeler: u32) -> Self {
        Self {
            two_wheeler,
            three_wheeler,
            four_wheeler,
        }
    }

    pub fn get(&self, category: VehicleCategory) -> u32 {
        match category {
            VehicleCategory::TwoWheeler => self.two_wheeler,
            VehicleCategory::ThreeWheeler => self.three_wheeler,
            VehicleCategory::FourWheeler => self.four_wheeler,
        }
    }

    pub fn total(&self) -> u64 {
        VehicleCategory::ALL
            .iter()
            .map(|category| u64::from(self.get(*category)))
            .sum()
    }
}

impl Default for CategoryCapacities {
    fn default() -> Self {
        Self::new(5, 3, 4)
    }
}

/// Where the occupancy and revenue records live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub occupancy_file: String,
    pub revenue_file: String,
}

impl StorageConfig {
    pub fn occupancy_path(&self) -> PathBuf {
        self.data_dir.join(&self.occupancy_file)
    }

    pub fn revenue_path(&self) -> PathBuf {
        self.data_dir.join(&self.revenue_file)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            occupancy_file: DEFAULT_OCCUPANCY_FILE.to_string(),
            revenue_file: DEFAULT_REVENUE_FILE.to_string(),
        }
    }
}

/// Log level and destination. `path: None` logs to stderr.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: LogLevel,
    pub path: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            path: None,
        }
    }
}

/// Complete facility configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FacilityConfig {
    pub capacities: CategoryCapacities,
    /// Charge per started hour, in currency units (two decimal places).
    pub hourly_rate: f64,
    pub admin_secret: String,
    pub storage: StorageConfig,
    pub log: LogConfig,
}

impl Default for FacilityConfig {
    fn default() -> Self {
        Self {
            capacities: CategoryCapacities::default(),
            hourly_rate: DEFAULT_HOURLY_RATE,
            admin_secret: DEFAULT_ADMIN_SECRET.to_string(),
            storage: StorageConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl FacilityConfig {
    /// Parses and validates a JSON configuration blob. Missing keys take defaults.
    pub fn from_json(value: Value) -> Result<Self, ConfigError> {
        if !value.is_object() {
            return Err(ConfigError::Invalid(
                "configuration must be a JSON object".into(),
            ));
        }
        let config: FacilityConfig = serde_json::from_value(value).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads `path`, or returns validated defaults when `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let value: Value = serde_json::from_str(&raw).map_err(ConfigError::Parse)?;
        Self::from_json(value)
    }

    /// Layers `patch` over this configuration and revalidates.
    ///
    /// Nested objects merge key by key. Returns the dotted paths that changed.
    pub fn apply_overrides(&mut self, patch: Value) -> Result<Vec<String>, ConfigError> {
        let patch_map = patch
            .as_object()
            .cloned()
            .ok_or_else(|| ConfigError::Invalid("override must be a JSON object".into()))?;
        let mut current = match serde_json::to_value(&*self).map_err(ConfigError::Parse)? {
            Value::Object(map) => map,
            _ => return Err(ConfigError::Invalid("configuration is not an object".into())),
        };
        let mut changed = BTreeSet::new();
        merge_map(&mut current, &patch_map, "", &mut changed);
        if changed.is_empty() {
            return Ok(Vec::new());
        }
        *self = Self::from_json(Value::Object(current))?;
        Ok(changed.into_iter().collect())
    }

    /// Checks invariants serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.hourly_rate_money()?;
        if self.admin_secret.is_empty() {
            return Err(ConfigError::Invalid("admin_secret must not be empty".into()));
        }
        if self.storage.occupancy_file.trim().is_empty()
            || self.storage.revenue_file.trim().is_empty()
        {
            return Err(ConfigError::Invalid(
                "storage file names must not be empty".into(),
            ));
        }
        if self.storage.occupancy_path() == self.storage.revenue_path() {
            return Err(ConfigError::Invalid(
                "occupancy and revenue records must use different files".into(),
            ));
        }
        Ok(())
    }

    /// Hourly rate converted to minor currency units.
    pub fn hourly_rate_money(&self) -> Result<Money, ConfigError> {
        Money::from_decimal(self.hourly_rate).ok_or(ConfigError::InvalidRate(self.hourly_rate))
    }
}

fn merge_map(base: &mut ConfigMap, patch: &ConfigMap, prefix: &str, changed: &mut BTreeSet<String>) {
    for (key, value) in patch {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        let entry = base.entry(key.clone()).or_insert(Value::Null);
        match (entry, value) {
            (Value::Object(existing), Value::Object(nested)) => {
                merge_map(existing, nested, &path, changed);
            }
            (entry, value) => {
                if entry != value {
                    *entry = value.clone();
                    changed.insert(path);
                }
            }
        }
    }
}

/// Errors surfaced while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("hourly rate {0} must be a finite, non-negative amount")]
    InvalidRate(f64),
    #[error("invalid config: {0}")]
    Invalid(String),
}
