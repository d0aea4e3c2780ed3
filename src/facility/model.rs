use super::error::ParkingError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Registration format: state code, district digits, optional series, number.
const PLATE_PATTERN: &str = r"^[A-Z]{2}[0-9]{2}[A-Z]{0,2}[0-9]{4}$";

static PLATE_MATCHER: Lazy<Regex> =
    Lazy::new(|| Regex::new(PLATE_PATTERN).expect("plate pattern compiles"));

/// Milliseconds in one billing hour.
pub const MILLIS_PER_HOUR: u64 = 3_600_000;

/// Vehicle classes served by the facility, each with its own slot pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VehicleCategory {
    TwoWheeler,
    ThreeWheeler,
    FourWheeler,
}

impl VehicleCategory {
    /// Every category in menu order.
    pub const ALL: [VehicleCategory; 3] = [
        VehicleCategory::TwoWheeler,
        VehicleCategory::ThreeWheeler,
        VehicleCategory::FourWheeler,
    ];

    /// Human-readable label used in receipts and reports.
    pub fn label(self) -> &'static str {
        match self {
            VehicleCategory::TwoWheeler => "Two-Wheeler",
            VehicleCategory::ThreeWheeler => "Three-Wheeler",
            VehicleCategory::FourWheeler => "Four-Wheeler",
        }
    }

    /// Menu option number (1-based) associated with the category.
    pub fn option(self) -> u8 {
        match self {
            VehicleCategory::TwoWheeler => 1,
            VehicleCategory::ThreeWheeler => 2,
            VehicleCategory::FourWheeler => 3,
        }
    }

    /// Dense index for per-category tables.
    pub(crate) fn index(self) -> usize {
        match self {
            VehicleCategory::TwoWheeler => 0,
            VehicleCategory::ThreeWheeler => 1,
            VehicleCategory::FourWheeler => 2,
        }
    }

    /// Resolves a menu option number.
    pub fn from_option(option: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|category| category.option() == option)
    }

    fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if let Ok(option) = trimmed.parse::<u8>() {
            return Self::from_option(option);
        }
        let folded: String = trimmed
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();
        match folded.as_str() {
            "twowheeler" | "2w" | "two" | "bike" => Some(VehicleCategory::TwoWheeler),
            "threewheeler" | "3w" | "three" | "auto" => Some(VehicleCategory::ThreeWheeler),
            "fourwheeler" | "4w" | "four" | "car" => Some(VehicleCategory::FourWheeler),
            _ => None,
        }
    }
}

impl fmt::Display for VehicleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for VehicleCategory {
    type Err = ParkingError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::parse(raw).ok_or_else(|| ParkingError::InvalidCategory {
            selector: raw.to_string(),
        })
    }
}

/// Anything a caller may use to pick a category at park time.
pub trait CategorySelector {
    fn resolve(&self) -> Result<VehicleCategory, ParkingError>;
}

impl CategorySelector for VehicleCategory {
    fn resolve(&self) -> Result<VehicleCategory, ParkingError> {
        Ok(*self)
    }
}

impl CategorySelector for u8 {
    fn resolve(&self) -> Result<VehicleCategory, ParkingError> {
        VehicleCategory::from_option(*self).ok_or_else(|| ParkingError::InvalidCategory {
            selector: self.to_string(),
        })
    }
}

impl CategorySelector for &str {
    fn resolve(&self) -> Result<VehicleCategory, ParkingError> {
        self.parse()
    }
}

impl CategorySelector for String {
    fn resolve(&self) -> Result<VehicleCategory, ParkingError> {
        self.parse()
    }
}

/// Validated registration number.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlateNumber(String);

impl PlateNumber {
    /// Validates `raw` exactly as given; no trimming or case folding.
    pub fn parse(raw: &str) -> Result<Self, ParkingError> {
        if PLATE_MATCHER.is_match(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(ParkingError::InvalidFormat {
                plate: raw.to_string(),
            })
        }
    }

    /// Front-end normalisation: trims and uppercases. Returns `None` for blank input.
    pub fn normalize(raw: &str) -> Option<String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_uppercase())
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlateNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PlateNumber {
    type Error = ParkingError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw)
    }
}

impl From<PlateNumber> for String {
    fn from(plate: PlateNumber) -> Self {
        plate.0
    }
}

/// Currency amount held in minor units (1/100 of the currency unit).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(u64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_minor(minor: u64) -> Self {
        Self(minor)
    }

    /// Whole currency units.
    pub const fn from_major(major: u64) -> Self {
        Self(major.saturating_mul(100))
    }

    /// Converts a decimal amount, rounding to the nearest minor unit.
    /// Returns `None` for negative, non-finite or out-of-range values.
    pub fn from_decimal(amount: f64) -> Option<Self> {
        if !amount.is_finite() || amount < 0.0 {
            return None;
        }
        let minor = (amount * 100.0).round();
        if minor > u64::MAX as f64 {
            return None;
        }
        Some(Self(minor as u64))
    }

    pub const fn minor(self) -> u64 {
        self.0
    }

    pub fn as_decimal(self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub fn saturating_add(self, other: Money) -> Money {
        Money(self.0.saturating_add(other.0))
    }

    pub fn saturating_mul(self, factor: u64) -> Money {
        Money(self.0.saturating_mul(factor))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

/// Vehicle admitted to the facility. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    pub plate: PlateNumber,
    pub category: VehicleCategory,
    /// Whole hours since the Unix epoch, floored.
    pub entry_hour: u64,
}

/// Active occupancy of a slot. Removed (not archived) when the vehicle leaves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub slot: u32,
    pub vehicle: Vehicle,
}

impl Ticket {
    pub fn new(slot: u32, vehicle: Vehicle) -> Self {
        Self { slot, vehicle }
    }

    pub fn plate(&self) -> &PlateNumber {
        &self.vehicle.plate
    }

    pub fn category(&self) -> VehicleCategory {
        self.vehicle.category
    }

    /// Entry instant in milliseconds since the Unix epoch (hour aligned).
    pub fn entry_ms(&self) -> u64 {
        self.vehicle.entry_hour.saturating_mul(MILLIS_PER_HOUR)
    }
}

/// Floors a millisecond timestamp to whole hours since the epoch.
pub fn hour_bucket(epoch_ms: u64) -> u64 {
    epoch_ms / MILLIS_PER_HOUR
}
