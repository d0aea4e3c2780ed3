use super::model::VehicleCategory;
use thiserror::Error;

/// Status reason emitted when a plate does not match the registration format.
pub const ERR_INVALID_FORMAT: &str = "ERR_INVALID_FORMAT";
/// Status reason emitted when a category selector cannot be resolved.
pub const ERR_INVALID_CATEGORY: &str = "ERR_INVALID_CATEGORY";
/// Status reason emitted when the vehicle already holds a ticket.
pub const ERR_ALREADY_PARKED: &str = "ERR_ALREADY_PARKED";
/// Status reason emitted when a category pool is exhausted.
pub const ERR_NO_SLOT_AVAILABLE: &str = "ERR_NO_SLOT_AVAILABLE";
/// Status reason emitted when no ticket exists for the vehicle.
pub const ERR_VEHICLE_NOT_FOUND: &str = "ERR_VEHICLE_NOT_FOUND";
/// Status reason emitted when the admin credential does not match.
pub const ERR_UNAUTHORIZED: &str = "ERR_UNAUTHORIZED";

/// Expected business outcomes surfaced by the allocation engine.
///
/// None of these are fatal: every variant is raised before any pool or
/// ledger mutation takes place.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParkingError {
    #[error("invalid vehicle number format: {plate:?}")]
    InvalidFormat { plate: String },
    #[error("invalid vehicle type selected: {selector:?}")]
    InvalidCategory { selector: String },
    #[error("vehicle {plate} already parked")]
    AlreadyParked { plate: String },
    #[error("no available slots for {category}")]
    NoSlotAvailable { category: VehicleCategory },
    #[error("vehicle {plate} not found")]
    VehicleNotFound { plate: String },
    #[error("admin credential rejected")]
    Unauthorized,
}

impl ParkingError {
    /// Stable machine-readable reason for the outcome.
    pub fn status_reason(&self) -> &'static str {
        match self {
            ParkingError::InvalidFormat { .. } => ERR_INVALID_FORMAT,
            ParkingError::InvalidCategory { .. } => ERR_INVALID_CATEGORY,
            ParkingError::AlreadyParked { .. } => ERR_ALREADY_PARKED,
            ParkingError::NoSlotAvailable { .. } => ERR_NO_SLOT_AVAILABLE,
            ParkingError::VehicleNotFound { .. } => ERR_VEHICLE_NOT_FOUND,
            ParkingError::Unauthorized => ERR_UNAUTHORIZED,
        }
    }
}
