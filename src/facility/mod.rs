//! Slot allocation and ticketing core.
//!
//! Leaf structures (`slot_pool`, `occupancy`, `revenue`) hold the invariants;
//! `engine` orchestrates them and `shared` puts one engine behind a lock for
//! concurrent callers.

pub mod clock;
pub mod engine;
pub mod error;
pub mod model;
pub mod occupancy;
pub mod revenue;
pub mod shared;
pub mod slot_pool;

pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{
    format_hour, AllocationEngine, CategoryAvailability, EngineOptions, FacilityStatus,
    ParkReceipt, UnparkReceipt,
};
pub use error::{
    ParkingError, ERR_ALREADY_PARKED, ERR_INVALID_CATEGORY, ERR_INVALID_FORMAT,
    ERR_NO_SLOT_AVAILABLE, ERR_UNAUTHORIZED, ERR_VEHICLE_NOT_FOUND,
};
pub use model::{
    hour_bucket, CategorySelector, Money, PlateNumber, Ticket, Vehicle, VehicleCategory,
    MILLIS_PER_HOUR,
};
pub use occupancy::{OccupancyError, OccupancyLedger, OccupancySnapshot};
pub use revenue::{RevenueLedger, RevenueSnapshot};
pub use shared::Facility;
pub use slot_pool::{SlotPool, SlotReserveError};
