//! Parking facility engine: per-category slot pools, active tickets,
//! hourly billing and a per-day revenue ledger with durable snapshots.

pub mod app;
pub mod config;
pub mod facility;
pub mod observability;
pub mod storage;

pub use config::security::{AdminSecret, CredentialCheck};
pub use config::{
    CategoryCapacities, ConfigError, FacilityConfig, LogConfig, StorageConfig,
    DEFAULT_ADMIN_SECRET, DEFAULT_HOURLY_RATE, DEFAULT_OCCUPANCY_FILE, DEFAULT_REVENUE_FILE,
};
pub use facility::{
    format_hour, hour_bucket, AllocationEngine, CategoryAvailability, CategorySelector, Clock,
    EngineOptions, Facility, FacilityStatus, ManualClock, Money, OccupancyError, OccupancyLedger,
    OccupancySnapshot, ParkReceipt, ParkingError, PlateNumber, RevenueLedger, RevenueSnapshot,
    SlotPool, SlotReserveError, SystemClock, Ticket, UnparkReceipt, Vehicle, VehicleCategory,
    ERR_ALREADY_PARKED, ERR_INVALID_CATEGORY, ERR_INVALID_FORMAT, ERR_NO_SLOT_AVAILABLE,
    ERR_UNAUTHORIZED, ERR_VEHICLE_NOT_FOUND, MILLIS_PER_HOUR,
};
pub use observability::init_logging;
pub use observability::logging::{
    JsonLineLogger, LogEvent, LogHandle, LogLevel, LogSink, LoggingError, MemoryLog,
};
pub use storage::{
    FileGateway, MemoryGateway, PersistenceError, PersistenceGateway, RecordKind,
    SnapshotEnvelope, ENVELOPE_FORMAT, ENVELOPE_VERSION,
};
