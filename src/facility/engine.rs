use super::clock::Clock;
use super::error::ParkingError;
use super::model::{
    hour_bucket, CategorySelector, Money, PlateNumber, Ticket, Vehicle, VehicleCategory,
    MILLIS_PER_HOUR,
};
use super::occupancy::{OccupancyLedger, OccupancySnapshot};
use super::revenue::{RevenueLedger, RevenueSnapshot};
use super::slot_pool::SlotPool;
use crate::config::security::{AdminSecret, CredentialCheck};
use crate::config::{CategoryCapacities, ConfigError, FacilityConfig};
use crate::observability::logging::{LogEvent, LogHandle};
use crate::storage::PersistenceGateway;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

const MODULE: &str = "parkade::engine";

/// Pricing and sizing knobs fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    pub capacities: CategoryCapacities,
    pub hourly_rate: Money,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            capacities: CategoryCapacities::default(),
            hourly_rate: Money::from_major(20),
        }
    }
}

/// Successful park outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParkReceipt {
    pub plate: PlateNumber,
    pub category: VehicleCategory,
    pub slot: u32,
    /// Whole hours since the Unix epoch.
    pub entry_hour: u64,
}

impl fmt::Display for ParkReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Vehicle parked successfully!")?;
        writeln!(f, "Slot: {} ({})", self.slot, self.category)?;
        write!(f, "Entry Time: {}", format_hour(self.entry_hour))
    }
}

/// Successful unpark outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnparkReceipt {
    pub plate: PlateNumber,
    pub category: VehicleCategory,
    pub slot: u32,
    /// Hour buckets between entry and exit, before the one-hour floor.
    pub elapsed_hours: u64,
    /// Billed hours: `max(1, elapsed_hours)`.
    pub duration_hours: u64,
    pub charge: Money,
    pub revenue_date: NaiveDate,
}

impl fmt::Display for UnparkReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Vehicle unparked successfully!")?;
        writeln!(f, "Slot: {} ({})", self.slot, self.category)?;
        writeln!(f, "Duration: {} hours", self.duration_hours)?;
        write!(f, "Total Charge: Rs. {}", self.charge)
    }
}

/// Free/total counts for one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryAvailability {
    pub category: VehicleCategory,
    pub capacity: u32,
    pub available: u32,
}

/// Point-in-time view of the whole facility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacilityStatus {
    pub tickets: Vec<Ticket>,
    pub availability: Vec<CategoryAvailability>,
}

impl fmt::Display for FacilityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Current Parking Status")?;
        writeln!(f)?;
        writeln!(
            f,
            "{:<5} {:<15} {:<14} {:<20}",
            "Slot", "Vehicle No.", "Type", "Entry Time"
        )?;
        writeln!(f, "{}", "-".repeat(60))?;
        if self.tickets.is_empty() {
            writeln!(f, "No vehicles currently parked")?;
        }
        for ticket in &self.tickets {
            writeln!(
                f,
                "{:<5} {:<15} {:<14} {:<20}",
                ticket.slot,
                ticket.plate().as_str(),
                ticket.category().label(),
                format_hour(ticket.vehicle.entry_hour)
            )?;
        }
        writeln!(f)?;
        write!(f, "Available Slots:")?;
        for entry in &self.availability {
            write!(
                f,
                "\n{}: {} / {}",
                entry.category, entry.available, entry.capacity
            )?;
        }
        Ok(())
    }
}

/// Renders an hour bucket as a UTC wall-clock time.
pub fn format_hour(entry_hour: u64) -> String {
    let ms = entry_hour.saturating_mul(MILLIS_PER_HOUR);
    i64::try_from(ms)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|instant| instant.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| format!("hour {entry_hour}"))
}

/// Slot allocation, ticketing and revenue for one facility.
///
/// Owns the per-category pools and both ledgers. Every mutating call either
/// completes all of its steps (including the persistence attempt) or fails
/// validation before touching any state.
pub struct AllocationEngine<G: PersistenceGateway> {
    options: EngineOptions,
    pools: [SlotPool; 3],
    occupancy: OccupancyLedger,
    revenue: RevenueLedger,
    gateway: G,
    clock: Arc<dyn Clock>,
    credential: Box<dyn CredentialCheck>,
    log: LogHandle,
}

impl<G: PersistenceGateway> AllocationEngine<G> {
    /// Builds the engine and restores whatever state the gateway holds.
    pub fn open(
        options: EngineOptions,
        credential: Box<dyn CredentialCheck>,
        gateway: G,
        clock: Arc<dyn Clock>,
        log: LogHandle,
    ) -> Self {
        let pools = VehicleCategory::ALL
            .map(|category| SlotPool::new(category, options.capacities.get(category)));
        let mut engine = Self {
            options,
            pools,
            occupancy: OccupancyLedger::new(),
            revenue: RevenueLedger::new(),
            gateway,
            clock,
            credential,
            log,
        };
        engine.restore();
        engine
    }

    /// Builds the engine from validated configuration.
    pub fn from_config(
        config: &FacilityConfig,
        gateway: G,
        clock: Arc<dyn Clock>,
        log: LogHandle,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let options = EngineOptions {
            capacities: config.capacities,
            hourly_rate: config.hourly_rate_money()?,
        };
        let credential = Box::new(AdminSecret::new(&config.admin_secret));
        Ok(Self::open(options, credential, gateway, clock, log))
    }

    pub fn options(&self) -> EngineOptions {
        self.options
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Assigns the lowest free slot of the selected category to `plate`.
    pub fn park<S: CategorySelector>(
        &mut self,
        plate: &str,
        selector: S,
    ) -> Result<ParkReceipt, ParkingError> {
        let outcome = self.try_park(plate, &selector);
        match &outcome {
            Ok(receipt) => self.log.info(
                LogEvent::new(MODULE, "park", "vehicle parked")
                    .plate(receipt.plate.as_str())
                    .category(receipt.category)
                    .slot(receipt.slot),
            ),
            Err(err) => self.log.debug(
                LogEvent::new(MODULE, "park_rejected", err.to_string()).plate(plate),
            ),
        }
        outcome
    }

    fn try_park(
        &mut self,
        plate: &str,
        selector: &dyn CategorySelector,
    ) -> Result<ParkReceipt, ParkingError> {
        let plate = PlateNumber::parse(plate)?;
        let category = selector.resolve()?;
        if self.occupancy.contains(&plate) {
            return Err(ParkingError::AlreadyParked {
                plate: plate.to_string(),
            });
        }
        let slot = self.pools[category.index()]
            .acquire()
            .ok_or(ParkingError::NoSlotAvailable { category })?;
        let entry_hour = hour_bucket(self.clock.now_ms());
        let ticket = Ticket::new(
            slot,
            Vehicle {
                plate: plate.clone(),
                category,
                entry_hour,
            },
        );
        if self.occupancy.put(category, plate.clone(), ticket).is_err() {
            self.pools[category.index()].release(slot);
            return Err(ParkingError::AlreadyParked {
                plate: plate.to_string(),
            });
        }
        self.gateway.save_occupancy(&self.occupancy.snapshot());
        Ok(ParkReceipt {
            plate,
            category,
            slot,
            entry_hour,
        })
    }

    /// Releases the vehicle's slot, bills the stay and books the charge.
    pub fn unpark(&mut self, plate: &str) -> Result<UnparkReceipt, ParkingError> {
        let outcome = self.try_unpark(plate);
        match &outcome {
            Ok(receipt) => self.log.info(
                LogEvent::new(
                    MODULE,
                    "unpark",
                    format!(
                        "vehicle left after {} billed hours, charged {}",
                        receipt.duration_hours, receipt.charge
                    ),
                )
                .plate(receipt.plate.as_str())
                .category(receipt.category)
                .slot(receipt.slot),
            ),
            Err(err) => self.log.debug(
                LogEvent::new(MODULE, "unpark_rejected", err.to_string()).plate(plate),
            ),
        }
        outcome
    }

    fn try_unpark(&mut self, plate: &str) -> Result<UnparkReceipt, ParkingError> {
        let (category, ticket) =
            self.occupancy
                .remove(plate)
                .map_err(|_| ParkingError::VehicleNotFound {
                    plate: plate.to_string(),
                })?;
        let exit_hour = hour_bucket(self.clock.now_ms());
        let elapsed_hours = exit_hour.saturating_sub(ticket.vehicle.entry_hour);
        let duration_hours = elapsed_hours.max(1);
        let charge = self.options.hourly_rate.saturating_mul(duration_hours);
        self.pools[category.index()].release(ticket.slot);
        let revenue_date = self.clock.today();
        self.revenue.add(revenue_date, charge);
        self.gateway.save_occupancy(&self.occupancy.snapshot());
        self.gateway.save_revenue(&self.revenue.snapshot());
        Ok(UnparkReceipt {
            plate: ticket.vehicle.plate,
            category,
            slot: ticket.slot,
            elapsed_hours,
            duration_hours,
            charge,
            revenue_date,
        })
    }

    /// Free slots in `category`.
    pub fn available_slots(&self, category: VehicleCategory) -> u32 {
        self.pools[category.index()].available()
    }

    pub fn capacity(&self, category: VehicleCategory) -> u32 {
        self.pools[category.index()].capacity()
    }

    /// Active tickets in `category`.
    pub fn occupied_slots(&self, category: VehicleCategory) -> usize {
        self.occupancy.occupied(category)
    }

    /// Every active ticket, ordered by category then slot.
    pub fn all_tickets(&self) -> Vec<Ticket> {
        self.occupancy.list_all()
    }

    pub fn status(&self) -> FacilityStatus {
        FacilityStatus {
            tickets: self.all_tickets(),
            availability: self
                .pools
                .iter()
                .map(|pool| CategoryAvailability {
                    category: pool.category(),
                    capacity: pool.capacity(),
                    available: pool.available(),
                })
                .collect(),
        }
    }

    /// Copy of the per-day revenue, gated on the admin credential.
    pub fn revenue_snapshot(&self, credential: &str) -> Result<RevenueSnapshot, ParkingError> {
        self.authorize(credential, "view_revenue")?;
        Ok(self.revenue.snapshot())
    }

    /// Erases all revenue history, gated on the admin credential.
    pub fn clear_revenue(&mut self, credential: &str) -> Result<(), ParkingError> {
        self.authorize(credential, "clear_revenue")?;
        self.revenue.clear();
        self.gateway.save_revenue(&self.revenue.snapshot());
        self.log.info(LogEvent::new(
            MODULE,
            "clear_revenue",
            "revenue history cleared",
        ));
        Ok(())
    }

    fn authorize(&self, credential: &str, action: &str) -> Result<(), ParkingError> {
        if self.credential.verify(credential) {
            return Ok(());
        }
        self.log.warn(LogEvent::new(
            MODULE,
            "unauthorized",
            format!("rejected admin credential for {action}"),
        ));
        Err(ParkingError::Unauthorized)
    }

    fn restore(&mut self) {
        if let Some(snapshot) = self.gateway.load_revenue() {
            self.revenue = RevenueLedger::from_snapshot(snapshot);
        }
        let Some(snapshot) = self.gateway.load_occupancy() else {
            return;
        };
        let dropped = self.replay_occupancy(snapshot);
        if dropped > 0 {
            self.gateway.save_occupancy(&self.occupancy.snapshot());
        }
        self.log.info(LogEvent::new(
            MODULE,
            "restore",
            format!(
                "restored {} active tickets, dropped {dropped}",
                self.occupancy.len()
            ),
        ));
    }

    /// Re-admits persisted tickets, claiming their slots. Returns how many
    /// tickets were inconsistent with the pools and discarded.
    fn replay_occupancy(&mut self, snapshot: OccupancySnapshot) -> usize {
        let mut dropped = 0;
        for (category, tickets) in snapshot {
            for (plate, ticket) in tickets {
                let rejection = if ticket.vehicle.category != category {
                    Some(format!(
                        "ticket filed under {category} but issued for {}",
                        ticket.vehicle.category
                    ))
                } else if &plate != ticket.plate() {
                    Some(format!("ticket keyed by {plate} belongs to {}", ticket.plate()))
                } else if self.occupancy.contains(&plate) {
                    Some("vehicle already holds another ticket".to_string())
                } else {
                    self.pools[category.index()]
                        .reserve(ticket.slot)
                        .err()
                        .map(|err| err.to_string())
                };
                match rejection {
                    Some(reason) => {
                        dropped += 1;
                        self.log.warn(
                            LogEvent::new(MODULE, "restore_dropped", reason)
                                .plate(plate.as_str())
                                .category(category)
                                .slot(ticket.slot),
                        );
                    }
                    None => {
                        // Slot already reserved and plate checked above.
                        let _ = self.occupancy.put(category, plate, ticket);
                    }
                }
            }
        }
        dropped
    }
}

impl<G: PersistenceGateway> fmt::Debug for AllocationEngine<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AllocationEngine")
            .field("options", &self.options)
            .field("pools", &self.pools)
            .field("occupied", &self.occupancy.len())
            .finish_non_exhaustive()
    }
}
