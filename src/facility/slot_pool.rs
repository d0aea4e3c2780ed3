use super::model::VehicleCategory;
use std::collections::BTreeSet;
use thiserror::Error;

/// Raised when a specific slot cannot be claimed during state restoration.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum SlotReserveError {
    #[error("slot {slot} outside 1..={capacity}")]
    OutOfRange { slot: u32, capacity: u32 },
    #[error("slot {slot} already occupied")]
    Occupied { slot: u32 },
}

/// Free-slot tracker for a single category.
///
/// Slots are numbered `1..=capacity` and always handed out lowest first, so
/// allocation is deterministic regardless of the order slots were released.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotPool {
    category: VehicleCategory,
    capacity: u32,
    free: BTreeSet<u32>,
}

impl SlotPool {
    /// Creates a pool with every slot free.
    pub fn new(category: VehicleCategory, capacity: u32) -> Self {
        Self {
            category,
            capacity,
            free: (1..=capacity).collect(),
        }
    }

    pub fn category(&self) -> VehicleCategory {
        self.category
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Number of currently free slots.
    pub fn available(&self) -> u32 {
        self.free.len() as u32
    }

    /// Number of slots currently handed out.
    pub fn occupied(&self) -> u32 {
        self.capacity - self.available()
    }

    pub fn is_free(&self, slot: u32) -> bool {
        self.free.contains(&slot)
    }

    /// Takes the lowest free slot, or `None` when the pool is exhausted.
    pub fn acquire(&mut self) -> Option<u32> {
        self.free.pop_first()
    }

    /// Returns a slot to the pool.
    ///
    /// Releasing a slot that is already free or outside the pool's range is a
    /// no-op; the return value reports whether the free set changed.
    pub fn release(&mut self, slot: u32) -> bool {
        if slot == 0 || slot > self.capacity {
            return false;
        }
        self.free.insert(slot)
    }

    /// Claims a specific slot, used when replaying persisted occupancy.
    pub fn reserve(&mut self, slot: u32) -> Result<(), SlotReserveError> {
        if slot == 0 || slot > self.capacity {
            return Err(SlotReserveError::OutOfRange {
                slot,
                capacity: self.capacity,
            });
        }
        if !self.free.remove(&slot) {
            return Err(SlotReserveError::Occupied { slot });
        }
        Ok(())
    }
}
