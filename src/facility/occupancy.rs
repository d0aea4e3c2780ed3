use super::model::{PlateNumber, Ticket, VehicleCategory};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

/// Persistable view of the ledger: category -> plate -> ticket.
pub type OccupancySnapshot = BTreeMap<VehicleCategory, BTreeMap<PlateNumber, Ticket>>;

/// Ledger failure modes.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OccupancyError {
    #[error("vehicle {plate} already holds a ticket in {category}")]
    DuplicateVehicle {
        plate: PlateNumber,
        category: VehicleCategory,
    },
    #[error("vehicle {0} not found")]
    VehicleNotFound(String),
}

/// Active tickets partitioned by category.
///
/// A plate appears in at most one category at a time; the `index` keeps the
/// plate -> category mapping so removal does not scan every partition.
#[derive(Debug, Clone, Default)]
pub struct OccupancyLedger {
    partitions: BTreeMap<VehicleCategory, BTreeMap<PlateNumber, Ticket>>,
    index: HashMap<PlateNumber, VehicleCategory>,
}

impl OccupancyLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a ticket; rejects a plate already present in any category.
    pub fn put(
        &mut self,
        category: VehicleCategory,
        plate: PlateNumber,
        ticket: Ticket,
    ) -> Result<(), OccupancyError> {
        if let Some(existing) = self.index.get(&plate) {
            return Err(OccupancyError::DuplicateVehicle {
                plate,
                category: *existing,
            });
        }
        self.index.insert(plate.clone(), category);
        self.partitions
            .entry(category)
            .or_default()
            .insert(plate, ticket);
        Ok(())
    }

    /// Removes the ticket for `plate`, reporting the category it lived in.
    pub fn remove(&mut self, plate: &str) -> Result<(VehicleCategory, Ticket), OccupancyError> {
        let not_found = || OccupancyError::VehicleNotFound(plate.to_string());
        let key = PlateNumber::parse(plate).map_err(|_| not_found())?;
        let category = self.index.remove(&key).ok_or_else(not_found)?;
        let partition = self.partitions.get_mut(&category).ok_or_else(not_found)?;
        let ticket = partition.remove(&key).ok_or_else(not_found)?;
        if partition.is_empty() {
            self.partitions.remove(&category);
        }
        Ok((category, ticket))
    }

    pub fn contains(&self, plate: &PlateNumber) -> bool {
        self.index.contains_key(plate)
    }

    pub fn get(&self, plate: &PlateNumber) -> Option<&Ticket> {
        let category = self.index.get(plate)?;
        self.partitions.get(category)?.get(plate)
    }

    /// Number of active tickets in `category`.
    pub fn occupied(&self, category: VehicleCategory) -> usize {
        self.partitions.get(&category).map_or(0, BTreeMap::len)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// All active tickets ordered by category, then slot number.
    pub fn list_all(&self) -> Vec<Ticket> {
        let mut tickets: Vec<Ticket> = self
            .partitions
            .values()
            .flat_map(|partition| partition.values().cloned())
            .collect();
        tickets.sort_by_key(|ticket| (ticket.category(), ticket.slot));
        tickets
    }

    /// Copies the ledger into its persistable form.
    pub fn snapshot(&self) -> OccupancySnapshot {
        self.partitions.clone()
    }
}
