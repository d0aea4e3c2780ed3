use super::engine::{AllocationEngine, FacilityStatus, ParkReceipt, UnparkReceipt};
use super::error::ParkingError;
use super::model::{CategorySelector, Ticket, VehicleCategory};
use super::revenue::RevenueSnapshot;
use crate::storage::PersistenceGateway;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Thread-safe facility handle.
///
/// Mutations hold the write lock across validation, ledger updates and the
/// persistence attempt; reads share the read lock and never see a
/// half-applied park or unpark.
#[derive(Debug)]
pub struct Facility<G: PersistenceGateway> {
    engine: RwLock<AllocationEngine<G>>,
}

impl<G: PersistenceGateway> Facility<G> {
    pub fn new(engine: AllocationEngine<G>) -> Self {
        Self {
            engine: RwLock::new(engine),
        }
    }

    pub fn park<S: CategorySelector>(
        &self,
        plate: &str,
        selector: S,
    ) -> Result<ParkReceipt, ParkingError> {
        self.write().park(plate, selector)
    }

    pub fn unpark(&self, plate: &str) -> Result<UnparkReceipt, ParkingError> {
        self.write().unpark(plate)
    }

    pub fn available_slots(&self, category: VehicleCategory) -> u32 {
        self.read().available_slots(category)
    }

    pub fn all_tickets(&self) -> Vec<Ticket> {
        self.read().all_tickets()
    }

    pub fn status(&self) -> FacilityStatus {
        self.read().status()
    }

    pub fn revenue_snapshot(&self, credential: &str) -> Result<RevenueSnapshot, ParkingError> {
        self.read().revenue_snapshot(credential)
    }

    pub fn clear_revenue(&self, credential: &str) -> Result<(), ParkingError> {
        self.write().clear_revenue(credential)
    }

    /// Runs `f` against the engine under the read lock.
    pub fn inspect<R>(&self, f: impl FnOnce(&AllocationEngine<G>) -> R) -> R {
        f(&self.read())
    }

    pub fn into_inner(self) -> AllocationEngine<G> {
        self.engine
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn read(&self) -> RwLockReadGuard<'_, AllocationEngine<G>> {
        self.engine.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, AllocationEngine<G>> {
        self.engine.write().unwrap_or_else(PoisonError::into_inner)
    }
}
