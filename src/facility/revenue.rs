use super::model::Money;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Persistable view of the revenue ledger: calendar date -> takings.
pub type RevenueSnapshot = BTreeMap<NaiveDate, Money>;

/// Per-day accumulated charges.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RevenueLedger {
    days: BTreeMap<NaiveDate, Money>,
}

impl RevenueLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a ledger from a persisted snapshot.
    pub fn from_snapshot(snapshot: RevenueSnapshot) -> Self {
        Self { days: snapshot }
    }

    /// Adds `amount` to the running total for `date`, starting at zero.
    pub fn add(&mut self, date: NaiveDate, amount: Money) -> Money {
        let entry = self.days.entry(date).or_default();
        *entry = entry.saturating_add(amount);
        *entry
    }

    pub fn get(&self, date: NaiveDate) -> Money {
        self.days.get(&date).copied().unwrap_or_default()
    }

    /// Sum across all recorded days.
    pub fn total(&self) -> Money {
        self.days
            .values()
            .fold(Money::ZERO, |acc, amount| acc.saturating_add(*amount))
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn snapshot(&self) -> RevenueSnapshot {
        self.days.clone()
    }

    /// Drops every recorded day. Irreversible.
    pub fn clear(&mut self) {
        self.days.clear();
    }
}
