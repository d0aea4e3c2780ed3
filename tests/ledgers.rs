use chrono::NaiveDate;
use parkade::{
    Money, OccupancyError, OccupancyLedger, PlateNumber, RevenueLedger, Ticket, Vehicle,
    VehicleCategory,
};

fn ticket(plate: &str, category: VehicleCategory, slot: u32) -> (PlateNumber, Ticket) {
    let plate = PlateNumber::parse(plate).expect("valid plate");
    let ticket = Ticket::new(
        slot,
        Vehicle {
            plate: plate.clone(),
            category,
            entry_hour: 480_000,
        },
    );
    (plate, ticket)
}

#[test]
fn occupancy_rejects_plate_present_in_another_category() {
    let mut ledger = OccupancyLedger::new();
    let (plate, first) = ticket("MH12AB1234", VehicleCategory::TwoWheeler, 1);
    ledger
        .put(VehicleCategory::TwoWheeler, plate.clone(), first)
        .expect("first insert");

    let (_, second) = ticket("MH12AB1234", VehicleCategory::FourWheeler, 1);
    let err = ledger
        .put(VehicleCategory::FourWheeler, plate.clone(), second)
        .unwrap_err();
    assert_eq!(
        err,
        OccupancyError::DuplicateVehicle {
            plate,
            category: VehicleCategory::TwoWheeler
        }
    );
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger.occupied(VehicleCategory::FourWheeler), 0);
}

#[test]
fn occupancy_remove_reports_category() {
    let mut ledger = OccupancyLedger::new();
    for (plate, category, slot) in [
        ("MH12AB0001", VehicleCategory::TwoWheeler, 1),
        ("MH12AB0002", VehicleCategory::ThreeWheeler, 1),
        ("MH12AB0003", VehicleCategory::FourWheeler, 2),
    ] {
        let (plate, ticket) = ticket(plate, category, slot);
        ledger.put(category, plate, ticket).unwrap();
    }

    let (category, removed) = ledger.remove("MH12AB0003").expect("present");
    assert_eq!(category, VehicleCategory::FourWheeler);
    assert_eq!(removed.slot, 2);
    assert_eq!(ledger.len(), 2);
    assert!(matches!(
        ledger.remove("MH12AB0003"),
        Err(OccupancyError::VehicleNotFound(_))
    ));
    assert!(matches!(
        ledger.remove("not a plate"),
        Err(OccupancyError::VehicleNotFound(_))
    ));
    assert_eq!(ledger.list_all().len(), 2);
}

#[test]
fn occupancy_snapshot_mirrors_partitions() {
    let mut ledger = OccupancyLedger::new();
    let (plate, t) = ticket("KA05MN0042", VehicleCategory::ThreeWheeler, 3);
    ledger
        .put(VehicleCategory::ThreeWheeler, plate.clone(), t.clone())
        .unwrap();
    let snapshot = ledger.snapshot();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[&VehicleCategory::ThreeWheeler][&plate], t);
    assert_eq!(ledger.get(&plate), Some(&t));
}

#[test]
fn revenue_accumulates_per_day_and_clears_totally() {
    let monday = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
    let tuesday = monday.succ_opt().unwrap();
    let mut ledger = RevenueLedger::new();
    assert_eq!(ledger.get(monday), Money::ZERO);

    ledger.add(monday, Money::from_major(20));
    let running = ledger.add(monday, Money::from_major(40));
    assert_eq!(running, Money::from_major(60));
    ledger.add(tuesday, Money::from_minor(1_050));
    assert_eq!(ledger.total(), Money::from_minor(7_050));

    let snapshot = ledger.snapshot();
    ledger.add(tuesday, Money::from_major(1));
    assert_eq!(snapshot[&tuesday], Money::from_minor(1_050), "snapshot is a copy");

    ledger.clear();
    assert!(ledger.is_empty());
    assert_eq!(ledger.total(), Money::ZERO);
    assert_eq!(RevenueLedger::from_snapshot(snapshot).get(monday), Money::from_major(60));
}

#[test]
fn money_formats_two_decimal_places() {
    assert_eq!(Money::from_major(20).to_string(), "20.00");
    assert_eq!(Money::from_minor(1_005).to_string(), "10.05");
    assert_eq!(Money::from_decimal(12.5), Some(Money::from_minor(1_250)));
    assert_eq!(Money::from_decimal(-1.0), None);
    assert_eq!(Money::from_decimal(f64::NAN), None);
}
