use std::collections::BTreeMap;
use std::fs;
use std::sync::Arc;

use chrono::NaiveDate;
use parkade::{
    AdminSecret, AllocationEngine, EngineOptions, FileGateway, LogHandle, LogLevel, ManualClock,
    MemoryGateway, Money, OccupancySnapshot, PersistenceError, PersistenceGateway, PlateNumber,
    RecordKind, RevenueSnapshot, SnapshotEnvelope, Ticket, Vehicle, VehicleCategory,
};
use serde_json::Value;

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
}

fn sample_occupancy() -> OccupancySnapshot {
    let mut snapshot = OccupancySnapshot::new();
    for (plate, category, slot) in [
        ("MH12AB0001", VehicleCategory::TwoWheeler, 1),
        ("MH12AB0002", VehicleCategory::TwoWheeler, 3),
        ("DL01ZZ9999", VehicleCategory::FourWheeler, 2),
    ] {
        let plate = PlateNumber::parse(plate).unwrap();
        let ticket = Ticket::new(
            slot,
            Vehicle {
                plate: plate.clone(),
                category,
                entry_hour: 474_000,
            },
        );
        snapshot.entry(category).or_default().insert(plate, ticket);
    }
    snapshot
}

fn sample_revenue() -> RevenueSnapshot {
    let mut revenue = BTreeMap::new();
    revenue.insert(day(), Money::from_major(60));
    revenue.insert(day().succ_opt().unwrap(), Money::from_minor(2_050));
    revenue
}

fn file_gateway(dir: &std::path::Path) -> FileGateway {
    FileGateway::new(
        dir.join("parking_data.json"),
        dir.join("revenue_data.json"),
        LogHandle::disabled(),
    )
}

fn open_engine<G: PersistenceGateway>(gateway: G) -> AllocationEngine<G> {
    AllocationEngine::open(
        EngineOptions::default(),
        Box::new(AdminSecret::new("admin123")),
        gateway,
        Arc::new(ManualClock::at_date(day())),
        LogHandle::disabled(),
    )
}

#[test]
fn file_gateway_round_trips_both_records() {
    let tmp = tempfile::tempdir().unwrap();
    let mut gateway = file_gateway(tmp.path());
    assert!(gateway.load_occupancy().is_none());
    assert!(gateway.load_revenue().is_none());

    gateway.save_occupancy(&sample_occupancy());
    gateway.save_revenue(&sample_revenue());

    let mut reopened = file_gateway(tmp.path());
    assert_eq!(reopened.load_occupancy(), Some(sample_occupancy()));
    assert_eq!(reopened.load_revenue(), Some(sample_revenue()));
    assert!(!tmp.path().join("parking_data.json.tmp").exists());
}

#[test]
fn memory_gateway_round_trips_both_records() {
    let mut gateway = MemoryGateway::default();
    gateway.save_occupancy(&sample_occupancy());
    gateway.save_revenue(&sample_revenue());
    assert_eq!(gateway.load_occupancy(), Some(sample_occupancy()));
    assert_eq!(gateway.load_revenue(), Some(sample_revenue()));
    assert_eq!(gateway.occupancy_saves(), 1);
}

#[test]
fn records_are_checksummed_envelopes() {
    let tmp = tempfile::tempdir().unwrap();
    let mut gateway = file_gateway(tmp.path());
    gateway.save_revenue(&sample_revenue());

    let raw = fs::read(tmp.path().join("revenue_data.json")).unwrap();
    let value: Value = serde_json::from_slice(&raw).unwrap();
    assert_eq!(value["format"], "parkade-snapshot");
    assert_eq!(value["kind"], "revenue");
    assert_eq!(value["checksum"].as_str().unwrap().len(), 64);

    let envelope = SnapshotEnvelope::from_bytes(&raw).unwrap();
    let err = envelope.open::<RevenueSnapshot>(RecordKind::Occupancy).unwrap_err();
    assert!(matches!(err, PersistenceError::KindMismatch { .. }));
}

#[test]
fn tampered_record_degrades_to_empty_state() {
    let tmp = tempfile::tempdir().unwrap();
    let (log, buffer) = LogHandle::memory(LogLevel::Info);
    let mut gateway = FileGateway::new(
        tmp.path().join("parking_data.json"),
        tmp.path().join("revenue_data.json"),
        log,
    );
    gateway.save_revenue(&sample_revenue());

    let path = tmp.path().join("revenue_data.json");
    let mut envelope = SnapshotEnvelope::from_bytes(&fs::read(&path).unwrap()).unwrap();
    envelope.payload = envelope.payload.replace("6000", "9000");
    fs::write(&path, envelope.to_bytes().unwrap()).unwrap();

    assert!(matches!(
        FileGateway::read_record::<RevenueSnapshot>(&path, RecordKind::Revenue),
        Err(PersistenceError::Checksum { .. })
    ));
    assert!(gateway.load_revenue().is_none());
    let warned = buffer
        .lock()
        .unwrap()
        .lines()
        .any(|line| line.contains("load_failed") && line.contains("WARN"));
    assert!(warned);
}

#[test]
fn garbage_records_degrade_to_empty_state() {
    let tmp = tempfile::tempdir().unwrap();
    fs::write(tmp.path().join("parking_data.json"), b"\x00\x01not json").unwrap();
    fs::write(tmp.path().join("revenue_data.json"), b"{\"format\":1}").unwrap();
    let engine = open_engine(file_gateway(tmp.path()));
    assert!(engine.all_tickets().is_empty());
    assert!(engine.revenue_snapshot("admin123").unwrap().is_empty());
    assert_eq!(engine.available_slots(VehicleCategory::TwoWheeler), 5);
}

#[test]
fn engine_restores_state_and_reserves_slots() {
    let tmp = tempfile::tempdir().unwrap();
    {
        let mut gateway = file_gateway(tmp.path());
        gateway.save_occupancy(&sample_occupancy());
        gateway.save_revenue(&sample_revenue());
    }
    let mut engine = open_engine(file_gateway(tmp.path()));
    assert_eq!(engine.all_tickets().len(), 3);
    assert_eq!(engine.available_slots(VehicleCategory::TwoWheeler), 3);
    assert_eq!(engine.available_slots(VehicleCategory::FourWheeler), 3);
    assert_eq!(engine.revenue_snapshot("admin123").unwrap(), sample_revenue());

    let receipt = engine
        .park("KA01AB1111", VehicleCategory::TwoWheeler)
        .unwrap();
    assert_eq!(receipt.slot, 2, "restored slots 1 and 3 stay taken");
    let err = engine
        .park("DL01ZZ9999", VehicleCategory::TwoWheeler)
        .unwrap_err();
    assert!(matches!(err, parkade::ParkingError::AlreadyParked { .. }));
}

#[test]
fn engine_state_survives_restart() {
    let tmp = tempfile::tempdir().unwrap();
    let clock = ManualClock::at_date(day());
    let open = |clock: &ManualClock| {
        AllocationEngine::open(
            EngineOptions::default(),
            Box::new(AdminSecret::new("admin123")),
            file_gateway(tmp.path()),
            Arc::new(clock.clone()),
            LogHandle::disabled(),
        )
    };
    {
        let mut engine = open(&clock);
        engine
            .park("MH12AB0001", VehicleCategory::ThreeWheeler)
            .unwrap();
        engine
            .park("MH12AB0002", VehicleCategory::ThreeWheeler)
            .unwrap();
    }
    clock.advance_hours(2);
    {
        let mut engine = open(&clock);
        let receipt = engine.unpark("MH12AB0001").unwrap();
        assert_eq!(receipt.duration_hours, 2);
    }
    let engine = open(&clock);
    let tickets = engine.all_tickets();
    assert_eq!(tickets.len(), 1);
    assert_eq!(tickets[0].plate().as_str(), "MH12AB0002");
    assert_eq!(tickets[0].slot, 2);
    let revenue = engine.revenue_snapshot("admin123").unwrap();
    assert_eq!(revenue.get(&day()), Some(&Money::from_major(40)));
}

#[test]
fn inconsistent_tickets_are_dropped_on_restore() {
    let mut snapshot = sample_occupancy();
    let conflicts = [
        // Slot 1 already belongs to MH12AB0001.
        ("MH12AB0003", VehicleCategory::TwoWheeler, VehicleCategory::TwoWheeler, 1),
        // Beyond the two-wheeler capacity of 5.
        ("MH12AB0004", VehicleCategory::TwoWheeler, VehicleCategory::TwoWheeler, 9),
        // Filed under the wrong category.
        ("MH12AB0005", VehicleCategory::ThreeWheeler, VehicleCategory::FourWheeler, 1),
        // Same vehicle already parked as a two-wheeler.
        ("MH12AB0001", VehicleCategory::FourWheeler, VehicleCategory::FourWheeler, 4),
    ];
    for (plate, filed_under, issued_for, slot) in conflicts {
        let plate = PlateNumber::parse(plate).unwrap();
        let ticket = Ticket::new(
            slot,
            Vehicle {
                plate: plate.clone(),
                category: issued_for,
                entry_hour: 474_000,
            },
        );
        snapshot.entry(filed_under).or_default().insert(plate, ticket);
    }

    let gateway = MemoryGateway::default();
    gateway.clone().save_occupancy(&snapshot);
    let engine = open_engine(gateway.clone());

    let tickets = engine.all_tickets();
    assert_eq!(tickets.len(), 3, "only the original tickets survive");
    for category in VehicleCategory::ALL {
        assert_eq!(
            engine.available_slots(category) as usize + engine.occupied_slots(category),
            engine.capacity(category) as usize
        );
    }
    let mut check = gateway.clone();
    assert_eq!(check.load_occupancy(), Some(sample_occupancy()));
}
