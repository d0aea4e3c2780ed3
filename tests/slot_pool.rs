use parkade::{SlotPool, SlotReserveError, VehicleCategory};

fn pool(capacity: u32) -> SlotPool {
    SlotPool::new(VehicleCategory::FourWheeler, capacity)
}

#[test]
fn acquires_in_ascending_order_until_exhausted() {
    let mut pool = pool(3);
    assert_eq!(pool.acquire(), Some(1));
    assert_eq!(pool.acquire(), Some(2));
    assert_eq!(pool.acquire(), Some(3));
    assert_eq!(pool.acquire(), None);
    assert_eq!(pool.available(), 0);
    assert_eq!(pool.occupied(), 3);
}

#[test]
fn reacquires_lowest_free_slot_regardless_of_release_order() {
    let mut pool = pool(6);
    let taken: Vec<u32> = (0..6).filter_map(|_| pool.acquire()).collect();
    assert_eq!(taken, vec![1, 2, 3, 4, 5, 6]);

    for slot in [5, 2, 6, 3] {
        assert!(pool.release(slot));
    }
    let again: Vec<u32> = (0..4).filter_map(|_| pool.acquire()).collect();
    assert_eq!(again, vec![2, 3, 5, 6]);
}

#[test]
fn duplicate_and_foreign_releases_are_ignored() {
    let mut pool = pool(2);
    let slot = pool.acquire().unwrap();
    assert!(pool.release(slot));
    assert!(!pool.release(slot), "second release is a no-op");
    assert!(!pool.release(0));
    assert!(!pool.release(3));
    assert_eq!(pool.available(), 2);
    assert_eq!(pool.capacity(), 2);
}

#[test]
fn zero_capacity_pool_never_yields() {
    let mut pool = pool(0);
    assert_eq!(pool.acquire(), None);
    assert!(!pool.release(1));
    assert_eq!(pool.available(), 0);
}

#[test]
fn reserve_claims_specific_slots() {
    let mut pool = pool(4);
    pool.reserve(3).expect("free slot can be reserved");
    assert!(!pool.is_free(3));
    assert_eq!(
        pool.reserve(3),
        Err(SlotReserveError::Occupied { slot: 3 })
    );
    assert_eq!(
        pool.reserve(9),
        Err(SlotReserveError::OutOfRange {
            slot: 9,
            capacity: 4
        })
    );
    let order: Vec<u32> = (0..3).filter_map(|_| pool.acquire()).collect();
    assert_eq!(order, vec![1, 2, 4]);
}
