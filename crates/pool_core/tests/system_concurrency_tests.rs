mod support;

use std::sync::Arc;
use std::thread;

use pool_core::error::{ConflictReason, CoreError};
use pool_core::ride::{RideStatus, RideType};
use pool_core::storage::RideStore;
use pool_core::test_helpers::offer;

use support::seeded_service;

#[test]
fn racing_approvals_never_overbook_a_carpool() {
    let (store, service) = seeded_service();
    let service = Arc::new(service);

    let ride = service
        .offer_ride(offer("bilal", "Gulshan", "NED Campus", RideType::Carpool))
        .expect("offer");
    let ride_id = ride.id.expect("id");
    let free_seats = ride.available_slots() as usize;

    // More pending requests than free seats, all submitted while open.
    let riders: Vec<String> = (0..free_seats + 3).map(|i| format!("rider{}", i)).collect();
    for rider in &riders {
        service.submit_join_request(ride_id, rider).expect("submit");
    }

    let handles: Vec<_> = riders
        .iter()
        .cloned()
        .map(|rider| {
            let service = service.clone();
            thread::spawn(move || service.respond_to_request(ride_id, &rider, true))
        })
        .collect();
    let results: Vec<_> = handles
        .into_iter()
        .map(|h| h.join().expect("thread"))
        .collect();

    let admitted = results.iter().filter(|r| r.is_ok()).count();
    let refused = results
        .iter()
        .filter(|r| **r == Err(CoreError::Conflict(ConflictReason::NotApprovable)))
        .count();
    assert_eq!(admitted, free_seats);
    assert_eq!(refused, results.len() - free_seats);

    let loaded = store.load_ride(ride_id).expect("load").expect("ride");
    assert_eq!(loaded.current_capacity, loaded.max_capacity);
    assert_eq!(loaded.status, RideStatus::Full);
    assert_eq!(loaded.participants.len(), loaded.max_capacity as usize);
}

#[test]
fn concurrent_submissions_by_one_user_keep_a_single_pending_request() {
    let (store, service) = seeded_service();
    let service = Arc::new(service);

    let ride_ids: Vec<_> = (0..4)
        .map(|i| {
            let owner = format!("owner{}", i);
            service
                .offer_ride(offer(&owner, "Gulshan", "NED Campus", RideType::Carpool))
                .expect("offer")
                .id
                .expect("id")
        })
        .collect();

    let handles: Vec<_> = ride_ids
        .iter()
        .copied()
        .map(|ride_id| {
            let service = service.clone();
            thread::spawn(move || service.submit_join_request(ride_id, "amira"))
        })
        .collect();
    let results: Vec<_> = handles
        .into_iter()
        .map(|h| h.join().expect("thread"))
        .collect();

    let accepted = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(accepted, 1, "one submission may land: {:?}", results);
    assert!(results
        .iter()
        .all(|r| r.is_ok() || *r == Err(CoreError::Conflict(ConflictReason::AlreadyActive))));

    let pending_total: usize = ride_ids
        .iter()
        .map(|id| store.pending_requests(*id).expect("pending").len())
        .sum();
    assert_eq!(pending_total, 1);
}

#[test]
fn approvals_on_unrelated_rides_proceed_independently() {
    let (store, service) = seeded_service();
    let service = Arc::new(service);

    let ride_ids: Vec<_> = (0..8)
        .map(|i| {
            let owner = format!("owner{}", i);
            let ride = service
                .offer_ride(offer(&owner, "Gulshan", "NED Campus", RideType::Bike))
                .expect("offer");
            let id = ride.id.expect("id");
            let rider = format!("rider{}", i);
            service.submit_join_request(id, &rider).expect("submit");
            id
        })
        .collect();

    let handles: Vec<_> = ride_ids
        .iter()
        .copied()
        .enumerate()
        .map(|(i, ride_id)| {
            let service = service.clone();
            thread::spawn(move || {
                let rider = format!("rider{}", i);
                service.respond_to_request(ride_id, &rider, true)
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("thread").expect("approve");
    }

    for ride_id in ride_ids {
        let ride = store.load_ride(ride_id).expect("load").expect("ride");
        assert_eq!(ride.status, RideStatus::Full);
        assert_eq!(ride.current_capacity, 2);
    }
}
