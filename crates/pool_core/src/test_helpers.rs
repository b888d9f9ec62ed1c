//! Shared fixtures for exercising the pooling core in tests and benches.

use crate::matching::MatchQuery;
use crate::proximity::LocationEdge;
use crate::ride::{Gender, GenderPreference, RideType};
use crate::service::RideOffer;
use crate::storage::memory::{MemoryStore, UserProfile};

/// Edge table for a small campus neighborhood: Gulshan and Johar are near
/// each other and the campus; Saddar and Clifton sit apart on the far
/// side.
pub fn campus_edges() -> Vec<LocationEdge> {
    let edge = |a: &str, b: &str, km: f64| LocationEdge {
        area1: a.to_string(),
        area2: b.to_string(),
        distance_km: km,
    };
    vec![
        edge("Gulshan", "Johar", 3.2),
        edge("Gulshan", "NED Campus", 2.8),
        edge("Johar", "NED Campus", 1.9),
        edge("Saddar", "Clifton", 2.1),
    ]
}

/// A store seeded with the campus edge table and a handful of profiles:
/// amira and carol recorded female, bilal male, dani without a recorded
/// gender.
pub fn seeded_store() -> MemoryStore {
    let store = MemoryStore::new();
    let user = |id: &str, name: &str, gender: Gender| UserProfile {
        user_id: id.to_string(),
        name: name.to_string(),
        gender,
    };
    store.add_user(user("amira", "Amira", Gender::Female));
    store.add_user(user("carol", "Carol", Gender::Female));
    store.add_user(user("bilal", "Bilal", Gender::Male));
    store.add_user(user("dani", "Dani", Gender::Unspecified));
    store.seed_edges(campus_edges());
    store
}

/// A plain general-audience offer for the given route.
pub fn offer(owner: &str, from: &str, to: &str, ride_type: RideType) -> RideOffer {
    RideOffer {
        owner_id: owner.to_string(),
        from: from.to_string(),
        to: to.to_string(),
        depart_time: "08:30".to_string(),
        ride_type,
        females_only: false,
        gender_preference: GenderPreference::Any,
    }
}

/// A search without the females-only wish set.
pub fn query(requester: &str, from: &str, to: &str, ride_type: RideType) -> MatchQuery {
    MatchQuery {
        from: from.to_string(),
        to: to.to_string(),
        ride_type,
        requester: requester.to_string(),
        females_only: false,
    }
}
