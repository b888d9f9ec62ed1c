use std::fmt;

use crate::proximity::LocationEdge;
use crate::ride::{Gender, RequestStatus, Ride, RideId, RideStatus, UserId};

pub mod memory;

pub use memory::MemoryStore;

/// Failure reported by a storage collaborator. Surfaced verbatim; the core
/// treats every variant as non-retryable within the call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A write referenced a ride id the store does not know.
    UnknownRide(RideId),
    /// A request-status write referenced a (ride, user) pair with no row.
    UnknownRequest { ride_id: RideId, user_id: UserId },
    /// Backend-specific failure, carried as the backend reported it.
    Backend(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::UnknownRide(id) => write!(f, "unknown ride {}", id),
            StoreError::UnknownRequest { ride_id, user_id } => {
                write!(f, "no request row for user {} on ride {}", user_id, ride_id)
            }
            StoreError::Backend(msg) => write!(f, "backend failure: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

/// Storage collaborator the core consumes from. Implementations enforce
/// referential integrity and id uniqueness; the core layers capacity and
/// lifecycle rules on top.
///
/// Writes must be visible to subsequent loads on return (read-after-write
/// on ride state).
pub trait RideStore: Send + Sync {
    fn load_all_rides(&self) -> Result<Vec<Ride>, StoreError>;

    fn load_ride(&self, id: RideId) -> Result<Option<Ride>, StoreError>;

    /// Persists a new ride and returns its assigned id.
    fn insert_ride(&self, ride: &Ride) -> Result<RideId, StoreError>;

    fn update_capacity(&self, id: RideId, capacity: u32) -> Result<(), StoreError>;

    fn update_status(&self, id: RideId, status: RideStatus) -> Result<(), StoreError>;

    /// Whether the user holds a Pending join request anywhere.
    fn has_active_request(&self, user_id: &str) -> Result<bool, StoreError>;

    /// Records a Pending join request row for (ride, user).
    fn insert_join_request(&self, ride_id: RideId, user_id: &str) -> Result<(), StoreError>;

    /// Flips the most recent Pending row for (ride, user).
    fn update_request_status(
        &self,
        ride_id: RideId,
        user_id: &str,
        status: RequestStatus,
    ) -> Result<(), StoreError>;

    /// Users with a Pending request on the given ride, in submission order.
    fn pending_requests(&self, ride_id: RideId) -> Result<Vec<UserId>, StoreError>;

    /// Recorded gender for eligibility filtering. Profiles the store cannot
    /// vouch for come back as `Unspecified`.
    fn user_gender(&self, user_id: &str) -> Result<Gender, StoreError>;

    /// The precomputed area distance table, loaded once at startup.
    fn location_edges(&self) -> Result<Vec<LocationEdge>, StoreError>;
}
