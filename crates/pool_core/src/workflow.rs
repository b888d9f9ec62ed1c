use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::{ConflictReason, CoreError, NotFoundKind};
use crate::ride::{RequestStatus, Ride, RideId, RideStatus, UserId};
use crate::storage::RideStore;

/// Keyed lock registry. One slot per key serializes a critical section for
/// that key without stalling unrelated keys.
#[derive(Debug)]
pub struct LockRegistry<K> {
    slots: Mutex<HashMap<K, Arc<Mutex<()>>>>,
}

impl<K> Default for LockRegistry<K> {
    fn default() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }
}

impl<K: Eq + Hash> LockRegistry<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slot(&self, key: K) -> Arc<Mutex<()>> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots
            .entry(key)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

/// Slots guarding each ride's read-capacity → decide → write critical
/// section.
pub type RideLocks = LockRegistry<RideId>;

/// Slots guarding each user's cross-ride active-request flag.
pub type UserLocks = LockRegistry<UserId>;

fn hold(slot: &Mutex<()>) -> MutexGuard<'_, ()> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Mediates the request/approval workflow between a prospective
/// participant and a ride.
///
/// Submission records a Pending entry; approval seats the user, persists
/// the new capacity (and Full, on the transition that first reaches
/// capacity) before flipping the request row, so a failed capacity write
/// never leaves an accepted request behind. All mutation for one ride runs
/// under that ride's lock slot.
pub struct JoinRequestWorkflow {
    store: Arc<dyn RideStore>,
    ride_locks: Arc<RideLocks>,
    user_locks: UserLocks,
}

impl JoinRequestWorkflow {
    pub fn new(store: Arc<dyn RideStore>, ride_locks: Arc<RideLocks>) -> Self {
        Self {
            store,
            ride_locks,
            user_locks: UserLocks::new(),
        }
    }

    fn load_ride(&self, ride_id: RideId) -> Result<Ride, CoreError> {
        self.store
            .load_ride(ride_id)?
            .ok_or(CoreError::NotFound(NotFoundKind::Ride(ride_id)))
    }

    /// Submits a join request. Idempotent when the user already has a
    /// Pending entry on this ride; refused when they hold one on any other
    /// ride, or when the ride cannot take more participants.
    pub fn submit(&self, ride_id: RideId, user_id: &str) -> Result<(), CoreError> {
        // User slot first, ride slot second; respond takes only the ride
        // slot, so the acquisition order is acyclic.
        let user_slot = self.user_locks.slot(user_id.to_string());
        let _user_guard = hold(&user_slot);
        let slot = self.ride_locks.slot(ride_id);
        let _guard = hold(&slot);

        let ride = self.load_ride(ride_id)?;
        if ride.has_pending_request(user_id) {
            return Ok(());
        }
        if self.store.has_active_request(user_id)? {
            return Err(CoreError::Conflict(ConflictReason::AlreadyActive));
        }
        if !ride.can_accept_more() {
            return Err(CoreError::Conflict(ConflictReason::RideNotJoinable));
        }
        self.store.insert_join_request(ride_id, user_id)?;
        Ok(())
    }

    /// Resolves a pending request. On accept, the capacity and status
    /// writes land before the request row flips; on reject, only the
    /// request row changes.
    pub fn respond(&self, ride_id: RideId, user_id: &str, accept: bool) -> Result<(), CoreError> {
        let slot = self.ride_locks.slot(ride_id);
        let _guard = hold(&slot);

        let mut ride = self.load_ride(ride_id)?;
        if !ride.has_pending_request(user_id) {
            return Err(CoreError::NotFound(NotFoundKind::Request {
                ride_id,
                user_id: user_id.to_string(),
            }));
        }

        if !accept {
            ride.reject_request(user_id);
            self.store
                .update_request_status(ride_id, user_id, RequestStatus::Rejected)?;
            return Ok(());
        }

        if !ride.approve_request(user_id) {
            return Err(CoreError::Conflict(ConflictReason::NotApprovable));
        }
        self.store.update_capacity(ride_id, ride.current_capacity)?;
        if ride.status == RideStatus::Full {
            self.store.update_status(ride_id, RideStatus::Full)?;
        }
        self.store
            .update_request_status(ride_id, user_id, RequestStatus::Accepted)?;
        Ok(())
    }

    /// Explicit lead transition Open/Full → Started.
    pub fn start(&self, ride_id: RideId) -> Result<(), CoreError> {
        let slot = self.ride_locks.slot(ride_id);
        let _guard = hold(&slot);

        let mut ride = self.load_ride(ride_id)?;
        if !ride.start() {
            return Err(CoreError::Conflict(ConflictReason::InvalidTransition));
        }
        self.store.update_status(ride_id, RideStatus::Started)?;
        Ok(())
    }

    /// Explicit lead transition Started → Completed. Completed rides are
    /// retained for history; there is no transition out.
    pub fn complete(&self, ride_id: RideId) -> Result<(), CoreError> {
        let slot = self.ride_locks.slot(ride_id);
        let _guard = hold(&slot);

        let mut ride = self.load_ride(ride_id)?;
        if !ride.complete() {
            return Err(CoreError::Conflict(ConflictReason::InvalidTransition));
        }
        self.store.update_status(ride_id, RideStatus::Completed)?;
        Ok(())
    }
}
