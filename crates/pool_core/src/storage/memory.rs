use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::proximity::LocationEdge;
use crate::ride::{Gender, JoinRequest, RequestStatus, Ride, RideId, RideStatus, UserId};
use crate::storage::{RideStore, StoreError};

/// A registered user as the matching engine needs to see them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub user_id: UserId,
    pub name: String,
    pub gender: Gender,
}

#[derive(Debug, Clone)]
struct RequestRow {
    ride_id: RideId,
    user_id: UserId,
    status: RequestStatus,
}

#[derive(Debug, Default)]
struct Tables {
    next_ride_id: RideId,
    rides: HashMap<RideId, Ride>,
    requests: Vec<RequestRow>,
    users: HashMap<UserId, UserProfile>,
    edges: Vec<LocationEdge>,
}

/// In-process storage collaborator. Keeps the same tables the production
/// database does (rides, join requests, users, area edges) behind one
/// `RwLock`, with ids assigned monotonically.
///
/// Ride rows are stored without request bookkeeping; loads rebuild the
/// request list and the participant list (lead plus accepted requesters)
/// from the request table, so a load after any write observes it.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_user(&self, profile: UserProfile) {
        let mut tables = self.write();
        tables.users.insert(profile.user_id.clone(), profile);
    }

    pub fn seed_edges(&self, edges: Vec<LocationEdge>) {
        self.write().edges = edges;
    }

    fn hydrate(tables: &Tables, mut ride: Ride) -> Ride {
        let Some(id) = ride.id else {
            return ride;
        };
        for row in tables.requests.iter().filter(|row| row.ride_id == id) {
            ride.pending_requests.push(JoinRequest {
                user_id: row.user_id.clone(),
                status: row.status,
            });
            if row.status == RequestStatus::Accepted
                && !ride.participants.contains(&row.user_id)
            {
                ride.participants.push(row.user_id.clone());
            }
        }
        ride
    }
}

impl RideStore for MemoryStore {
    fn load_all_rides(&self) -> Result<Vec<Ride>, StoreError> {
        let tables = self.read();
        let mut ids: Vec<RideId> = tables.rides.keys().copied().collect();
        ids.sort_unstable();
        Ok(ids
            .into_iter()
            .map(|id| Self::hydrate(&tables, tables.rides[&id].clone()))
            .collect())
    }

    fn load_ride(&self, id: RideId) -> Result<Option<Ride>, StoreError> {
        let tables = self.read();
        Ok(tables
            .rides
            .get(&id)
            .cloned()
            .map(|ride| Self::hydrate(&tables, ride)))
    }

    fn insert_ride(&self, ride: &Ride) -> Result<RideId, StoreError> {
        let mut tables = self.write();
        tables.next_ride_id += 1;
        let id = tables.next_ride_id;
        let mut row = ride.clone();
        row.id = Some(id);
        row.pending_requests.clear();
        tables.rides.insert(id, row);
        Ok(id)
    }

    fn update_capacity(&self, id: RideId, capacity: u32) -> Result<(), StoreError> {
        let mut tables = self.write();
        let ride = tables.rides.get_mut(&id).ok_or(StoreError::UnknownRide(id))?;
        ride.current_capacity = capacity;
        Ok(())
    }

    fn update_status(&self, id: RideId, status: RideStatus) -> Result<(), StoreError> {
        let mut tables = self.write();
        let ride = tables.rides.get_mut(&id).ok_or(StoreError::UnknownRide(id))?;
        ride.status = status;
        Ok(())
    }

    fn has_active_request(&self, user_id: &str) -> Result<bool, StoreError> {
        let tables = self.read();
        Ok(tables
            .requests
            .iter()
            .any(|row| row.user_id == user_id && row.status == RequestStatus::Pending))
    }

    fn insert_join_request(&self, ride_id: RideId, user_id: &str) -> Result<(), StoreError> {
        let mut tables = self.write();
        if !tables.rides.contains_key(&ride_id) {
            return Err(StoreError::UnknownRide(ride_id));
        }
        tables.requests.push(RequestRow {
            ride_id,
            user_id: user_id.to_string(),
            status: RequestStatus::Pending,
        });
        Ok(())
    }

    fn update_request_status(
        &self,
        ride_id: RideId,
        user_id: &str,
        status: RequestStatus,
    ) -> Result<(), StoreError> {
        let mut tables = self.write();
        let row = tables
            .requests
            .iter_mut()
            .rev()
            .find(|row| {
                row.ride_id == ride_id
                    && row.user_id == user_id
                    && row.status == RequestStatus::Pending
            })
            .ok_or_else(|| StoreError::UnknownRequest {
                ride_id,
                user_id: user_id.to_string(),
            })?;
        row.status = status;
        Ok(())
    }

    fn pending_requests(&self, ride_id: RideId) -> Result<Vec<UserId>, StoreError> {
        let tables = self.read();
        Ok(tables
            .requests
            .iter()
            .filter(|row| row.ride_id == ride_id && row.status == RequestStatus::Pending)
            .map(|row| row.user_id.clone())
            .collect())
    }

    fn user_gender(&self, user_id: &str) -> Result<Gender, StoreError> {
        let tables = self.read();
        Ok(tables
            .users
            .get(user_id)
            .map(|profile| profile.gender)
            .unwrap_or(Gender::Unspecified))
    }

    fn location_edges(&self) -> Result<Vec<LocationEdge>, StoreError> {
        Ok(self.read().edges.clone())
    }
}
