use std::sync::Arc;

use crate::proximity::LocationGraph;
use crate::ride::{Gender, Ride, RideType, UserId};
use crate::storage::{RideStore, StoreError};

use super::eligibility::rider_eligible;

/// A ride search as issued by a prospective participant.
#[derive(Debug, Clone)]
pub struct MatchQuery {
    pub from: String,
    pub to: String,
    pub ride_type: RideType,
    pub requester: UserId,
    /// The requester specifically wants a females-only ride.
    pub females_only: bool,
}

/// Finds open rides a requester can ask to join.
///
/// Candidates come from the storage collaborator; the filter pipeline is
/// ride-type, capacity, self-match exclusion, proximity on both route
/// endpoints, then gender eligibility. Result order is storage order, one
/// entry per ride, and an empty result is a normal outcome.
pub struct MatchingEngine {
    store: Arc<dyn RideStore>,
    graph: Arc<LocationGraph>,
}

impl MatchingEngine {
    pub fn new(store: Arc<dyn RideStore>, graph: Arc<LocationGraph>) -> Self {
        Self { store, graph }
    }

    pub fn find_matches(&self, query: &MatchQuery) -> Result<Vec<Ride>, StoreError> {
        let requester_gender = self.store.user_gender(&query.requester)?;
        let rides = self.store.load_all_rides()?;
        Ok(rides
            .into_iter()
            .filter(|ride| self.accepts(ride, query, requester_gender))
            .collect())
    }

    fn accepts(&self, ride: &Ride, query: &MatchQuery, requester_gender: Gender) -> bool {
        if ride.ride_type != query.ride_type {
            return false;
        }
        if !ride.can_accept_more() {
            return false;
        }
        if ride.owner_id.as_deref() == Some(query.requester.as_str()) {
            return false;
        }
        if !self.graph.connected(&query.from, &ride.from)
            || !self.graph.connected(&query.to, &ride.to)
        {
            return false;
        }
        rider_eligible(
            requester_gender,
            query.females_only,
            ride.females_only,
            ride.gender_preference,
        )
    }
}
