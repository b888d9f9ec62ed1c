use std::sync::Arc;

use crate::error::{CoreError, NotFoundKind, ValidationReason};
use crate::matching::{MatchQuery, MatchingEngine};
use crate::proximity::LocationGraph;
use crate::ride::{GenderPreference, Ride, RideId, RideType, UserId};
use crate::storage::RideStore;
use crate::workflow::{JoinRequestWorkflow, RideLocks};

/// Parameters for a new lead-owned ride offer.
#[derive(Debug, Clone)]
pub struct RideOffer {
    pub owner_id: UserId,
    pub from: String,
    pub to: String,
    pub depart_time: String,
    pub ride_type: RideType,
    pub females_only: bool,
    pub gender_preference: GenderPreference,
}

/// Outcome of a request-or-lead call: candidates to ask into, or a fresh
/// ride the requester now leads.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestOutcome {
    Matches(Vec<Ride>),
    CreatedLead(Ride),
}

/// Entry point an embedding application calls into. Owns the proximity
/// graph, the matching engine and the join workflow over one storage
/// collaborator; every operation is a bounded, synchronous call returning
/// a typed result.
pub struct RideService {
    store: Arc<dyn RideStore>,
    engine: MatchingEngine,
    workflow: JoinRequestWorkflow,
}

impl RideService {
    /// Builds the service, loading the proximity graph from storage once.
    pub fn new(store: Arc<dyn RideStore>) -> Result<Self, CoreError> {
        let edges = store.location_edges()?;
        Ok(Self::with_graph(store, LocationGraph::from_edges(&edges)))
    }

    /// Builds the service around an already-loaded proximity graph.
    pub fn with_graph(store: Arc<dyn RideStore>, graph: LocationGraph) -> Self {
        let graph = Arc::new(graph);
        let locks = Arc::new(RideLocks::new());
        Self {
            engine: MatchingEngine::new(store.clone(), graph),
            workflow: JoinRequestWorkflow::new(store.clone(), locks),
            store,
        }
    }

    fn validate_route(from: &str, to: &str) -> Result<(), CoreError> {
        if from.trim().is_empty() || to.trim().is_empty() {
            return Err(CoreError::Validation(ValidationReason::MissingRoute));
        }
        Ok(())
    }

    /// Publishes a lead-owned ride offer. Rickshaw pools are leaderless
    /// and cannot be offered this way.
    pub fn offer_ride(&self, offer: RideOffer) -> Result<Ride, CoreError> {
        Self::validate_route(&offer.from, &offer.to)?;
        if offer.owner_id.trim().is_empty() {
            return Err(CoreError::Validation(ValidationReason::MissingUser));
        }
        if offer.ride_type == RideType::Rickshaw {
            return Err(CoreError::Validation(ValidationReason::OwnedRickshaw));
        }

        let mut ride = Ride::offered(
            offer.owner_id,
            offer.from,
            offer.to,
            offer.depart_time,
            "offer",
            offer.ride_type,
            offer.females_only,
            offer.gender_preference,
        );
        ride.id = Some(self.store.insert_ride(&ride)?);
        Ok(ride)
    }

    /// Open rides the requester could ask to join. Empty is a normal
    /// outcome, not an error.
    pub fn search_rides(&self, query: &MatchQuery) -> Result<Vec<Ride>, CoreError> {
        Self::validate_route(&query.from, &query.to)?;
        Ok(self.engine.find_matches(query)?)
    }

    /// Search-first travel request. When nothing matches, the requester
    /// becomes the ad-hoc lead of a fresh ride on their route: owner-led
    /// for bike and carpool, leaderless aggregation for rickshaw.
    pub fn request_ride(
        &self,
        query: &MatchQuery,
        depart_time: &str,
    ) -> Result<RequestOutcome, CoreError> {
        Self::validate_route(&query.from, &query.to)?;
        if query.requester.trim().is_empty() {
            return Err(CoreError::Validation(ValidationReason::MissingUser));
        }

        let matches = self.engine.find_matches(query)?;
        if !matches.is_empty() {
            return Ok(RequestOutcome::Matches(matches));
        }

        let mut ride = match query.ride_type {
            RideType::Rickshaw => Ride::aggregation(
                query.requester.clone(),
                query.from.clone(),
                query.to.clone(),
                depart_time,
                "request",
                RideType::Rickshaw,
            ),
            _ => Ride::offered(
                query.requester.clone(),
                query.from.clone(),
                query.to.clone(),
                depart_time,
                "request",
                query.ride_type,
                query.females_only,
                GenderPreference::Any,
            ),
        };
        ride.id = Some(self.store.insert_ride(&ride)?);
        Ok(RequestOutcome::CreatedLead(ride))
    }

    pub fn submit_join_request(&self, ride_id: RideId, user_id: &str) -> Result<(), CoreError> {
        if user_id.trim().is_empty() {
            return Err(CoreError::Validation(ValidationReason::MissingUser));
        }
        self.workflow.submit(ride_id, user_id)
    }

    pub fn respond_to_request(
        &self,
        ride_id: RideId,
        user_id: &str,
        accept: bool,
    ) -> Result<(), CoreError> {
        self.workflow.respond(ride_id, user_id, accept)
    }

    /// Lead-only transition to Started. On leaderless rides any seated
    /// participant may act for the pool.
    pub fn start_ride(&self, ride_id: RideId, acting_user: &str) -> Result<(), CoreError> {
        self.authorize_lead(ride_id, acting_user)?;
        self.workflow.start(ride_id)
    }

    /// Lead-only transition to Completed.
    pub fn complete_ride(&self, ride_id: RideId, acting_user: &str) -> Result<(), CoreError> {
        self.authorize_lead(ride_id, acting_user)?;
        self.workflow.complete(ride_id)
    }

    fn authorize_lead(&self, ride_id: RideId, acting_user: &str) -> Result<(), CoreError> {
        let ride = self
            .store
            .load_ride(ride_id)?
            .ok_or(CoreError::NotFound(NotFoundKind::Ride(ride_id)))?;
        let allowed = match &ride.owner_id {
            Some(owner) => owner == acting_user,
            None => ride.participants.iter().any(|p| p == acting_user),
        };
        if !allowed {
            return Err(CoreError::Validation(ValidationReason::NotLead));
        }
        Ok(())
    }

    /// Every ride the store knows, for listing. Completed rides stay
    /// visible as history.
    pub fn list_rides(&self) -> Result<Vec<Ride>, CoreError> {
        Ok(self.store.load_all_rides()?)
    }

    /// Pending requesters on a ride, for the lead to review.
    pub fn pending_requests(&self, ride_id: RideId) -> Result<Vec<UserId>, CoreError> {
        if self.store.load_ride(ride_id)?.is_none() {
            return Err(CoreError::NotFound(NotFoundKind::Ride(ride_id)));
        }
        Ok(self.store.pending_requests(ride_id)?)
    }
}

#[cfg(test)]
mod end_to_end_tests {
    use super::*;
    use crate::error::ConflictReason;
    use crate::ride::{Gender, RideStatus};
    use crate::storage::memory::{MemoryStore, UserProfile};
    use crate::test_helpers::{campus_edges, offer, query, seeded_store};

    fn service() -> (Arc<MemoryStore>, RideService) {
        let store = Arc::new(seeded_store());
        let service = RideService::new(store.clone()).expect("service");
        (store, service)
    }

    #[test]
    fn offer_search_join_approve_start_complete() {
        let (_store, service) = service();

        let ride = service
            .offer_ride(offer("bilal", "Gulshan", "NED Campus", RideType::Bike))
            .expect("offer");
        let ride_id = ride.id.expect("persisted id");

        let found = service
            .search_rides(&query("amira", "Gulshan", "NED Campus", RideType::Bike))
            .expect("search");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, Some(ride_id));

        service.submit_join_request(ride_id, "amira").expect("submit");
        assert_eq!(
            service.pending_requests(ride_id).expect("pending"),
            vec!["amira".to_string()]
        );

        service
            .respond_to_request(ride_id, "amira", true)
            .expect("approve");

        // Read-after-write: the filled ride no longer matches.
        let found = service
            .search_rides(&query("carol", "Gulshan", "NED Campus", RideType::Bike))
            .expect("search");
        assert!(found.is_empty());

        service.start_ride(ride_id, "bilal").expect("start");
        service.complete_ride(ride_id, "bilal").expect("complete");

        let rides = service.list_rides().expect("list");
        assert_eq!(rides.len(), 1);
        assert_eq!(rides[0].status, RideStatus::Completed);
        assert_eq!(rides[0].participants.len(), 2);
    }

    #[test]
    fn owned_rickshaw_offer_is_rejected() {
        let (_store, service) = service();
        assert_eq!(
            service.offer_ride(offer("bilal", "Gulshan", "NED Campus", RideType::Rickshaw)),
            Err(CoreError::Validation(ValidationReason::OwnedRickshaw))
        );
    }

    #[test]
    fn blank_route_is_rejected_before_any_write() {
        let (_store, service) = service();
        assert_eq!(
            service.offer_ride(offer("bilal", " ", "NED Campus", RideType::Bike)),
            Err(CoreError::Validation(ValidationReason::MissingRoute))
        );
        assert!(service.list_rides().expect("list").is_empty());
    }

    #[test]
    fn request_ride_returns_matches_when_present() {
        let (_store, service) = service();
        service
            .offer_ride(offer("bilal", "Gulshan", "NED Campus", RideType::Carpool))
            .expect("offer");

        let outcome = service
            .request_ride(&query("amira", "Gulshan", "NED Campus", RideType::Carpool), "08:30")
            .expect("request");
        match outcome {
            RequestOutcome::Matches(matches) => assert_eq!(matches.len(), 1),
            other => panic!("expected matches, got {:?}", other),
        }
    }

    #[test]
    fn request_ride_makes_the_requester_lead_when_nothing_matches() {
        let (_store, service) = service();

        let outcome = service
            .request_ride(&query("amira", "Clifton", "Saddar", RideType::Carpool), "17:00")
            .expect("request");
        let RequestOutcome::CreatedLead(ride) = outcome else {
            panic!("expected a created lead ride");
        };
        assert_eq!(ride.owner_id.as_deref(), Some("amira"));
        assert!(ride.id.is_some());
        assert_eq!(ride.current_capacity, 1);

        // The new ride is a candidate for the next requester.
        let found = service
            .search_rides(&query("bilal", "Clifton", "Saddar", RideType::Carpool))
            .expect("search");
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn rickshaw_request_creates_a_leaderless_pool() {
        let (_store, service) = service();

        let outcome = service
            .request_ride(&query("amira", "Clifton", "Saddar", RideType::Rickshaw), "17:00")
            .expect("request");
        let RequestOutcome::CreatedLead(ride) = outcome else {
            panic!("expected a created pool");
        };
        assert_eq!(ride.owner_id, None);
        assert_eq!(ride.participants, vec!["amira".to_string()]);
        assert_eq!(ride.max_capacity, 3);

        // Any seated participant may start a leaderless pool.
        service
            .start_ride(ride.id.expect("id"), "amira")
            .expect("start");
    }

    #[test]
    fn only_the_lead_may_start_or_complete() {
        let (_store, service) = service();
        let ride = service
            .offer_ride(offer("bilal", "Gulshan", "NED Campus", RideType::Bike))
            .expect("offer");
        let ride_id = ride.id.expect("id");

        assert_eq!(
            service.start_ride(ride_id, "amira"),
            Err(CoreError::Validation(ValidationReason::NotLead))
        );
        assert_eq!(
            service.complete_ride(ride_id, "amira"),
            Err(CoreError::Validation(ValidationReason::NotLead))
        );
        service.start_ride(ride_id, "bilal").expect("start");
    }

    #[test]
    fn completing_an_unstarted_ride_conflicts() {
        let (_store, service) = service();
        let ride = service
            .offer_ride(offer("bilal", "Gulshan", "NED Campus", RideType::Bike))
            .expect("offer");

        assert_eq!(
            service.complete_ride(ride.id.expect("id"), "bilal"),
            Err(CoreError::Conflict(ConflictReason::InvalidTransition))
        );
    }

    #[test]
    fn proximity_graph_from_storage_drives_search() {
        let store = Arc::new(MemoryStore::new());
        store.add_user(UserProfile {
            user_id: "amira".to_string(),
            name: "Amira".to_string(),
            gender: Gender::Female,
        });
        store.add_user(UserProfile {
            user_id: "bilal".to_string(),
            name: "Bilal".to_string(),
            gender: Gender::Male,
        });
        store.seed_edges(campus_edges());
        let service = RideService::new(store.clone()).expect("service");

        service
            .offer_ride(offer("bilal", "Johar", "NED Campus", RideType::Carpool))
            .expect("offer");

        // Gulshan–Johar carries an edge; Clifton–Johar does not.
        let near = service
            .search_rides(&query("amira", "Gulshan", "NED Campus", RideType::Carpool))
            .expect("search");
        assert_eq!(near.len(), 1);

        let far = service
            .search_rides(&query("amira", "Clifton", "NED Campus", RideType::Carpool))
            .expect("search");
        assert!(far.is_empty());
    }
}
