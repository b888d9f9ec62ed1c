use serde::{Deserialize, Serialize};

pub type RideId = i64;
pub type UserId = String;

/// Vehicle kind a pool travels by. Determines the seat table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RideType {
    Bike,
    Carpool,
    Rickshaw,
}

impl RideType {
    /// Seats including the lead where one exists. Carpool counts the lead
    /// as one of its four seats (fixed business rule, see DESIGN.md).
    pub fn max_capacity(self) -> u32 {
        match self {
            RideType::Bike => 2,
            RideType::Carpool => 4,
            RideType::Rickshaw => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RideType::Bike => "bike",
            RideType::Carpool => "carpool",
            RideType::Rickshaw => "rickshaw",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "bike" => Some(RideType::Bike),
            "carpool" => Some(RideType::Carpool),
            "rickshaw" => Some(RideType::Rickshaw),
            _ => None,
        }
    }
}

/// Ride lifecycle. Open ⇄ Full track capacity; Started and Completed are
/// reached only through explicit lead action and are never left again
/// (Completed rides are retained for history).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RideStatus {
    Open,
    Full,
    Started,
    Completed,
}

impl RideStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RideStatus::Open => "open",
            RideStatus::Full => "full",
            RideStatus::Started => "started",
            RideStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "open" => Some(RideStatus::Open),
            "full" => Some(RideStatus::Full),
            "started" => Some(RideStatus::Started),
            "completed" => Some(RideStatus::Completed),
            _ => None,
        }
    }
}

/// Recorded gender of a user profile. Anything the profile store cannot
/// vouch for maps to `Unspecified`, which is ineligible for restricted
/// rides but matches general ones normally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Female,
    Male,
    Unspecified,
}

impl Gender {
    pub fn parse(s: &str) -> Self {
        match s {
            "female" => Gender::Female,
            "male" => Gender::Male,
            _ => Gender::Unspecified,
        }
    }
}

/// Gender preference declared on a ride. Unknown stored strings fall back
/// to `Any`, matching how the original records defaulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenderPreference {
    Female,
    Male,
    Any,
}

impl GenderPreference {
    pub fn parse(s: &str) -> Self {
        match s {
            "female" => GenderPreference::Female,
            "male" => GenderPreference::Male,
            _ => GenderPreference::Any,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Accepted => "accepted",
            RequestStatus::Rejected => "rejected",
        }
    }
}

/// One user's bid to join a specific ride. At most one Pending entry per
/// user per ride; the status flips exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinRequest {
    pub user_id: UserId,
    pub status: RequestStatus,
}

/// A pooled ride: a capacity-bounded set of participants travelling the
/// same route, either led by the user who offered it or aggregated
/// leaderless rickshaw-style.
///
/// Invariant: `current_capacity <= max_capacity` at all times. Status is
/// derived from capacity while in the Open/Full regime; Started/Completed
/// override it and are never downgraded by capacity changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ride {
    /// Assigned by storage on first persist; `None` until then.
    pub id: Option<RideId>,
    /// `None` for leaderless aggregation rides.
    pub owner_id: Option<UserId>,
    pub from: String,
    pub to: String,
    pub depart_time: String,
    pub mode: String,
    pub ride_type: RideType,
    pub current_capacity: u32,
    pub max_capacity: u32,
    pub females_only: bool,
    pub gender_preference: GenderPreference,
    pub status: RideStatus,
    /// Accepted user ids in join order; the lead comes first when present.
    pub participants: Vec<UserId>,
    pub pending_requests: Vec<JoinRequest>,
}

impl Ride {
    /// A lead-owned ride. The lead takes the first seat.
    #[allow(clippy::too_many_arguments)]
    pub fn offered(
        owner_id: UserId,
        from: impl Into<String>,
        to: impl Into<String>,
        depart_time: impl Into<String>,
        mode: impl Into<String>,
        ride_type: RideType,
        females_only: bool,
        gender_preference: GenderPreference,
    ) -> Self {
        Self {
            id: None,
            owner_id: Some(owner_id.clone()),
            from: from.into(),
            to: to.into(),
            depart_time: depart_time.into(),
            mode: mode.into(),
            ride_type,
            current_capacity: 1,
            max_capacity: ride_type.max_capacity(),
            females_only,
            gender_preference,
            status: RideStatus::Open,
            participants: vec![owner_id],
            pending_requests: Vec::new(),
        }
    }

    /// A leaderless pool seeded by the requester who could not find a match.
    pub fn aggregation(
        first_rider: UserId,
        from: impl Into<String>,
        to: impl Into<String>,
        depart_time: impl Into<String>,
        mode: impl Into<String>,
        ride_type: RideType,
    ) -> Self {
        Self {
            id: None,
            owner_id: None,
            from: from.into(),
            to: to.into(),
            depart_time: depart_time.into(),
            mode: mode.into(),
            ride_type,
            current_capacity: 1,
            max_capacity: ride_type.max_capacity(),
            females_only: false,
            gender_preference: GenderPreference::Any,
            status: RideStatus::Open,
            participants: vec![first_rider],
            pending_requests: Vec::new(),
        }
    }

    pub fn can_accept_more(&self) -> bool {
        self.status == RideStatus::Open && self.current_capacity < self.max_capacity
    }

    /// Free seats. Valid for display regardless of status.
    pub fn available_slots(&self) -> u32 {
        self.max_capacity.saturating_sub(self.current_capacity)
    }

    pub fn has_pending_request(&self, user_id: &str) -> bool {
        self.pending_requests
            .iter()
            .any(|req| req.user_id == user_id && req.status == RequestStatus::Pending)
    }

    /// Records a Pending entry. No-op when this user already has one or the
    /// ride cannot accept more. Capacity is untouched until approval.
    pub fn add_join_request(&mut self, user_id: &str) -> bool {
        if self.has_pending_request(user_id) || !self.can_accept_more() {
            return false;
        }
        self.pending_requests.push(JoinRequest {
            user_id: user_id.to_string(),
            status: RequestStatus::Pending,
        });
        true
    }

    /// Accepts a pending request: marks it Accepted, seats the user and
    /// recomputes status. Returns false when there is no pending entry or
    /// no seat left; the caller treats that as "not approvable now".
    pub fn approve_request(&mut self, user_id: &str) -> bool {
        if !self.can_accept_more() {
            return false;
        }
        let Some(request) = self
            .pending_requests
            .iter_mut()
            .find(|req| req.user_id == user_id && req.status == RequestStatus::Pending)
        else {
            return false;
        };
        request.status = RequestStatus::Accepted;
        self.participants.push(user_id.to_string());
        self.current_capacity += 1;
        self.update_status();
        true
    }

    /// Marks a pending request Rejected. No capacity effect.
    pub fn reject_request(&mut self, user_id: &str) -> bool {
        let Some(request) = self
            .pending_requests
            .iter_mut()
            .find(|req| req.user_id == user_id && req.status == RequestStatus::Pending)
        else {
            return false;
        };
        request.status = RequestStatus::Rejected;
        true
    }

    /// Recomputes Open/Full from capacity. Idempotent; never downgrades
    /// Started or Completed.
    pub fn update_status(&mut self) {
        match self.status {
            RideStatus::Started | RideStatus::Completed => {}
            _ => {
                self.status = if self.current_capacity >= self.max_capacity {
                    RideStatus::Full
                } else {
                    RideStatus::Open
                };
            }
        }
    }

    /// Explicit lead action: Open/Full → Started. False otherwise.
    pub fn start(&mut self) -> bool {
        match self.status {
            RideStatus::Open | RideStatus::Full => {
                self.status = RideStatus::Started;
                true
            }
            _ => false,
        }
    }

    /// Explicit lead action: Started → Completed. False otherwise.
    pub fn complete(&mut self) -> bool {
        match self.status {
            RideStatus::Started => {
                self.status = RideStatus::Completed;
                true
            }
            _ => false,
        }
    }
}
