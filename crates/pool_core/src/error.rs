use std::fmt;

use crate::ride::{RideId, UserId};
use crate::storage::StoreError;

/// Why a mutating operation was refused as a conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictReason {
    /// The user already holds a pending join request somewhere in the system.
    AlreadyActive,
    /// The ride is past the point where join requests are accepted.
    RideNotJoinable,
    /// The pending request exists but cannot be approved right now
    /// (typically the ride filled up in the meantime).
    NotApprovable,
    /// A lifecycle transition that the ride's current status does not allow.
    InvalidTransition,
}

impl ConflictReason {
    pub fn as_str(self) -> &'static str {
        match self {
            ConflictReason::AlreadyActive => "already_active",
            ConflictReason::RideNotJoinable => "ride_not_joinable",
            ConflictReason::NotApprovable => "not_approvable",
            ConflictReason::InvalidTransition => "invalid_transition",
        }
    }
}

/// Why a request was rejected before any state was touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationReason {
    MissingRoute,
    MissingUser,
    /// Rickshaw pools are leaderless; they cannot be offered by an owner.
    OwnedRickshaw,
    /// The acting user is not the ride's lead.
    NotLead,
}

impl ValidationReason {
    pub fn as_str(self) -> &'static str {
        match self {
            ValidationReason::MissingRoute => "missing_route",
            ValidationReason::MissingUser => "missing_user",
            ValidationReason::OwnedRickshaw => "owned_rickshaw",
            ValidationReason::NotLead => "not_lead",
        }
    }
}

/// The entity a lookup failed to find.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotFoundKind {
    Ride(RideId),
    Request { ride_id: RideId, user_id: UserId },
}

/// Failures surfaced by the pooling core.
///
/// Every mutating operation returns one of these on refusal; search
/// operations never fail on an empty result. Storage failures propagate
/// verbatim; the core does not retry and never leaves a half-applied
/// capacity/status update behind a success result.
#[derive(Debug, Clone, PartialEq)]
pub enum CoreError {
    Validation(ValidationReason),
    NotFound(NotFoundKind),
    Conflict(ConflictReason),
    Storage(StoreError),
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::Validation(reason) => write!(f, "validation: {}", reason.as_str()),
            CoreError::NotFound(NotFoundKind::Ride(id)) => write!(f, "ride {} not found", id),
            CoreError::NotFound(NotFoundKind::Request { ride_id, user_id }) => {
                write!(f, "no pending request from {} on ride {}", user_id, ride_id)
            }
            CoreError::Conflict(reason) => write!(f, "conflict: {}", reason.as_str()),
            CoreError::Storage(err) => write!(f, "storage: {}", err),
        }
    }
}

impl std::error::Error for CoreError {}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        CoreError::Storage(err)
    }
}
