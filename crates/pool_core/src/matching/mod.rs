pub mod eligibility;
pub mod engine;

pub use eligibility::rider_eligible;
pub use engine::{MatchQuery, MatchingEngine};
