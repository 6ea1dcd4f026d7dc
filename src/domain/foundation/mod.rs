//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, and error types that form the
//! vocabulary of the dashboard synchronization domain.

mod errors;
mod geo;
mod ids;
mod state_machine;
mod timestamp;

pub use errors::ValidationError;
pub use geo::GeoPoint;
pub use ids::{AlertId, BroadcastId, SubjectId, ZoneId};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
