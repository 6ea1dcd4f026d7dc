//! Push events: the envelope wire type, the typed payloads, and the
//! ordered classifier that maps one onto the other.

mod alert;
mod classifier;
mod envelope;
mod errors;
mod location;
mod stats;
mod wire;

pub use alert::{Alert, AlertKind, Severity};
pub use classifier::{
    classify, classify_at, ClassificationRule, TypedEvent, UnclassifiedEvent,
    CLASSIFICATION_ORDER,
};
pub use envelope::{
    Envelope, CONNECTION_CONFIRMED, CONNECTION_INIT, DASHBOARD_STATS, DASHBOARD_UPDATE,
    TOURIST_UPDATE,
};
pub use errors::MalformedEventError;
pub use location::{LocationUpdate, TouristLocationRecord};
pub use stats::{DashboardStats, StatsPatch};
