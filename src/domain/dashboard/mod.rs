//! Dashboard state: cached REST resources, live feeds, and the folds
//! that keep them reconciled.

mod cache;
mod errors;
mod reconcile;
mod resources;
mod ring_buffer;
mod state;
mod views;

pub use cache::{CachedResource, ResourceKind};
pub use errors::FetchError;
pub use reconcile::FoldOutcome;
pub use resources::{
    AlertRecord, AlertStatus, Broadcast, BroadcastDraft, BroadcastPriority, GeofenceDraft,
    GeofenceZone, HeatmapPoint, ResourcePayload, Tourist, TouristRoster, ZoneType,
};
pub use ring_buffer::RingBuffer;
pub use state::{DashboardState, FeedCapacities, RefreshOutcome};
pub use views::TouristView;
