//! Read-time projections over [`DashboardState`].

use serde::Serialize;

use crate::domain::foundation::{GeoPoint, Timestamp};

use super::resources::Tourist;
use super::state::DashboardState;

/// A roster entry joined with its live position, if any.
///
/// The roster itself is never modified by push updates.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TouristView {
    #[serde(flatten)]
    pub tourist: Tourist,
    pub current_location: Option<GeoPoint>,
    pub last_seen: Option<Timestamp>,
    pub location_name: Option<String>,
}

impl DashboardState {
    /// Active tourists with the latest pushed position overlaid.
    ///
    /// Falls back to the position the REST roster carried when no push
    /// update has arrived for that tourist.
    pub fn tourists_with_locations(&self) -> Vec<TouristView> {
        self.tourists
            .data()
            .active
            .iter()
            .map(|tourist| match self.locations.get(&tourist.id) {
                Some(record) => TouristView {
                    tourist: tourist.clone(),
                    current_location: Some(record.location),
                    last_seen: Some(record.timestamp),
                    location_name: Some(record.location_name.clone()),
                },
                None => TouristView {
                    tourist: tourist.clone(),
                    current_location: tourist.last_location,
                    last_seen: None,
                    location_name: None,
                },
            })
            .collect()
    }

    /// Number of tourists currently reporting a live position.
    pub fn live_tourist_count(&self) -> usize {
        self.locations.len()
    }
}
