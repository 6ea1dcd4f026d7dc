//! Geofence violation counts, derived from the alert feed on every read.

use serde::Serialize;

use crate::domain::dashboard::{DashboardState, GeofenceZone, RingBuffer};
use crate::domain::events::Alert;
use crate::domain::foundation::ZoneId;

/// Breach alerts retained in `alerts` that name `zone_id`.
///
/// Bounded by the feed capacity; old breaches age out with the feed.
pub fn violation_count(alerts: &RingBuffer<Alert>, zone_id: &ZoneId) -> usize {
    alerts.iter().filter(|alert| alert.is_breach_of(zone_id)).count()
}

/// A geofence joined with its current violation count.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneWithViolations {
    #[serde(flatten)]
    pub zone: GeofenceZone,
    pub violation_count: usize,
}

impl DashboardState {
    pub fn violation_count(&self, zone_id: &ZoneId) -> usize {
        violation_count(self.alerts(), zone_id)
    }

    /// The cached geofences, each with its count.
    pub fn zones_with_violations(&self) -> Vec<ZoneWithViolations> {
        self.geofences()
            .data()
            .iter()
            .map(|zone| ZoneWithViolations {
                violation_count: violation_count(self.alerts(), &zone.id),
                zone: zone.clone(),
            })
            .collect()
    }
}
