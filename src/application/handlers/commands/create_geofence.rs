//! CreateGeofenceHandler - Command handler for drawing a new geofence.

use crate::application::resource_refresher::ResourceRefresher;
use crate::domain::dashboard::{GeofenceDraft, GeofenceZone, ResourceKind};

use super::CommandError;

/// Command to create a geofence.
#[derive(Debug, Clone)]
pub struct CreateGeofenceCommand {
    pub draft: GeofenceDraft,
}

/// Handler for creating geofences.
#[derive(Clone)]
pub struct CreateGeofenceHandler {
    refresher: ResourceRefresher,
}

impl CreateGeofenceHandler {
    pub fn new(refresher: ResourceRefresher) -> Self {
        Self { refresher }
    }

    pub async fn handle(&self, cmd: CreateGeofenceCommand) -> Result<GeofenceZone, CommandError> {
        // 1. Validate locally
        cmd.draft.validate()?;

        // 2. Submit
        let zone = self
            .refresher
            .api()
            .create_geofence(&cmd.draft)
            .await?
            .into_result()?;
        tracing::info!(zone_id = %zone.id, name = %zone.name, "geofence created");

        // 3. Pull the authoritative list and counters
        self.refresher
            .refresh_selective(&[ResourceKind::Geofences, ResourceKind::DashboardStats])
            .await;

        Ok(zone)
    }
}
