//! UpdateGeofenceHandler - Command handler for editing an existing geofence.

use crate::application::resource_refresher::ResourceRefresher;
use crate::domain::dashboard::{GeofenceDraft, GeofenceZone, ResourceKind};
use crate::domain::foundation::ZoneId;

use super::CommandError;

/// Command to replace a geofence's name, type and polygon.
#[derive(Debug, Clone)]
pub struct UpdateGeofenceCommand {
    pub zone_id: ZoneId,
    pub draft: GeofenceDraft,
}

#[derive(Clone)]
pub struct UpdateGeofenceHandler {
    refresher: ResourceRefresher,
}

impl UpdateGeofenceHandler {
    pub fn new(refresher: ResourceRefresher) -> Self {
        Self { refresher }
    }

    pub async fn handle(&self, cmd: UpdateGeofenceCommand) -> Result<GeofenceZone, CommandError> {
        cmd.draft.validate()?;

        let zone = self
            .refresher
            .api()
            .update_geofence(&cmd.zone_id, &cmd.draft)
            .await?
            .into_result()?;
        tracing::info!(zone_id = %zone.id, "geofence updated");

        self.refresher
            .refresh_selective(&[ResourceKind::Geofences])
            .await;

        Ok(zone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryDashboardApi;
    use crate::application::SharedDashboard;
    use crate::domain::dashboard::{DashboardState, FetchError, ZoneType};
    use std::sync::Arc;
    use tokio::sync::RwLock;

    fn zone(id: &str, name: &str) -> GeofenceZone {
        GeofenceZone {
            id: ZoneId::new(id),
            name: name.into(),
            zone_type: ZoneType::Caution,
            polygon: vec![[1.0, 1.0], [1.0, 2.0], [2.0, 1.0]],
        }
    }

    fn setup() -> (UpdateGeofenceHandler, InMemoryDashboardApi, SharedDashboard) {
        let api = InMemoryDashboardApi::new();
        api.set_geofences(vec![zone("z1", "Beach")]);
        let dashboard: SharedDashboard = Arc::new(RwLock::new(DashboardState::default()));
        let refresher = ResourceRefresher::new(Arc::new(api.clone()), dashboard.clone());
        (UpdateGeofenceHandler::new(refresher), api, dashboard)
    }

    #[tokio::test]
    async fn updated_zone_is_refreshed_into_cache() {
        let (handler, _api, dashboard) = setup();

        handler
            .handle(UpdateGeofenceCommand {
                zone_id: ZoneId::new("z1"),
                draft: GeofenceDraft {
                    name: "North beach".into(),
                    zone_type: ZoneType::Restricted,
                    polygon: vec![[1.0, 1.0], [1.0, 2.0], [2.0, 2.0]],
                },
            })
            .await
            .unwrap();

        let state = dashboard.read().await;
        let cached = &state.geofences().data()[0];
        assert_eq!(cached.name, "North beach");
        assert_eq!(cached.zone_type, ZoneType::Restricted);
    }

    #[tokio::test]
    async fn unknown_zone_surfaces_server_message() {
        let (handler, _api, _) = setup();

        let err = handler
            .handle(UpdateGeofenceCommand {
                zone_id: ZoneId::new("missing"),
                draft: GeofenceDraft {
                    name: "x".into(),
                    zone_type: ZoneType::Caution,
                    polygon: vec![[1.0, 1.0], [1.0, 2.0], [2.0, 2.0]],
                },
            })
            .await
            .unwrap_err();

        assert_eq!(
            err,
            CommandError::Backend(FetchError::rejected("geofence missing not found"))
        );
    }
}
