//! UpdateAlertStatusHandler - acknowledge or resolve an alert.

use crate::application::resource_refresher::ResourceRefresher;
use crate::domain::dashboard::{AlertRecord, AlertStatus, ResourceKind};
use crate::domain::foundation::AlertId;

use super::CommandError;

#[derive(Debug, Clone)]
pub struct UpdateAlertStatusCommand {
    pub alert_id: AlertId,
    pub status: AlertStatus,
}

#[derive(Clone)]
pub struct UpdateAlertStatusHandler {
    refresher: ResourceRefresher,
}

impl UpdateAlertStatusHandler {
    pub fn new(refresher: ResourceRefresher) -> Self {
        Self { refresher }
    }

    /// Returns the updated record when the backend echoes it.
    pub async fn handle(
        &self,
        cmd: UpdateAlertStatusCommand,
    ) -> Result<Option<AlertRecord>, CommandError> {
        let record = self
            .refresher
            .api()
            .update_alert_status(&cmd.alert_id, cmd.status)
            .await?
            .into_ack()?;
        tracing::info!(alert_id = %cmd.alert_id, status = ?cmd.status, "alert status updated");

        self.refresher
            .refresh_selective(&[ResourceKind::SosAlerts, ResourceKind::DashboardStats])
            .await;

        Ok(record)
    }
}
