//! DashboardApi port - REST access to the dashboard backend.
//!
//! One fetch per cached resource plus the operator write operations.
//! Every call answers with the backend's `{success, data?, error?}`
//! envelope; transport failures surface as [`FetchError`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::dashboard::{
    AlertRecord, AlertStatus, Broadcast, BroadcastDraft, FetchError, GeofenceDraft, GeofenceZone,
    HeatmapPoint, TouristRoster,
};
use crate::domain::events::StatsPatch;
use crate::domain::foundation::{AlertId, ZoneId};

/// Response body shared by every REST endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }

    /// Unwraps the payload, mapping `success: false` to
    /// [`FetchError::Rejected`] with the server's message.
    pub fn into_result(self) -> Result<T, FetchError> {
        if !self.success {
            return Err(self.rejection());
        }
        self.data
            .ok_or_else(|| FetchError::Decode("success response without data".to_string()))
    }

    /// Like [`into_result`](Self::into_result) but tolerates an empty body.
    pub fn into_ack(self) -> Result<Option<T>, FetchError> {
        if !self.success {
            return Err(self.rejection());
        }
        Ok(self.data)
    }

    fn rejection(&self) -> FetchError {
        FetchError::rejected(
            self.error
                .clone()
                .unwrap_or_else(|| "request rejected".to_string()),
        )
    }
}

/// Port for the dashboard REST backend.
#[async_trait]
pub trait DashboardApi: Send + Sync {
    /// Stats arrive as a patch: keys the backend omits keep their cached value.
    async fn fetch_dashboard_stats(&self) -> Result<ApiResponse<StatsPatch>, FetchError>;

    async fn fetch_tourists(&self) -> Result<ApiResponse<TouristRoster>, FetchError>;

    async fn fetch_sos_alerts(&self) -> Result<ApiResponse<Vec<AlertRecord>>, FetchError>;

    async fn fetch_geofences(&self) -> Result<ApiResponse<Vec<GeofenceZone>>, FetchError>;

    async fn fetch_broadcast_history(&self) -> Result<ApiResponse<Vec<Broadcast>>, FetchError>;

    async fn fetch_heatmap_data(&self) -> Result<ApiResponse<Vec<HeatmapPoint>>, FetchError>;

    async fn create_geofence(
        &self,
        draft: &GeofenceDraft,
    ) -> Result<ApiResponse<GeofenceZone>, FetchError>;

    async fn update_geofence(
        &self,
        id: &ZoneId,
        draft: &GeofenceDraft,
    ) -> Result<ApiResponse<GeofenceZone>, FetchError>;

    async fn update_alert_status(
        &self,
        id: &AlertId,
        status: AlertStatus,
    ) -> Result<ApiResponse<AlertRecord>, FetchError>;

    async fn send_broadcast(
        &self,
        draft: &BroadcastDraft,
    ) -> Result<ApiResponse<Broadcast>, FetchError>;
}
