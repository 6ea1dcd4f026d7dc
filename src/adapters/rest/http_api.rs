//! reqwest implementation of [`DashboardApi`].
//!
//! # Configuration
//!
//! ```ignore
//! let config = HttpApiConfig::new("https://safety.example.org/api")
//!     .with_timeout(Duration::from_secs(10))
//!     .with_auth_token(token);
//!
//! let api = HttpDashboardApi::new(config)?;
//! ```

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use secrecy::{ExposeSecret, Secret};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use crate::domain::dashboard::{
    AlertRecord, AlertStatus, Broadcast, BroadcastDraft, FetchError, GeofenceDraft, GeofenceZone,
    HeatmapPoint, TouristRoster,
};
use crate::domain::events::StatsPatch;
use crate::domain::foundation::{AlertId, ZoneId};
use crate::ports::{ApiResponse, DashboardApi};

/// Configuration for the HTTP dashboard client.
#[derive(Debug, Clone)]
pub struct HttpApiConfig {
    /// API root, without trailing slash.
    pub base_url: String,
    pub timeout: Duration,
    auth_token: Option<Secret<String>>,
}

impl HttpApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(30),
            auth_token: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_auth_token(mut self, token: Secret<String>) -> Self {
        self.auth_token = Some(token);
        self
    }
}

/// Dashboard REST client.
pub struct HttpDashboardApi {
    config: HttpApiConfig,
    client: Client,
}

impl HttpDashboardApi {
    pub fn new(config: HttpApiConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| FetchError::network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.auth_token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        path: &str,
    ) -> Result<ApiResponse<T>, FetchError> {
        let response = self
            .authorize(request)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout {
                        timeout_secs: self.config.timeout.as_secs(),
                    }
                } else if e.is_connect() {
                    FetchError::network(format!("connection failed: {e}"))
                } else {
                    FetchError::network(e.to_string())
                }
            })?;

        let response = Self::check_status(response, path).await?;

        response
            .json::<ApiResponse<T>>()
            .await
            .map_err(|e| FetchError::Decode(format!("{path}: {e}")))
    }

    /// Non-2xx responses become `Rejected` when the body carries the
    /// backend's error message, `Http` otherwise.
    async fn check_status(response: Response, path: &str) -> Result<Response, FetchError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiResponse<serde_json::Value>>(&body)
            .ok()
            .and_then(|r| r.error);

        tracing::debug!(path, status = status.as_u16(), "dashboard API returned error status");

        match message {
            Some(message) => Err(FetchError::Rejected(message)),
            None => Err(FetchError::Http {
                status: status.as_u16(),
            }),
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<ApiResponse<T>, FetchError> {
        self.execute(self.client.get(self.url(path)), path).await
    }

    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: &B,
    ) -> Result<ApiResponse<T>, FetchError> {
        let request = self.client.request(method, self.url(path)).json(body);
        self.execute(request, path).await
    }
}

#[async_trait]
impl DashboardApi for HttpDashboardApi {
    async fn fetch_dashboard_stats(&self) -> Result<ApiResponse<StatsPatch>, FetchError> {
        self.get("/admin/dashboard/stats").await
    }

    async fn fetch_tourists(&self) -> Result<ApiResponse<TouristRoster>, FetchError> {
        self.get("/admin/tourists").await
    }

    async fn fetch_sos_alerts(&self) -> Result<ApiResponse<Vec<AlertRecord>>, FetchError> {
        self.get("/admin/alerts/sos").await
    }

    async fn fetch_geofences(&self) -> Result<ApiResponse<Vec<GeofenceZone>>, FetchError> {
        self.get("/admin/geofences").await
    }

    async fn fetch_broadcast_history(&self) -> Result<ApiResponse<Vec<Broadcast>>, FetchError> {
        self.get("/admin/broadcasts").await
    }

    async fn fetch_heatmap_data(&self) -> Result<ApiResponse<Vec<HeatmapPoint>>, FetchError> {
        self.get("/admin/heatmap").await
    }

    async fn create_geofence(
        &self,
        draft: &GeofenceDraft,
    ) -> Result<ApiResponse<GeofenceZone>, FetchError> {
        self.send_json(reqwest::Method::POST, "/admin/geofences", draft)
            .await
    }

    async fn update_geofence(
        &self,
        id: &ZoneId,
        draft: &GeofenceDraft,
    ) -> Result<ApiResponse<GeofenceZone>, FetchError> {
        let path = format!("/admin/geofences/{id}");
        self.send_json(reqwest::Method::PUT, &path, draft).await
    }

    async fn update_alert_status(
        &self,
        id: &AlertId,
        status: AlertStatus,
    ) -> Result<ApiResponse<AlertRecord>, FetchError> {
        let path = format!("/admin/alerts/{id}/status");
        self.send_json(
            reqwest::Method::PATCH,
            &path,
            &serde_json::json!({ "status": status }),
        )
        .await
    }

    async fn send_broadcast(
        &self,
        draft: &BroadcastDraft,
    ) -> Result<ApiResponse<Broadcast>, FetchError> {
        self.send_json(reqwest::Method::POST, "/admin/broadcasts", draft)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let api = HttpDashboardApi::new(HttpApiConfig::new("http://localhost:5000/api/")).unwrap();
        assert_eq!(api.url("/admin/tourists"), "http://localhost:5000/api/admin/tourists");
    }

    #[test]
    fn config_debug_hides_token() {
        let config = HttpApiConfig::new("http://localhost")
            .with_auth_token(Secret::new("super-secret".to_string()));
        assert!(!format!("{config:?}").contains("super-secret"));
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_network_error() {
        let api = HttpDashboardApi::new(
            HttpApiConfig::new("http://127.0.0.1:1").with_timeout(Duration::from_secs(2)),
        )
        .unwrap();

        let err = api.fetch_tourists().await.unwrap_err();
        assert!(matches!(err, FetchError::Network(_) | FetchError::Timeout { .. }));
    }
}
