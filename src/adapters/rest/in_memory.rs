//! In-memory [`DashboardApi`] for tests.
//!
//! Holds one snapshot per resource. Fetches can be made to fail, be
//! rejected by the "server", or take a fixed time (use with
//! `tokio::time::pause`). Write operations update the held snapshots so
//! a following refresh observes them.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::domain::dashboard::{
    AlertRecord, AlertStatus, Broadcast, BroadcastDraft, FetchError, GeofenceDraft, GeofenceZone,
    HeatmapPoint, ResourceKind, TouristRoster,
};
use crate::domain::events::{DashboardStats, StatsPatch};
use crate::domain::foundation::{AlertId, BroadcastId, Timestamp, ZoneId};
use crate::ports::{ApiResponse, DashboardApi};

#[derive(Default)]
struct Inner {
    stats: DashboardStats,
    roster: TouristRoster,
    sos_alerts: Vec<AlertRecord>,
    geofences: Vec<GeofenceZone>,
    broadcasts: Vec<Broadcast>,
    heatmap: Vec<HeatmapPoint>,

    failures: HashMap<ResourceKind, FetchError>,
    rejections: HashMap<ResourceKind, String>,
    delays: HashMap<ResourceKind, Duration>,
    calls: HashMap<ResourceKind, usize>,
    write_failure: Option<FetchError>,
    writes: Vec<String>,
    next_id: u64,
}

/// Scriptable dashboard backend.
#[derive(Clone, Default)]
pub struct InMemoryDashboardApi {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryDashboardApi {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // === Seeding ===

    pub fn set_stats(&self, stats: DashboardStats) {
        self.lock().stats = stats;
    }

    pub fn set_roster(&self, roster: TouristRoster) {
        self.lock().roster = roster;
    }

    pub fn set_sos_alerts(&self, alerts: Vec<AlertRecord>) {
        self.lock().sos_alerts = alerts;
    }

    pub fn set_geofences(&self, zones: Vec<GeofenceZone>) {
        self.lock().geofences = zones;
    }

    pub fn set_broadcasts(&self, broadcasts: Vec<Broadcast>) {
        self.lock().broadcasts = broadcasts;
    }

    pub fn set_heatmap(&self, points: Vec<HeatmapPoint>) {
        self.lock().heatmap = points;
    }

    // === Failure scripting ===

    /// Makes every fetch of `kind` fail at the transport level.
    pub fn fail(&self, kind: ResourceKind, error: FetchError) {
        self.lock().failures.insert(kind, error);
    }

    /// Makes every fetch of `kind` answer `success: false`.
    pub fn reject(&self, kind: ResourceKind, message: impl Into<String>) {
        self.lock().rejections.insert(kind, message.into());
    }

    pub fn recover(&self, kind: ResourceKind) {
        let mut inner = self.lock();
        inner.failures.remove(&kind);
        inner.rejections.remove(&kind);
    }

    pub fn delay(&self, kind: ResourceKind, delay: Duration) {
        self.lock().delays.insert(kind, delay);
    }

    pub fn fail_writes(&self, error: Option<FetchError>) {
        self.lock().write_failure = error;
    }

    // === Assertions ===

    pub fn calls(&self, kind: ResourceKind) -> usize {
        self.lock().calls.get(&kind).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.lock().calls.values().sum()
    }

    /// Names of the write operations received, in order.
    pub fn writes(&self) -> Vec<String> {
        self.lock().writes.clone()
    }

    async fn fetch<T>(
        &self,
        kind: ResourceKind,
        pick: impl FnOnce(&Inner) -> T + Send,
    ) -> Result<ApiResponse<T>, FetchError> {
        let (outcome, delay) = {
            let mut inner = self.lock();
            *inner.calls.entry(kind).or_insert(0) += 1;
            let delay = inner.delays.get(&kind).copied();
            let outcome = if let Some(error) = inner.failures.get(&kind) {
                Err(error.clone())
            } else if let Some(message) = inner.rejections.get(&kind) {
                Ok(ApiResponse::failure(message.clone()))
            } else {
                Ok(ApiResponse::ok(pick(&inner)))
            };
            (outcome, delay)
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        outcome
    }

    fn begin_write(&self, name: &str) -> Result<MutexGuard<'_, Inner>, FetchError> {
        let mut inner = self.lock();
        inner.writes.push(name.to_string());
        match inner.write_failure.clone() {
            Some(error) => Err(error),
            None => {
                inner.next_id += 1;
                Ok(inner)
            }
        }
    }
}

#[async_trait]
impl DashboardApi for InMemoryDashboardApi {
    async fn fetch_dashboard_stats(&self) -> Result<ApiResponse<StatsPatch>, FetchError> {
        self.fetch(ResourceKind::DashboardStats, |s| StatsPatch::from(&s.stats))
            .await
    }

    async fn fetch_tourists(&self) -> Result<ApiResponse<TouristRoster>, FetchError> {
        self.fetch(ResourceKind::Tourists, |s| s.roster.clone()).await
    }

    async fn fetch_sos_alerts(&self) -> Result<ApiResponse<Vec<AlertRecord>>, FetchError> {
        self.fetch(ResourceKind::SosAlerts, |s| s.sos_alerts.clone())
            .await
    }

    async fn fetch_geofences(&self) -> Result<ApiResponse<Vec<GeofenceZone>>, FetchError> {
        self.fetch(ResourceKind::Geofences, |s| s.geofences.clone())
            .await
    }

    async fn fetch_broadcast_history(&self) -> Result<ApiResponse<Vec<Broadcast>>, FetchError> {
        self.fetch(ResourceKind::BroadcastHistory, |s| s.broadcasts.clone())
            .await
    }

    async fn fetch_heatmap_data(&self) -> Result<ApiResponse<Vec<HeatmapPoint>>, FetchError> {
        self.fetch(ResourceKind::HeatmapData, |s| s.heatmap.clone())
            .await
    }

    async fn create_geofence(
        &self,
        draft: &GeofenceDraft,
    ) -> Result<ApiResponse<GeofenceZone>, FetchError> {
        let mut inner = self.begin_write("create_geofence")?;
        let zone = GeofenceZone {
            id: ZoneId::new(format!("zone-{}", inner.next_id)),
            name: draft.name.clone(),
            zone_type: draft.zone_type,
            polygon: draft.polygon.clone(),
        };
        inner.geofences.push(zone.clone());
        inner.stats.active_geofences = inner.geofences.len() as u64;
        Ok(ApiResponse::ok(zone))
    }

    async fn update_geofence(
        &self,
        id: &ZoneId,
        draft: &GeofenceDraft,
    ) -> Result<ApiResponse<GeofenceZone>, FetchError> {
        let mut inner = self.begin_write("update_geofence")?;
        match inner.geofences.iter_mut().find(|z| &z.id == id) {
            Some(zone) => {
                zone.name = draft.name.clone();
                zone.zone_type = draft.zone_type;
                zone.polygon = draft.polygon.clone();
                Ok(ApiResponse::ok(zone.clone()))
            }
            None => Ok(ApiResponse::failure(format!("geofence {id} not found"))),
        }
    }

    async fn update_alert_status(
        &self,
        id: &AlertId,
        status: AlertStatus,
    ) -> Result<ApiResponse<AlertRecord>, FetchError> {
        let mut inner = self.begin_write("update_alert_status")?;
        match inner.sos_alerts.iter_mut().find(|a| &a.id == id) {
            Some(alert) => {
                alert.status = status;
                Ok(ApiResponse::ok(alert.clone()))
            }
            None => Ok(ApiResponse::failure(format!("alert {id} not found"))),
        }
    }

    async fn send_broadcast(
        &self,
        draft: &BroadcastDraft,
    ) -> Result<ApiResponse<Broadcast>, FetchError> {
        let mut inner = self.begin_write("send_broadcast")?;
        let broadcast = Broadcast {
            id: BroadcastId::new(format!("bc-{}", inner.next_id)),
            message: draft.message.clone(),
            priority: draft.priority,
            target_zone: draft.target_zone.clone(),
            sent_at: Some(Timestamp::now()),
            recipients: inner.roster.active.len() as u64,
        };
        inner.broadcasts.insert(0, broadcast.clone());
        inner.stats.broadcasts_sent += 1;
        Ok(ApiResponse::ok(broadcast))
    }
}
