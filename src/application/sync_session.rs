//! SyncSession - the injected context that owns one dashboard session.
//!
//! Wires the shared state, the push connection, the REST refresher, the
//! refresh scheduler and the command handlers together. There is no
//! process-wide connection: whoever builds the session owns it and must
//! call [`SyncSession::shutdown`].

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::config::AppConfig;
use crate::domain::dashboard::{DashboardState, FeedCapacities, ResourceKind};
use crate::domain::foundation::Timestamp;
use crate::ports::{DashboardApi, PushTransport};

use super::connection_manager::{ConnectionManager, ConnectionSettings, ConnectionStatus};
use super::handlers::{
    CreateGeofenceHandler, SendBroadcastHandler, UpdateAlertStatusHandler, UpdateGeofenceHandler,
};
use super::refresh_scheduler::RefreshScheduler;
use super::resource_refresher::{RefreshReport, ResourceRefresher};
use super::SharedDashboard;

/// Everything a session needs besides its adapters.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub connection: ConnectionSettings,
    pub refresh_interval: Duration,
    pub scheduler_enabled: bool,
    pub feeds: FeedCapacities,
    pub debug_introspection: bool,
}

impl SessionSettings {
    pub fn new(stream_url: impl Into<String>) -> Self {
        Self {
            connection: ConnectionSettings::new(stream_url),
            refresh_interval: Duration::from_secs(30),
            scheduler_enabled: true,
            feeds: FeedCapacities::default(),
            debug_introspection: false,
        }
    }
}

impl From<&AppConfig> for SessionSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            connection: ConnectionSettings::new(config.stream.url.clone())
                .with_policy(config.stream.reconnect_policy()),
            refresh_interval: config.scheduler.interval(),
            scheduler_enabled: config.scheduler.enabled,
            feeds: config.feeds.capacities(),
            debug_introspection: config.features.debug_introspection,
        }
    }
}

/// Point-in-time view of a session for diagnostics.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugSnapshot {
    pub connection: ConnectionStatus,
    pub scheduler_enabled: bool,
    pub loading: bool,
    pub events_applied: u64,
    pub alert_feed_len: usize,
    pub sos_feed_len: usize,
    pub geofence_feed_len: usize,
    pub unclassified_len: usize,
    pub tracked_locations: usize,
    pub errors: HashMap<ResourceKind, String>,
    pub last_updated: HashMap<ResourceKind, Timestamp>,
}

pub struct SyncSession {
    dashboard: SharedDashboard,
    connection: ConnectionManager,
    refresher: ResourceRefresher,
    scheduler: RefreshScheduler,
    create_geofence: CreateGeofenceHandler,
    update_geofence: UpdateGeofenceHandler,
    update_alert_status: UpdateAlertStatusHandler,
    send_broadcast: SendBroadcastHandler,
    scheduler_enabled: bool,
    debug_introspection: bool,
}

impl SyncSession {
    pub fn new(
        settings: SessionSettings,
        api: Arc<dyn DashboardApi>,
        transport: Arc<dyn PushTransport>,
    ) -> Self {
        let dashboard: SharedDashboard = Arc::new(RwLock::new(DashboardState::new(settings.feeds)));
        let connection = ConnectionManager::new(settings.connection, transport, dashboard.clone());
        let refresher = ResourceRefresher::new(api, dashboard.clone());
        let scheduler = RefreshScheduler::new(
            refresher.clone(),
            connection.subscribe_state(),
            settings.refresh_interval,
        );

        Self {
            create_geofence: CreateGeofenceHandler::new(refresher.clone()),
            update_geofence: UpdateGeofenceHandler::new(refresher.clone()),
            update_alert_status: UpdateAlertStatusHandler::new(refresher.clone()),
            send_broadcast: SendBroadcastHandler::new(refresher.clone()),
            dashboard,
            connection,
            refresher,
            scheduler,
            scheduler_enabled: settings.scheduler_enabled,
            debug_introspection: settings.debug_introspection,
        }
    }

    /// Opens the push channel, loads every resource once and starts the
    /// scheduler.
    pub async fn start(&self) -> RefreshReport {
        self.connection.connect().await;
        let report = self.refresher.refresh_all().await;
        if !report.is_clean() {
            tracing::warn!(failed = report.failed.len(), "initial load incomplete");
        }
        if self.scheduler_enabled {
            self.scheduler.enable().await;
        }
        tracing::info!(stored = report.stored.len(), "sync session started");
        report
    }

    /// Stops the scheduler, closes the connection and disposes the state
    /// so that late fetch completions are discarded.
    pub async fn shutdown(&self) {
        self.scheduler.shutdown().await;
        self.connection.shutdown().await;
        self.dashboard.write().await.dispose();
        tracing::info!("sync session shut down");
    }

    // === Accessors ===

    pub fn dashboard(&self) -> &SharedDashboard {
        &self.dashboard
    }

    pub fn connection(&self) -> &ConnectionManager {
        &self.connection
    }

    pub fn refresher(&self) -> &ResourceRefresher {
        &self.refresher
    }

    pub fn scheduler(&self) -> &RefreshScheduler {
        &self.scheduler
    }

    pub fn create_geofence(&self) -> &CreateGeofenceHandler {
        &self.create_geofence
    }

    pub fn update_geofence(&self) -> &UpdateGeofenceHandler {
        &self.update_geofence
    }

    pub fn update_alert_status(&self) -> &UpdateAlertStatusHandler {
        &self.update_alert_status
    }

    pub fn send_broadcast(&self) -> &SendBroadcastHandler {
        &self.send_broadcast
    }

    /// `None` unless debug introspection is enabled.
    pub async fn debug_snapshot(&self) -> Option<DebugSnapshot> {
        if !self.debug_introspection {
            return None;
        }
        let scheduler_enabled = self.scheduler.is_enabled().await;
        let state = self.dashboard.read().await;
        Some(DebugSnapshot {
            connection: self.connection.status(),
            scheduler_enabled,
            loading: state.global_loading(),
            events_applied: state.events_applied(),
            alert_feed_len: state.alerts().len(),
            sos_feed_len: state.sos_feed().len(),
            geofence_feed_len: state.geofence_feed().len(),
            unclassified_len: state.unclassified().len(),
            tracked_locations: state.locations().len(),
            errors: state.error_map(),
            last_updated: ResourceKind::ALL
                .iter()
                .filter_map(|kind| state.last_updated(*kind).map(|at| (*kind, at)))
                .collect(),
        })
    }
}
