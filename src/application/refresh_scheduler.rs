//! RefreshScheduler - periodic REST polling sized to push health.
//!
//! While the push channel is connected only the headline stats are
//! polled; otherwise the scheduler also polls the tourist roster and the
//! SOS list so the dashboard stays usable without push.
//!
//! Exactly one timer task exists at a time. It is (re)started only by
//! `enable()` and stopped by `disable()` or `shutdown()`.

use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::domain::connection::ConnectionState;
use crate::domain::dashboard::ResourceKind;

use super::connection_manager::ConnectionStatus;
use super::resource_refresher::ResourceRefresher;

/// Resources to poll for the current connection state.
pub fn kinds_for(state: ConnectionState) -> &'static [ResourceKind] {
    if state.is_connected() {
        &ResourceKind::CONNECTED_SET
    } else {
        &ResourceKind::DEGRADED_SET
    }
}

pub struct RefreshScheduler {
    refresher: ResourceRefresher,
    connection: watch::Receiver<ConnectionStatus>,
    interval: Duration,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl RefreshScheduler {
    pub fn new(
        refresher: ResourceRefresher,
        connection: watch::Receiver<ConnectionStatus>,
        interval: Duration,
    ) -> Self {
        Self {
            refresher,
            connection,
            interval,
            timer: Mutex::new(None),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Starts the tick loop, replacing any running one. The first tick
    /// fires one interval from now.
    pub async fn enable(&self) {
        let mut timer = self.timer.lock().await;
        if let Some(previous) = timer.take() {
            previous.abort();
        }

        let refresher = self.refresher.clone();
        let connection = self.connection.clone();
        let period = self.interval;

        *timer = Some(tokio::spawn(async move {
            let mut ticker = time::interval_at(time::Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let state = connection.borrow().state;
                let kinds = kinds_for(state);
                tracing::debug!(%state, resources = kinds.len(), "scheduled refresh");
                refresher.refresh_selective(kinds).await;
            }
        }));
        tracing::info!(interval_secs = period.as_secs(), "refresh scheduler enabled");
    }

    pub async fn disable(&self) {
        if let Some(timer) = self.timer.lock().await.take() {
            timer.abort();
            tracing::info!("refresh scheduler disabled");
        }
    }

    pub async fn is_enabled(&self) -> bool {
        self.timer
            .lock()
            .await
            .as_ref()
            .is_some_and(|timer| !timer.is_finished())
    }

    pub async fn shutdown(&self) {
        self.disable().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryDashboardApi;
    use crate::application::SharedDashboard;
    use crate::domain::dashboard::DashboardState;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    fn status(state: ConnectionState) -> ConnectionStatus {
        ConnectionStatus {
            state,
            reconnect_attempts: 0,
            next_retry_ms: None,
            last_error: None,
        }
    }

    fn setup(
        state: ConnectionState,
    ) -> (RefreshScheduler, InMemoryDashboardApi, watch::Sender<ConnectionStatus>) {
        let api = InMemoryDashboardApi::new();
        let dashboard: SharedDashboard = Arc::new(RwLock::new(DashboardState::default()));
        let refresher = ResourceRefresher::new(Arc::new(api.clone()), dashboard);
        let (tx, rx) = watch::channel(status(state));
        let scheduler = RefreshScheduler::new(refresher, rx, Duration::from_secs(30));
        (scheduler, api, tx)
    }

    #[test]
    fn degraded_set_when_not_connected() {
        assert_eq!(kinds_for(ConnectionState::Disconnected), &ResourceKind::DEGRADED_SET);
        assert_eq!(kinds_for(ConnectionState::Error), &ResourceKind::DEGRADED_SET);
        assert_eq!(kinds_for(ConnectionState::Connected), &ResourceKind::CONNECTED_SET);
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_follow_connection_state() {
        let (scheduler, api, tx) = setup(ConnectionState::Disconnected);
        scheduler.enable().await;

        tokio::time::sleep(Duration::from_millis(30_100)).await;
        assert_eq!(api.calls(ResourceKind::Tourists), 1);
        assert_eq!(api.calls(ResourceKind::SosAlerts), 1);
        assert_eq!(api.calls(ResourceKind::DashboardStats), 1);

        tx.send_replace(status(ConnectionState::Connected));
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(api.calls(ResourceKind::DashboardStats), 2);
        assert_eq!(api.calls(ResourceKind::Tourists), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn re_enable_keeps_a_single_timer() {
        let (scheduler, api, _tx) = setup(ConnectionState::Connected);
        scheduler.enable().await;
        scheduler.enable().await;
        scheduler.enable().await;

        tokio::time::sleep(Duration::from_millis(30_100)).await;
        assert_eq!(api.calls(ResourceKind::DashboardStats), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn disable_stops_polling() {
        let (scheduler, api, _tx) = setup(ConnectionState::Connected);
        scheduler.enable().await;
        assert!(scheduler.is_enabled().await);

        scheduler.disable().await;
        assert!(!scheduler.is_enabled().await);

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(api.total_calls(), 0);
    }
}
