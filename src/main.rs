//! Headless sync client: keeps a dashboard session alive and logs its
//! health until interrupted.

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use safety_dashboard_sync::adapters::{HttpApiConfig, HttpDashboardApi, TungsteniteTransport};
use safety_dashboard_sync::application::{SessionSettings, SyncSession};
use safety_dashboard_sync::config::AppConfig;

const STATUS_LOG_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config);
    config.validate()?;

    let mut http = HttpApiConfig::new(config.api.base_url.clone())
        .with_timeout(config.api.request_timeout());
    if let Some(token) = config.api.auth_token.clone() {
        http = http.with_auth_token(token);
    }
    let api = Arc::new(HttpDashboardApi::new(http)?);
    let transport = Arc::new(TungsteniteTransport::new());

    let session = SyncSession::new(SessionSettings::from(&config), api, transport);
    tracing::info!(
        stream = %config.stream.url,
        api = %config.api.base_url,
        environment = ?config.environment,
        "starting sync session"
    );
    session.start().await;

    let mut status_ticker = tokio::time::interval(STATUS_LOG_INTERVAL);
    status_ticker.tick().await;
    loop {
        tokio::select! {
            _ = status_ticker.tick() => log_status(&session).await,
            result = tokio::signal::ctrl_c() => {
                if let Err(e) = result {
                    tracing::error!(error = %e, "failed to listen for ctrl-c");
                }
                break;
            }
        }
    }

    tracing::info!("shutting down");
    session.shutdown().await;
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let registry = tracing_subscriber::registry().with(filter);

    if config.features.json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn log_status(session: &SyncSession) {
    let status = session.connection().status();
    {
        let state = session.dashboard().read().await;
        let stats = state.stats().data();
        tracing::info!(
            connection = %status.state,
            reconnect_attempts = status.reconnect_attempts,
            tourists = stats.total_tourists,
            active_sos = stats.sos_alerts,
            live_locations = state.locations().len(),
            events_applied = state.events_applied(),
            failing_resources = state.error_map().len(),
            "dashboard status"
        );
    }

    if let Some(snapshot) = session.debug_snapshot().await {
        match serde_json::to_string(&snapshot) {
            Ok(json) => tracing::debug!(snapshot = %json, "debug snapshot"),
            Err(e) => tracing::warn!(error = %e, "failed to encode debug snapshot"),
        }
    }
}
