//! Application layer - drivers and command handlers.
//!
//! Orchestrates the domain against the ports: the connection manager owns
//! the push channel, the refresher and scheduler keep the REST-backed
//! resources current, and the handlers run operator writes.

pub mod connection_manager;
pub mod handlers;
pub mod refresh_scheduler;
pub mod resource_refresher;
pub mod sync_session;

use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::dashboard::DashboardState;

/// The single dashboard state shared by every driver of a session.
pub type SharedDashboard = Arc<RwLock<DashboardState>>;

pub use connection_manager::{ConnectionManager, ConnectionSettings, ConnectionStatus};
pub use handlers::{
    CommandError, CreateGeofenceCommand, CreateGeofenceHandler, SendBroadcastCommand,
    SendBroadcastHandler, UpdateAlertStatusCommand, UpdateAlertStatusHandler,
    UpdateGeofenceCommand, UpdateGeofenceHandler,
};
pub use refresh_scheduler::{kinds_for, RefreshScheduler};
pub use resource_refresher::{fetch_resource, RefreshReport, ResourceRefresher};
pub use sync_session::{DebugSnapshot, SessionSettings, SyncSession};
