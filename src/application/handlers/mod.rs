//! Application handlers.
//!
//! Command handlers for the operator's write operations. Reads go
//! straight to the shared [`DashboardState`](crate::domain::dashboard::DashboardState).

pub mod commands;

pub use commands::{
    CommandError,
    // Geofences
    CreateGeofenceCommand, CreateGeofenceHandler,
    UpdateGeofenceCommand, UpdateGeofenceHandler,
    // Alerts
    UpdateAlertStatusCommand, UpdateAlertStatusHandler,
    // Broadcasts
    SendBroadcastCommand, SendBroadcastHandler,
};
