//! Operator write operations. Each submits to the backend and then
//! refreshes the resources the write affects.

mod create_geofence;
mod errors;
mod send_broadcast;
mod update_alert_status;
mod update_geofence;

pub use create_geofence::{CreateGeofenceCommand, CreateGeofenceHandler};
pub use errors::CommandError;
pub use send_broadcast::{SendBroadcastCommand, SendBroadcastHandler};
pub use update_alert_status::{UpdateAlertStatusCommand, UpdateAlertStatusHandler};
pub use update_geofence::{UpdateGeofenceCommand, UpdateGeofenceHandler};
