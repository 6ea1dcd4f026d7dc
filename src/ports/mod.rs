//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `DashboardApi` - REST snapshots and operator write operations
//! - `PushTransport` - Persistent server-push connection

mod dashboard_api;
mod push_transport;

pub use dashboard_api::{ApiResponse, DashboardApi};
pub use push_transport::{OutboundFrame, PushChannel, PushTransport, TransportEvent};
