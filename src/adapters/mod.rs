//! Adapters - Implementations of port interfaces.
//!
//! - `rest` - Dashboard REST client (reqwest) and in-memory backend
//! - `websocket` - Push transport (tokio-tungstenite) and in-memory double

pub mod rest;
pub mod websocket;

pub use rest::{HttpApiConfig, HttpDashboardApi, InMemoryDashboardApi};
pub use websocket::{InMemoryTransport, ServerEnd, TungsteniteTransport};
