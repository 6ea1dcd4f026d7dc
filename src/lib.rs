//! Safety Dashboard Sync - real-time synchronization core for the
//! tourist-safety operations dashboard.
//!
//! Keeps a local model of the dashboard consistent with the backend by
//! combining a push channel (websocket events) with periodic REST
//! snapshots, and derives display metrics from that model.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
