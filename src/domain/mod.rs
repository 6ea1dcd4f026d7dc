//! Domain layer: connection lifecycle, event classification, dashboard
//! state and derived metrics. No I/O happens here.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (timestamps, IDs, coordinates, errors)
//! - `connection` - Push connection state machine and backoff policy
//! - `events` - Envelope wire type and the ordered event classifier
//! - `dashboard` - Cached resources, live feeds, reconciliation folds
//! - `metrics` - Violation counts, heatmap styling, map framing

pub mod connection;
pub mod dashboard;
pub mod events;
pub mod foundation;
pub mod metrics;
