//! REST adapters for the dashboard backend.

mod http_api;
mod in_memory;

pub use http_api::{HttpApiConfig, HttpDashboardApi};
pub use in_memory::InMemoryDashboardApi;
