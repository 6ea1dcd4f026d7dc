//! Push transport adapters.

mod in_memory;
mod tungstenite_transport;

pub use in_memory::{InMemoryTransport, ServerEnd};
pub use tungstenite_transport::TungsteniteTransport;
