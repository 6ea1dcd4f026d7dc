//! Push connection lifecycle: status enum, backoff policy, and the
//! transition machine driven by `application::ConnectionManager`.

mod backoff;
mod errors;
mod machine;
mod state;

pub use backoff::{ReconnectPolicy, DEFAULT_MAX_ATTEMPTS};
pub use errors::TransportError;
pub use machine::{
    ConnectionAction, ConnectionMachine, PendingReconnect, ABNORMAL_CLOSURE, NORMAL_CLOSURE,
};
pub use state::ConnectionState;
