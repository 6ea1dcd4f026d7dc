//! Connection lifecycle status.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::StateMachine;

/// Status of the push connection as seen by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    /// Terminal until a manual reconnect.
    Error,
}

impl ConnectionState {
    /// True while a transport handle exists (opening or open).
    pub fn has_live_handle(&self) -> bool {
        matches!(self, ConnectionState::Connecting | ConnectionState::Connected)
    }

    pub fn is_connected(&self) -> bool {
        *self == ConnectionState::Connected
    }
}

impl StateMachine for ConnectionState {
    fn can_transition_to(&self, target: &Self) -> bool {
        use ConnectionState::*;
        matches!(
            (self, target),
            (Disconnected, Connecting)
                | (Connecting, Connected)
                | (Connecting, Disconnected)
                | (Connecting, Error)
                | (Connected, Disconnected)
                | (Connected, Error)
                | (Disconnected, Error)
                | (Error, Connecting)
                | (Error, Disconnected)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use ConnectionState::*;
        match self {
            Disconnected => vec![Connecting, Error],
            Connecting => vec![Connected, Disconnected, Error],
            Connected => vec![Disconnected, Error],
            Error => vec![Connecting, Disconnected],
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Error => "error",
        };
        f.write_str(s)
    }
}
