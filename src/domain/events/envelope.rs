//! The uniform `{type, data, timestamp}` wrapper for push frames.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::foundation::Timestamp;

use super::errors::MalformedEventError;

/// Inbound: alert or location payloads.
pub const DASHBOARD_UPDATE: &str = "dashboard_update";
/// Inbound: partial stats counters.
pub const DASHBOARD_STATS: &str = "dashboard_stats";
/// Inbound: per-tourist location ping.
pub const TOURIST_UPDATE: &str = "tourist_update";
/// Inbound: server acknowledgement of `connection_init`.
pub const CONNECTION_CONFIRMED: &str = "connection_confirmed";
/// Outbound: first frame on every fresh connection.
pub const CONNECTION_INIT: &str = "connection_init";

/// A push frame in either direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub data: Map<String, Value>,
    #[serde(default = "Timestamp::now")]
    pub timestamp: Timestamp,
}

/// Shape used only to decode, so that a `null` or missing `data` is
/// accepted while arrays and scalars are rejected with a clear message.
/// An unreadable `timestamp` is replaced by the arrival time.
#[derive(Deserialize)]
struct RawEnvelope {
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default)]
    data: Value,
    #[serde(default)]
    timestamp: Value,
}

impl Envelope {
    /// Builds an envelope stamped with the current time.
    pub fn new(event_type: impl Into<String>, data: Map<String, Value>) -> Self {
        Self {
            event_type: event_type.into(),
            data,
            timestamp: Timestamp::now(),
        }
    }

    /// The handshake frame sent on every successful open.
    pub fn connection_init() -> Self {
        let mut data = Map::new();
        data.insert("client_type".into(), Value::from("admin_dashboard"));
        data.insert("version".into(), Value::from(env!("CARGO_PKG_VERSION")));
        Self::new(CONNECTION_INIT, data)
    }

    /// Decodes a UTF-8 JSON text frame.
    pub fn parse(text: &str) -> Result<Self, MalformedEventError> {
        let raw: RawEnvelope = serde_json::from_str(text)
            .map_err(|e| MalformedEventError::InvalidJson(e.to_string()))?;

        let data = match raw.data {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            Value::Array(_) => return Err(MalformedEventError::NonObjectData("array")),
            Value::String(_) => return Err(MalformedEventError::NonObjectData("string")),
            Value::Number(_) => return Err(MalformedEventError::NonObjectData("number")),
            Value::Bool(_) => return Err(MalformedEventError::NonObjectData("boolean")),
        };

        Ok(Self {
            event_type: raw.event_type,
            data,
            timestamp: Timestamp::from_wire(&raw.timestamp).unwrap_or_else(Timestamp::now),
        })
    }

    /// Encodes as a JSON text frame.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn is_type(&self, event_type: &str) -> bool {
        self.event_type == event_type
    }

    /// Reads a string field from `data`.
    pub fn data_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }

    /// Reads a boolean field from `data`.
    pub fn data_bool(&self, key: &str) -> Option<bool> {
        self.data.get(key).and_then(Value::as_bool)
    }
}
