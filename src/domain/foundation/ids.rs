//! Strongly-typed identifier value objects.
//!
//! Backend identifiers are opaque strings (subject ids are national id
//! numbers, zone ids are database keys), so the newtypes wrap `String`
//! rather than `Uuid`. Locally minted alert ids use UUID v4 text.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps an existing identifier.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Returns the identifier text.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(
    /// Identifier of a monitored tourist.
    SubjectId
);

string_id!(
    /// Identifier of a geofence zone.
    ZoneId
);

string_id!(
    /// Identifier of an alert record.
    AlertId
);

string_id!(
    /// Identifier of a broadcast message.
    BroadcastId
);

impl AlertId {
    /// Mints a fresh identifier for alerts that arrive without one.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}
