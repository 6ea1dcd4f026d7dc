//! Alert records produced from push payloads.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::foundation::{AlertId, GeoPoint, SubjectId, Timestamp, ZoneId};

use super::location::read_location;
use super::wire;

/// What raised the alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertKind {
    Sos,
    GeofenceBreach,
}

impl AlertKind {
    /// SOS is always high, a zone breach medium.
    pub fn severity(&self) -> Severity {
        match self {
            AlertKind::Sos => Severity::High,
            AlertKind::GeofenceBreach => Severity::Medium,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
}

/// An emergency or zone alert as kept in the live feeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: AlertId,
    pub kind: AlertKind,
    pub subject_id: SubjectId,
    pub location: GeoPoint,
    /// Device-reported time; not used for ordering.
    pub timestamp: Timestamp,
    pub severity: Severity,
    pub location_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_id: Option<ZoneId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_name: Option<String>,
    /// Local arrival time; feeds are ordered by this.
    pub received_at: Timestamp,
}

impl Alert {
    /// Decodes an SOS or breach payload.
    ///
    /// Each field is read under every spelling the backend uses, so a
    /// payload carrying both `latitude` and `lat` is accepted.
    /// `fallback_time` (the envelope timestamp) stands in for a missing or
    /// unreadable payload time; `received_at` is the local arrival time.
    pub fn from_payload(
        kind: AlertKind,
        data: &Map<String, Value>,
        fallback_time: Timestamp,
        received_at: Timestamp,
    ) -> Result<Self, String> {
        let subject = wire::first_readable(data, wire::SUBJECT_KEYS, wire::text_or_number)
            .ok_or_else(|| format!("{kind:?} payload has no subject id"))?;
        let location = read_location(data)?;

        let zone_id = match kind {
            AlertKind::GeofenceBreach => {
                wire::first_readable(data, wire::ZONE_ID_KEYS, wire::text_or_number)
                    .map(ZoneId::new)
            }
            AlertKind::Sos => None,
        };

        Ok(Self {
            id: wire::first_readable(data, wire::ALERT_ID_KEYS, wire::text_or_number)
                .map(AlertId::new)
                .unwrap_or_else(AlertId::generate),
            kind,
            subject_id: SubjectId::new(subject),
            location,
            timestamp: wire::first_readable(data, wire::TIMESTAMP_KEYS, Timestamp::from_wire)
                .unwrap_or(fallback_time),
            severity: kind.severity(),
            location_name: wire::first_readable(data, wire::LOCATION_NAME_KEYS, wire::text)
                .unwrap_or_else(|| location.label()),
            zone_id,
            zone_name: wire::first_readable(data, wire::ZONE_NAME_KEYS, wire::text),
            received_at,
        })
    }

    pub fn is_breach_of(&self, zone_id: &ZoneId) -> bool {
        self.kind == AlertKind::GeofenceBreach && self.zone_id.as_ref() == Some(zone_id)
    }
}
