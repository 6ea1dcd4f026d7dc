//! Tourist position updates and the per-subject latest-position record.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::foundation::{GeoPoint, SubjectId, Timestamp};

use super::wire;

/// A position ping for one tourist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationUpdate {
    pub subject_id: SubjectId,
    pub location: GeoPoint,
    pub timestamp: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_name: Option<String>,
}

/// Reads and range-checks the coordinate pair of a payload.
pub(super) fn read_location(data: &Map<String, Value>) -> Result<GeoPoint, String> {
    let latitude = wire::first_readable(data, wire::LAT_KEYS, wire::number)
        .ok_or_else(|| "payload has no readable latitude".to_string())?;
    let longitude = wire::first_readable(data, wire::LNG_KEYS, wire::number)
        .ok_or_else(|| "payload has no readable longitude".to_string())?;

    let location = GeoPoint::new(latitude, longitude);
    if !location.is_valid() {
        return Err(format!("coordinates out of range: {latitude}, {longitude}"));
    }
    Ok(location)
}

impl LocationUpdate {
    pub fn from_payload(data: &Map<String, Value>, fallback_time: Timestamp) -> Result<Self, String> {
        let subject = wire::first_readable(data, wire::SUBJECT_KEYS, wire::text_or_number)
            .ok_or_else(|| "location payload has no subject id".to_string())?;

        Ok(Self {
            subject_id: SubjectId::new(subject),
            location: read_location(data)?,
            timestamp: wire::first_readable(data, wire::TIMESTAMP_KEYS, Timestamp::from_wire)
                .unwrap_or(fallback_time),
            location_name: wire::first_readable(data, wire::LOCATION_NAME_KEYS, wire::text),
        })
    }
}

/// Latest known position of one tourist.
///
/// Replaced wholesale by each update for the same subject; fields are
/// never merged individually.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TouristLocationRecord {
    pub location: GeoPoint,
    pub timestamp: Timestamp,
    pub location_name: String,
    pub received_at: Timestamp,
}

impl TouristLocationRecord {
    pub fn from_update(update: &LocationUpdate, received_at: Timestamp) -> Self {
        Self {
            location: update.location,
            timestamp: update.timestamp,
            location_name: update
                .location_name
                .clone()
                .unwrap_or_else(|| update.location.label()),
            received_at,
        }
    }
}
