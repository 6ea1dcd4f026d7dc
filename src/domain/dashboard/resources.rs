//! Resource snapshots as returned by the dashboard REST API.

use serde::{Deserialize, Serialize};

use crate::domain::events::{AlertKind, StatsPatch};
use crate::domain::foundation::{
    AlertId, BroadcastId, GeoPoint, SubjectId, Timestamp, ValidationError, ZoneId,
};

/// A registered tourist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tourist {
    #[serde(alias = "aadhaar_number", alias = "subject_id")]
    pub id: SubjectId,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Position as last reported through REST.
    #[serde(default, alias = "last_location", skip_serializing_if = "Option::is_none")]
    pub last_location: Option<GeoPoint>,
}

/// Tourist roster resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TouristRoster {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub active: Vec<Tourist>,
}

/// Handling status of an alert on the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    #[default]
    Active,
    Acknowledged,
    Resolved,
}

/// An alert row from the REST alert list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertRecord {
    pub id: AlertId,
    #[serde(alias = "aadhaar_number", alias = "subject_id")]
    pub subject_id: SubjectId,
    #[serde(default = "default_alert_kind")]
    pub kind: AlertKind,
    #[serde(default)]
    pub status: AlertStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
    #[serde(default, alias = "location_name", skip_serializing_if = "Option::is_none")]
    pub location_name: Option<String>,
    #[serde(default, alias = "created_at", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
}

fn default_alert_kind() -> AlertKind {
    AlertKind::Sos
}

/// Zone classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZoneType {
    Restricted,
    Caution,
}

/// A geofence polygon. Its violation count is derived at read time from
/// the alert feed, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeofenceZone {
    pub id: ZoneId,
    pub name: String,
    #[serde(rename = "type", alias = "zoneType")]
    pub zone_type: ZoneType,
    /// Vertices as `[lat, lng]` pairs.
    pub polygon: Vec<[f64; 2]>,
}

/// Payload for creating or replacing a geofence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeofenceDraft {
    pub name: String,
    #[serde(rename = "type")]
    pub zone_type: ZoneType,
    pub polygon: Vec<[f64; 2]>,
}

impl GeofenceDraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::empty_field("name"));
        }
        if self.polygon.len() < 3 {
            return Err(ValidationError::invalid_format(
                "polygon",
                format!("needs at least 3 vertices, got {}", self.polygon.len()),
            ));
        }
        if let Some([lat, lng]) = self
            .polygon
            .iter()
            .find(|[lat, lng]| !GeoPoint::new(*lat, *lng).is_valid())
        {
            return Err(ValidationError::invalid_format(
                "polygon",
                format!("vertex out of range: [{lat}, {lng}]"),
            ));
        }
        Ok(())
    }
}

/// Delivery priority of a broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BroadcastPriority {
    Low,
    #[default]
    Normal,
    High,
    Emergency,
}

/// A message previously sent to tourists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Broadcast {
    pub id: BroadcastId,
    pub message: String,
    #[serde(default)]
    pub priority: BroadcastPriority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_zone: Option<ZoneId>,
    #[serde(default, alias = "sent_at", skip_serializing_if = "Option::is_none")]
    pub sent_at: Option<Timestamp>,
    #[serde(default)]
    pub recipients: u64,
}

/// Payload for sending a broadcast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastDraft {
    pub message: String,
    #[serde(default)]
    pub priority: BroadcastPriority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_zone: Option<ZoneId>,
}

impl BroadcastDraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.message.trim().is_empty() {
            return Err(ValidationError::empty_field("message"));
        }
        Ok(())
    }
}

/// One aggregated density cell from the REST heatmap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeatmapPoint {
    #[serde(alias = "latitude")]
    pub lat: f64,
    #[serde(alias = "longitude")]
    pub lng: f64,
    #[serde(default = "default_count")]
    pub count: u64,
}

fn default_count() -> u64 {
    1
}

/// Tagged union of every resource body, used to route a completed fetch
/// to its cache entry.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourcePayload {
    /// Stats are merged into the cached counters, never swapped in whole.
    DashboardStats(StatsPatch),
    Tourists(TouristRoster),
    SosAlerts(Vec<AlertRecord>),
    Geofences(Vec<GeofenceZone>),
    BroadcastHistory(Vec<Broadcast>),
    HeatmapData(Vec<HeatmapPoint>),
}

impl ResourcePayload {
    pub fn kind(&self) -> super::ResourceKind {
        use super::ResourceKind;
        match self {
            ResourcePayload::DashboardStats(_) => ResourceKind::DashboardStats,
            ResourcePayload::Tourists(_) => ResourceKind::Tourists,
            ResourcePayload::SosAlerts(_) => ResourceKind::SosAlerts,
            ResourcePayload::Geofences(_) => ResourceKind::Geofences,
            ResourcePayload::BroadcastHistory(_) => ResourceKind::BroadcastHistory,
            ResourcePayload::HeatmapData(_) => ResourceKind::HeatmapData,
        }
    }
}
