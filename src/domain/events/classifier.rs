//! Classification of inbound envelopes into typed dashboard events.
//!
//! Rules are evaluated in the fixed order of [`CLASSIFICATION_ORDER`];
//! the first rule whose predicate matches decides the event. A matching
//! rule whose payload cannot be decoded produces `Unclassified` rather
//! than falling through, so one envelope is never counted twice.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::domain::foundation::Timestamp;

use super::alert::{Alert, AlertKind};
use super::envelope::{
    Envelope, CONNECTION_CONFIRMED, DASHBOARD_STATS, DASHBOARD_UPDATE, TOURIST_UPDATE,
};
use super::location::LocationUpdate;
use super::stats::StatsPatch;
use super::wire::{has_any, LAT_KEYS, LNG_KEYS, SUBJECT_KEYS};

/// The result of classifying one envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedEvent {
    Alert(Alert),
    LocationUpdate(LocationUpdate),
    StatsSnapshot(StatsPatch),
    Ack { message: Option<String> },
    Unclassified(UnclassifiedEvent),
}

impl TypedEvent {
    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            TypedEvent::Alert(a) if a.kind == AlertKind::Sos => "sos_alert",
            TypedEvent::Alert(_) => "geofence_breach",
            TypedEvent::LocationUpdate(_) => "location_update",
            TypedEvent::StatsSnapshot(_) => "stats_snapshot",
            TypedEvent::Ack { .. } => "ack",
            TypedEvent::Unclassified(_) => "unclassified",
        }
    }
}

/// An envelope no rule could turn into a typed event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnclassifiedEvent {
    pub event_type: String,
    pub reason: String,
    pub data: Map<String, Value>,
    pub received_at: Timestamp,
}

/// One classification predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassificationRule {
    SosAlert,
    GeofenceBreach,
    DashboardLocation,
    TouristLocation,
    StatsSnapshot,
    ConnectionConfirmed,
}

/// Evaluation order. SOS must precede breach so a malformed payload
/// carrying both markers yields a single SOS alert.
pub const CLASSIFICATION_ORDER: [ClassificationRule; 6] = [
    ClassificationRule::SosAlert,
    ClassificationRule::GeofenceBreach,
    ClassificationRule::DashboardLocation,
    ClassificationRule::TouristLocation,
    ClassificationRule::StatsSnapshot,
    ClassificationRule::ConnectionConfirmed,
];

fn has_location_shape(data: &Map<String, Value>) -> bool {
    has_any(data, SUBJECT_KEYS) && has_any(data, LAT_KEYS) && has_any(data, LNG_KEYS)
}

impl ClassificationRule {
    pub fn matches(&self, envelope: &Envelope) -> bool {
        match self {
            ClassificationRule::SosAlert => {
                envelope.is_type(DASHBOARD_UPDATE) && envelope.data_str("type") == Some("SOS")
            }
            ClassificationRule::GeofenceBreach => {
                envelope.is_type(DASHBOARD_UPDATE)
                    && envelope.data_bool("geofence_breached") == Some(true)
            }
            ClassificationRule::DashboardLocation => {
                envelope.is_type(DASHBOARD_UPDATE) && has_location_shape(&envelope.data)
            }
            ClassificationRule::TouristLocation => {
                envelope.is_type(TOURIST_UPDATE) && has_location_shape(&envelope.data)
            }
            ClassificationRule::StatsSnapshot => envelope.is_type(DASHBOARD_STATS),
            ClassificationRule::ConnectionConfirmed => envelope.is_type(CONNECTION_CONFIRMED),
        }
    }

    fn build(&self, envelope: &Envelope, received_at: Timestamp) -> Result<TypedEvent, String> {
        match self {
            ClassificationRule::SosAlert => {
                Alert::from_payload(AlertKind::Sos, &envelope.data, envelope.timestamp, received_at)
                    .map(TypedEvent::Alert)
            }
            ClassificationRule::GeofenceBreach => Alert::from_payload(
                AlertKind::GeofenceBreach,
                &envelope.data,
                envelope.timestamp,
                received_at,
            )
            .map(TypedEvent::Alert),
            ClassificationRule::DashboardLocation | ClassificationRule::TouristLocation => {
                LocationUpdate::from_payload(&envelope.data, envelope.timestamp)
                    .map(TypedEvent::LocationUpdate)
            }
            ClassificationRule::StatsSnapshot => Ok(TypedEvent::StatsSnapshot(
                StatsPatch::from_payload(&envelope.data),
            )),
            ClassificationRule::ConnectionConfirmed => Ok(TypedEvent::Ack {
                message: envelope.data_str("message").map(str::to_string),
            }),
        }
    }
}

/// Classifies an envelope received now.
pub fn classify(envelope: &Envelope) -> TypedEvent {
    classify_at(envelope, Timestamp::now())
}

/// Classifies an envelope with an explicit arrival time.
pub fn classify_at(envelope: &Envelope, received_at: Timestamp) -> TypedEvent {
    let unclassified = |reason: String| {
        TypedEvent::Unclassified(UnclassifiedEvent {
            event_type: envelope.event_type.clone(),
            reason,
            data: envelope.data.clone(),
            received_at,
        })
    };

    match CLASSIFICATION_ORDER.iter().find(|rule| rule.matches(envelope)) {
        Some(rule) => rule
            .build(envelope, received_at)
            .unwrap_or_else(unclassified),
        None if envelope.is_type(DASHBOARD_UPDATE) || envelope.is_type(TOURIST_UPDATE) => {
            unclassified("unrecognized payload shape".to_string())
        }
        None => unclassified(format!("unrecognized envelope type '{}'", envelope.event_type)),
    }
}
