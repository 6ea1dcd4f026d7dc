//! Dashboard headline counters and partial patches of them.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::wire;

/// Counter keys in snake and camel spelling; snake wins when both appear.
const COUNTER_KEYS: [[&str; 2]; 6] = [
    ["total_tourists", "totalTourists"],
    ["active_tourists", "activeTourists"],
    ["sos_alerts", "sosAlerts"],
    ["geofence_violations", "geofenceViolations"],
    ["active_geofences", "activeGeofences"],
    ["broadcasts_sent", "broadcastsSent"],
];

/// Headline counters shown on the dashboard overview.
///
/// Keys the backend sends that are not modelled here are kept in `extra`
/// so a shallow merge never drops them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "StatsPatch")]
pub struct DashboardStats {
    pub total_tourists: u64,
    pub active_tourists: u64,
    pub sos_alerts: u64,
    pub geofence_violations: u64,
    pub active_geofences: u64,
    pub broadcasts_sent: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A partial stats update: only present keys are applied.
///
/// Push frames and REST snapshots both decode into this shape. Counters
/// accept any non-negative number; an unreadable counter is treated as
/// absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_tourists: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_tourists: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sos_alerts: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geofence_violations: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_geofences: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub broadcasts_sent: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StatsPatch {
    pub fn from_payload(data: &Map<String, Value>) -> Self {
        let counter = |[snake, camel]: [&str; 2]| {
            wire::first_readable(data, &[snake, camel], wire::count)
        };
        let is_counter = |key: &str| COUNTER_KEYS.iter().flatten().any(|k| *k == key);

        Self {
            total_tourists: counter(COUNTER_KEYS[0]),
            active_tourists: counter(COUNTER_KEYS[1]),
            sos_alerts: counter(COUNTER_KEYS[2]),
            geofence_violations: counter(COUNTER_KEYS[3]),
            active_geofences: counter(COUNTER_KEYS[4]),
            broadcasts_sent: counter(COUNTER_KEYS[5]),
            extra: data
                .iter()
                .filter(|(key, _)| !is_counter(key.as_str()))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_tourists.is_none()
            && self.active_tourists.is_none()
            && self.sos_alerts.is_none()
            && self.geofence_violations.is_none()
            && self.active_geofences.is_none()
            && self.broadcasts_sent.is_none()
            && self.extra.is_empty()
    }
}

impl<'de> Deserialize<'de> for StatsPatch {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Map::<String, Value>::deserialize(deserializer).map(|data| Self::from_payload(&data))
    }
}

/// A patch that sets every counter and extra key of `stats`.
impl From<&DashboardStats> for StatsPatch {
    fn from(stats: &DashboardStats) -> Self {
        Self {
            total_tourists: Some(stats.total_tourists),
            active_tourists: Some(stats.active_tourists),
            sos_alerts: Some(stats.sos_alerts),
            geofence_violations: Some(stats.geofence_violations),
            active_geofences: Some(stats.active_geofences),
            broadcasts_sent: Some(stats.broadcasts_sent),
            extra: stats.extra.clone(),
        }
    }
}

impl From<StatsPatch> for DashboardStats {
    fn from(patch: StatsPatch) -> Self {
        let mut stats = Self::default();
        stats.apply_patch(&patch);
        stats
    }
}

impl DashboardStats {
    /// Shallow merge: overwrite exactly the keys present in `patch`.
    pub fn apply_patch(&mut self, patch: &StatsPatch) {
        fn set(field: &mut u64, value: Option<u64>) {
            if let Some(v) = value {
                *field = v;
            }
        }

        set(&mut self.total_tourists, patch.total_tourists);
        set(&mut self.active_tourists, patch.active_tourists);
        set(&mut self.sos_alerts, patch.sos_alerts);
        set(&mut self.geofence_violations, patch.geofence_violations);
        set(&mut self.active_geofences, patch.active_geofences);
        set(&mut self.broadcasts_sent, patch.broadcasts_sent);

        for (key, value) in &patch.extra {
            self.extra.insert(key.clone(), value.clone());
        }
    }

    /// Copy of `self` with `patch` applied.
    pub fn merged(&self, patch: &StatsPatch) -> Self {
        let mut stats = self.clone();
        stats.apply_patch(patch);
        stats
    }

    /// Local bump on SOS arrival; the next snapshot overwrites it.
    pub fn record_optimistic_sos(&mut self) {
        self.sos_alerts = self.sos_alerts.saturating_add(1);
    }
}
