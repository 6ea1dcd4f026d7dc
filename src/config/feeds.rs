//! Bounded feed capacities

use serde::Deserialize;

use crate::domain::dashboard::FeedCapacities;

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    #[serde(default = "default_alert_capacity")]
    pub alert_capacity: usize,

    #[serde(default = "default_sos_capacity")]
    pub sos_capacity: usize,

    #[serde(default = "default_geofence_capacity")]
    pub geofence_capacity: usize,

    #[serde(default = "default_unclassified_capacity")]
    pub unclassified_capacity: usize,
}

impl FeedConfig {
    pub fn capacities(&self) -> FeedCapacities {
        FeedCapacities {
            alerts: self.alert_capacity,
            sos: self.sos_capacity,
            geofence: self.geofence_capacity,
            unclassified: self.unclassified_capacity,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let capacities = [
            ("alert_capacity", self.alert_capacity),
            ("sos_capacity", self.sos_capacity),
            ("geofence_capacity", self.geofence_capacity),
            ("unclassified_capacity", self.unclassified_capacity),
        ];
        match capacities.iter().find(|(_, capacity)| *capacity == 0) {
            Some((name, _)) => Err(ValidationError::InvalidFeedCapacity(*name)),
            None => Ok(()),
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        let defaults = FeedCapacities::default();
        Self {
            alert_capacity: defaults.alerts,
            sos_capacity: defaults.sos,
            geofence_capacity: defaults.geofence,
            unclassified_capacity: defaults.unclassified,
        }
    }
}

fn default_alert_capacity() -> usize {
    FeedCapacities::default().alerts
}

fn default_sos_capacity() -> usize {
    FeedCapacities::default().sos
}

fn default_geofence_capacity() -> usize {
    FeedCapacities::default().geofence
}

fn default_unclassified_capacity() -> usize {
    FeedCapacities::default().unclassified
}
