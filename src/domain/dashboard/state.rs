//! In-memory dashboard state: REST caches plus push-fed buffers.
//!
//! Consumers get shared references only. Mutation goes through
//! [`DashboardState::begin_refresh`] / [`DashboardState::complete_refresh`]
//! (REST side) and the fold methods in `reconcile` (push side).

use std::collections::HashMap;

use crate::domain::events::{
    Alert, DashboardStats, StatsPatch, TouristLocationRecord, UnclassifiedEvent,
};
use crate::domain::foundation::{SubjectId, Timestamp};

use super::cache::{CachedResource, ResourceKind};
use super::errors::FetchError;
use super::resources::{
    AlertRecord, Broadcast, GeofenceZone, HeatmapPoint, ResourcePayload, TouristRoster,
};
use super::ring_buffer::RingBuffer;

/// Capacities of the bounded feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedCapacities {
    pub alerts: usize,
    pub sos: usize,
    pub geofence: usize,
    pub unclassified: usize,
}

impl Default for FeedCapacities {
    fn default() -> Self {
        Self {
            alerts: 50,
            sos: 20,
            geofence: 20,
            unclassified: 50,
        }
    }
}

/// Whether a completed fetch was stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Stored,
    Failed,
    /// The state was disposed before the fetch settled.
    Discarded,
}

#[derive(Debug)]
pub struct DashboardState {
    pub(super) stats: CachedResource<DashboardStats>,
    pub(super) tourists: CachedResource<TouristRoster>,
    pub(super) sos_alerts: CachedResource<Vec<AlertRecord>>,
    pub(super) geofences: CachedResource<Vec<GeofenceZone>>,
    pub(super) broadcast_history: CachedResource<Vec<Broadcast>>,
    pub(super) heatmap: CachedResource<Vec<HeatmapPoint>>,

    pub(super) alerts: RingBuffer<Alert>,
    pub(super) sos_feed: RingBuffer<Alert>,
    pub(super) geofence_feed: RingBuffer<Alert>,
    pub(super) locations: HashMap<SubjectId, TouristLocationRecord>,
    pub(super) unclassified: RingBuffer<UnclassifiedEvent>,

    pub(super) events_applied: u64,
    pub(super) disposed: bool,
}

impl DashboardState {
    pub fn new(capacities: FeedCapacities) -> Self {
        Self {
            stats: CachedResource::new(),
            tourists: CachedResource::new(),
            sos_alerts: CachedResource::new(),
            geofences: CachedResource::new(),
            broadcast_history: CachedResource::new(),
            heatmap: CachedResource::new(),
            alerts: RingBuffer::new(capacities.alerts),
            sos_feed: RingBuffer::new(capacities.sos),
            geofence_feed: RingBuffer::new(capacities.geofence),
            locations: HashMap::new(),
            unclassified: RingBuffer::new(capacities.unclassified),
            events_applied: 0,
            disposed: false,
        }
    }

    // === Cached resources ===

    pub fn stats(&self) -> &CachedResource<DashboardStats> {
        &self.stats
    }

    pub fn tourists(&self) -> &CachedResource<TouristRoster> {
        &self.tourists
    }

    pub fn sos_alerts(&self) -> &CachedResource<Vec<AlertRecord>> {
        &self.sos_alerts
    }

    pub fn geofences(&self) -> &CachedResource<Vec<GeofenceZone>> {
        &self.geofences
    }

    pub fn broadcast_history(&self) -> &CachedResource<Vec<Broadcast>> {
        &self.broadcast_history
    }

    pub fn heatmap_data(&self) -> &CachedResource<Vec<HeatmapPoint>> {
        &self.heatmap
    }

    // === Push-fed buffers ===

    /// General alert feed, newest first.
    pub fn alerts(&self) -> &RingBuffer<Alert> {
        &self.alerts
    }

    pub fn sos_feed(&self) -> &RingBuffer<Alert> {
        &self.sos_feed
    }

    pub fn geofence_feed(&self) -> &RingBuffer<Alert> {
        &self.geofence_feed
    }

    pub fn locations(&self) -> &HashMap<SubjectId, TouristLocationRecord> {
        &self.locations
    }

    pub fn location_of(&self, subject: &SubjectId) -> Option<&TouristLocationRecord> {
        self.locations.get(subject)
    }

    pub fn unclassified(&self) -> &RingBuffer<UnclassifiedEvent> {
        &self.unclassified
    }

    /// Push events folded since start.
    pub fn events_applied(&self) -> u64 {
        self.events_applied
    }

    // === Loading / errors ===

    /// True while any fetch is outstanding.
    pub fn global_loading(&self) -> bool {
        ResourceKind::ALL
            .iter()
            .any(|kind| self.fetch_in_flight(*kind))
    }

    fn fetch_in_flight(&self, kind: ResourceKind) -> bool {
        match kind {
            ResourceKind::DashboardStats => self.stats.has_fetch_in_flight(),
            ResourceKind::Tourists => self.tourists.has_fetch_in_flight(),
            ResourceKind::SosAlerts => self.sos_alerts.has_fetch_in_flight(),
            ResourceKind::Geofences => self.geofences.has_fetch_in_flight(),
            ResourceKind::BroadcastHistory => self.broadcast_history.has_fetch_in_flight(),
            ResourceKind::HeatmapData => self.heatmap.has_fetch_in_flight(),
        }
    }

    pub fn error_for(&self, kind: ResourceKind) -> Option<&str> {
        match kind {
            ResourceKind::DashboardStats => self.stats.error(),
            ResourceKind::Tourists => self.tourists.error(),
            ResourceKind::SosAlerts => self.sos_alerts.error(),
            ResourceKind::Geofences => self.geofences.error(),
            ResourceKind::BroadcastHistory => self.broadcast_history.error(),
            ResourceKind::HeatmapData => self.heatmap.error(),
        }
    }

    /// Resource key to error text for every failing resource.
    pub fn error_map(&self) -> HashMap<ResourceKind, String> {
        ResourceKind::ALL
            .iter()
            .filter_map(|kind| self.error_for(*kind).map(|e| (*kind, e.to_string())))
            .collect()
    }

    pub fn last_updated(&self, kind: ResourceKind) -> Option<Timestamp> {
        match kind {
            ResourceKind::DashboardStats => self.stats.last_updated(),
            ResourceKind::Tourists => self.tourists.last_updated(),
            ResourceKind::SosAlerts => self.sos_alerts.last_updated(),
            ResourceKind::Geofences => self.geofences.last_updated(),
            ResourceKind::BroadcastHistory => self.broadcast_history.last_updated(),
            ResourceKind::HeatmapData => self.heatmap.last_updated(),
        }
    }

    // === REST refresh ===

    /// Marks a fetch as started. Returns false once disposed.
    pub fn begin_refresh(&mut self, kind: ResourceKind) -> bool {
        if self.disposed {
            return false;
        }
        match kind {
            ResourceKind::DashboardStats => self.stats.begin_refresh(),
            ResourceKind::Tourists => self.tourists.begin_refresh(),
            ResourceKind::SosAlerts => self.sos_alerts.begin_refresh(),
            ResourceKind::Geofences => self.geofences.begin_refresh(),
            ResourceKind::BroadcastHistory => self.broadcast_history.begin_refresh(),
            ResourceKind::HeatmapData => self.heatmap.begin_refresh(),
        }
        true
    }

    /// Stores the outcome of a fetch for `kind`.
    ///
    /// A successful list snapshot replaces the whole resource. A stats
    /// snapshot is a patch: counters it carries overwrite the cached ones,
    /// including any optimistic bump, while keys it omits keep the value a
    /// push event left there.
    pub fn complete_refresh(
        &mut self,
        kind: ResourceKind,
        result: Result<ResourcePayload, FetchError>,
    ) -> RefreshOutcome {
        if self.disposed {
            return RefreshOutcome::Discarded;
        }
        let now = Timestamp::now();

        macro_rules! settle {
            ($entry:expr, $variant:ident) => {
                settle!($entry, $variant, |data| data)
            };
            ($entry:expr, $variant:ident, $store:expr) => {{
                let result = match result {
                    Ok(ResourcePayload::$variant(data)) => Ok(($store)(data)),
                    Ok(other) => Err(FetchError::Decode(format!(
                        "expected {kind} payload, got {}",
                        other.kind()
                    ))),
                    Err(e) => Err(e),
                };
                let ok = result.is_ok();
                $entry.complete_refresh(result, now);
                ok
            }};
        }

        let stored = match kind {
            ResourceKind::DashboardStats => {
                settle!(self.stats, DashboardStats, |patch: StatsPatch| {
                    self.stats.data().merged(&patch)
                })
            }
            ResourceKind::Tourists => settle!(self.tourists, Tourists),
            ResourceKind::SosAlerts => settle!(self.sos_alerts, SosAlerts),
            ResourceKind::Geofences => settle!(self.geofences, Geofences),
            ResourceKind::BroadcastHistory => settle!(self.broadcast_history, BroadcastHistory),
            ResourceKind::HeatmapData => settle!(self.heatmap, HeatmapData),
        };

        if stored {
            RefreshOutcome::Stored
        } else {
            RefreshOutcome::Failed
        }
    }

    // === Lifecycle ===

    /// Tears the state down; later fetch completions and push events are
    /// discarded.
    pub fn dispose(&mut self) {
        self.disposed = true;
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::new(FeedCapacities::default())
    }
}
