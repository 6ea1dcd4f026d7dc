//! Per-resource cached snapshots with stale-while-revalidate semantics.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::Timestamp;

use super::errors::FetchError;

/// The independently refreshed REST resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResourceKind {
    DashboardStats,
    Tourists,
    SosAlerts,
    Geofences,
    BroadcastHistory,
    HeatmapData,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 6] = [
        ResourceKind::DashboardStats,
        ResourceKind::Tourists,
        ResourceKind::SosAlerts,
        ResourceKind::Geofences,
        ResourceKind::BroadcastHistory,
        ResourceKind::HeatmapData,
    ];

    /// Refreshed on every tick while the push channel is down.
    pub const DEGRADED_SET: [ResourceKind; 3] = [
        ResourceKind::DashboardStats,
        ResourceKind::Tourists,
        ResourceKind::SosAlerts,
    ];

    /// Refreshed on every tick while push keeps the rest current.
    pub const CONNECTED_SET: [ResourceKind; 1] = [ResourceKind::DashboardStats];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::DashboardStats => "dashboardStats",
            ResourceKind::Tourists => "tourists",
            ResourceKind::SosAlerts => "sosAlerts",
            ResourceKind::Geofences => "geofences",
            ResourceKind::BroadcastHistory => "broadcastHistory",
            ResourceKind::HeatmapData => "heatmapData",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One cached resource.
///
/// While a refresh is in flight `loading` is true but `data` still holds
/// the previous snapshot; it is only replaced by a successful fetch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedResource<T> {
    data: T,
    loading: bool,
    last_updated: Option<Timestamp>,
    error: Option<String>,
    #[serde(skip)]
    in_flight: u32,
}

impl<T: Default> CachedResource<T> {
    /// Empty entry awaiting its first fetch.
    pub fn new() -> Self {
        Self {
            data: T::default(),
            loading: true,
            last_updated: None,
            error: None,
            in_flight: 0,
        }
    }
}

impl<T: Default> Default for CachedResource<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> CachedResource<T> {
    pub fn data(&self) -> &T {
        &self.data
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn last_updated(&self) -> Option<Timestamp> {
        self.last_updated
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// True while at least one fetch for this resource is outstanding.
    pub fn has_fetch_in_flight(&self) -> bool {
        self.in_flight > 0
    }

    /// Data is older than `max_age`, or was never loaded.
    pub fn is_stale(&self, now: Timestamp, max_age: chrono::Duration) -> bool {
        match self.last_updated {
            Some(at) => now.duration_since(&at) > max_age,
            None => true,
        }
    }

    pub(crate) fn begin_refresh(&mut self) {
        self.in_flight += 1;
        self.loading = true;
    }

    /// Settles one fetch. A failure keeps the previous data and records
    /// the error; a success replaces data and clears the error.
    pub(crate) fn complete_refresh(&mut self, result: Result<T, FetchError>, at: Timestamp) {
        self.in_flight = self.in_flight.saturating_sub(1);
        self.loading = self.in_flight > 0;
        match result {
            Ok(data) => {
                self.data = data;
                self.error = None;
                self.last_updated = Some(at);
            }
            Err(e) => {
                self.error = Some(e.to_string());
            }
        }
    }

    /// In-place update from a push event. Does not touch freshness.
    pub(crate) fn data_mut(&mut self) -> &mut T {
        &mut self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_entry_is_loading_and_empty() {
        let entry: CachedResource<Vec<u8>> = CachedResource::new();
        assert!(entry.loading());
        assert!(entry.data().is_empty());
        assert!(entry.last_updated().is_none());
        assert!(!entry.has_fetch_in_flight());
    }

    #[test]
    fn refresh_keeps_previous_data_while_loading() {
        let mut entry: CachedResource<Vec<u8>> = CachedResource::new();
        entry.begin_refresh();
        entry.complete_refresh(Ok(vec![1, 2]), Timestamp::now());
        assert!(!entry.loading());

        entry.begin_refresh();
        assert!(entry.loading());
        assert_eq!(entry.data(), &vec![1, 2]);
    }

    #[test]
    fn failure_keeps_data_and_records_error() {
        let mut entry: CachedResource<Vec<u8>> = CachedResource::new();
        entry.begin_refresh();
        entry.complete_refresh(Ok(vec![7]), Timestamp::now());
        let loaded_at = entry.last_updated();

        entry.begin_refresh();
        entry.complete_refresh(Err(FetchError::Http { status: 500 }), Timestamp::now());

        assert_eq!(entry.data(), &vec![7]);
        assert_eq!(entry.error(), Some("server returned HTTP 500"));
        assert_eq!(entry.last_updated(), loaded_at);
        assert!(!entry.loading());
    }

    #[test]
    fn success_clears_previous_error() {
        let mut entry: CachedResource<u32> = CachedResource::new();
        entry.begin_refresh();
        entry.complete_refresh(Err(FetchError::network("down")), Timestamp::now());
        entry.begin_refresh();
        entry.complete_refresh(Ok(3), Timestamp::now());
        assert!(entry.error().is_none());
    }

    #[test]
    fn overlapping_fetches_keep_loading_until_last_settles() {
        let mut entry: CachedResource<u32> = CachedResource::new();
        entry.begin_refresh();
        entry.begin_refresh();
        entry.complete_refresh(Ok(1), Timestamp::now());
        assert!(entry.loading());
        entry.complete_refresh(Ok(2), Timestamp::now());
        assert!(!entry.loading());
        assert_eq!(*entry.data(), 2);
    }

    #[test]
    fn staleness_uses_last_update() {
        let mut entry: CachedResource<u32> = CachedResource::new();
        let now = Timestamp::now();
        assert!(entry.is_stale(now, chrono::Duration::seconds(30)));

        entry.begin_refresh();
        entry.complete_refresh(Ok(1), now);
        assert!(!entry.is_stale(now.plus_secs(10), chrono::Duration::seconds(30)));
        assert!(entry.is_stale(now.plus_secs(60), chrono::Duration::seconds(30)));
    }

    #[test]
    fn kind_names_match_dashboard_keys() {
        assert_eq!(ResourceKind::DashboardStats.to_string(), "dashboardStats");
        assert_eq!(ResourceKind::ALL.len(), 6);
    }
}
