//! ResourceRefresher - repopulates cached resources through the REST port.
//!
//! Fetches run concurrently and each settles on its own: a resource is
//! written back as soon as its fetch completes, under one short write
//! lock, independent of the others.

use futures::future::join_all;
use std::sync::Arc;

use crate::domain::dashboard::{FetchError, RefreshOutcome, ResourceKind, ResourcePayload};
use crate::ports::DashboardApi;

use super::SharedDashboard;

/// Fetches one resource and unwraps the response envelope.
pub async fn fetch_resource(
    api: &dyn DashboardApi,
    kind: ResourceKind,
) -> Result<ResourcePayload, FetchError> {
    let payload = match kind {
        ResourceKind::DashboardStats => {
            ResourcePayload::DashboardStats(api.fetch_dashboard_stats().await?.into_result()?)
        }
        ResourceKind::Tourists => {
            ResourcePayload::Tourists(api.fetch_tourists().await?.into_result()?)
        }
        ResourceKind::SosAlerts => {
            ResourcePayload::SosAlerts(api.fetch_sos_alerts().await?.into_result()?)
        }
        ResourceKind::Geofences => {
            ResourcePayload::Geofences(api.fetch_geofences().await?.into_result()?)
        }
        ResourceKind::BroadcastHistory => {
            ResourcePayload::BroadcastHistory(api.fetch_broadcast_history().await?.into_result()?)
        }
        ResourceKind::HeatmapData => {
            ResourcePayload::HeatmapData(api.fetch_heatmap_data().await?.into_result()?)
        }
    };
    Ok(payload)
}

/// Outcome of one refresh round, per resource.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RefreshReport {
    pub stored: Vec<ResourceKind>,
    pub failed: Vec<(ResourceKind, String)>,
    /// Completed after the dashboard was disposed.
    pub discarded: Vec<ResourceKind>,
}

impl RefreshReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && self.discarded.is_empty()
    }
}

#[derive(Clone)]
pub struct ResourceRefresher {
    api: Arc<dyn DashboardApi>,
    dashboard: SharedDashboard,
}

impl ResourceRefresher {
    pub fn new(api: Arc<dyn DashboardApi>, dashboard: SharedDashboard) -> Self {
        Self { api, dashboard }
    }

    pub fn api(&self) -> &Arc<dyn DashboardApi> {
        &self.api
    }

    /// Refreshes all six resources.
    pub async fn refresh_all(&self) -> RefreshReport {
        self.refresh_selective(&ResourceKind::ALL).await
    }

    /// Refreshes only `kinds`. Duplicates are fetched once.
    pub async fn refresh_selective(&self, kinds: &[ResourceKind]) -> RefreshReport {
        let mut unique: Vec<ResourceKind> = kinds.to_vec();
        unique.sort();
        unique.dedup();

        let mut report = RefreshReport::default();

        let started: Vec<ResourceKind> = {
            let mut dashboard = self.dashboard.write().await;
            unique
                .into_iter()
                .filter(|kind| {
                    let begun = dashboard.begin_refresh(*kind);
                    if !begun {
                        report.discarded.push(*kind);
                    }
                    begun
                })
                .collect()
        };

        let results = join_all(started.into_iter().map(|kind| self.refresh_one(kind))).await;

        for (kind, outcome) in results {
            match outcome {
                (RefreshOutcome::Stored, _) => report.stored.push(kind),
                (RefreshOutcome::Failed, error) => {
                    report.failed.push((kind, error.unwrap_or_default()))
                }
                (RefreshOutcome::Discarded, _) => report.discarded.push(kind),
            }
        }

        tracing::debug!(
            stored = report.stored.len(),
            failed = report.failed.len(),
            discarded = report.discarded.len(),
            "refresh round complete"
        );
        report
    }

    async fn refresh_one(
        &self,
        kind: ResourceKind,
    ) -> (ResourceKind, (RefreshOutcome, Option<String>)) {
        let result = fetch_resource(self.api.as_ref(), kind).await;
        let error = result.as_ref().err().map(ToString::to_string);
        if let Some(error) = &error {
            tracing::warn!(resource = %kind, error = %error, "resource refresh failed");
        }

        let outcome = self.dashboard.write().await.complete_refresh(kind, result);
        if outcome == RefreshOutcome::Discarded {
            tracing::debug!(resource = %kind, "refresh result discarded after dispose");
        }
        (kind, (outcome, error))
    }
}
