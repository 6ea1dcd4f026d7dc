//! Heatmap visual parameters as pure functions of density and zoom.
//!
//! The constants are presentation heuristics. What must hold is the
//! ordering: more density never draws smaller or paler, and zooming in
//! never draws a larger circle.

use serde::Serialize;

use crate::domain::dashboard::DashboardState;
use crate::domain::foundation::GeoPoint;

/// Colour bucket of a heatmap circle, from sparse to dense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HeatColor {
    Sparse,
    Low,
    Moderate,
    Elevated,
    High,
    Severe,
    Critical,
    /// Push-sourced position, drawn regardless of density.
    Live,
}

impl HeatColor {
    /// Bucket for an aggregated count.
    pub fn for_count(count: u64) -> Self {
        match count {
            0..=19 => HeatColor::Sparse,
            20..=39 => HeatColor::Low,
            40..=59 => HeatColor::Moderate,
            60..=79 => HeatColor::Elevated,
            80..=99 => HeatColor::High,
            100..=119 => HeatColor::Severe,
            _ => HeatColor::Critical,
        }
    }

    pub fn hex(&self) -> &'static str {
        match self {
            HeatColor::Sparse => "#fef3c7",
            HeatColor::Low => "#fde68a",
            HeatColor::Moderate => "#fbbf24",
            HeatColor::Elevated => "#f97316",
            HeatColor::High => "#ea580c",
            HeatColor::Severe => "#dc2626",
            HeatColor::Critical => "#991b1b",
            HeatColor::Live => "#2563eb",
        }
    }
}

pub const MAX_OPACITY: f64 = 0.85;

fn base_opacity(count: u64) -> f64 {
    match HeatColor::for_count(count) {
        HeatColor::Sparse | HeatColor::Live => 0.2,
        HeatColor::Low => 0.3,
        HeatColor::Moderate => 0.4,
        HeatColor::Elevated => 0.5,
        HeatColor::High => 0.6,
        HeatColor::Severe => 0.7,
        HeatColor::Critical => 0.8,
    }
}

fn zoom_factor(zoom: f64) -> f64 {
    if zoom > 10.0 {
        1.2
    } else if zoom < 5.0 {
        0.8
    } else {
        1.0
    }
}

/// Fill opacity for a circle of `count` at `zoom`, capped at [`MAX_OPACITY`].
pub fn opacity(count: u64, zoom: f64) -> f64 {
    (base_opacity(count) * zoom_factor(zoom)).min(MAX_OPACITY)
}

/// `(min, max)` radius in metres at `zoom`. Both bounds shrink as the map
/// zooms in.
pub fn radius_band(zoom: f64) -> (f64, f64) {
    if zoom < 6.0 {
        (1_000.0, 80_000.0)
    } else if zoom < 9.0 {
        (500.0, 30_000.0)
    } else if zoom < 12.0 {
        (200.0, 8_000.0)
    } else if zoom < 15.0 {
        (60.0, 2_000.0)
    } else {
        (20.0, 600.0)
    }
}

/// Circle radius in metres for `count` at `zoom`.
pub fn radius(count: u64, zoom: f64) -> f64 {
    let raw = (count as f64).sqrt() * 200.0 + (7.0 - zoom).exp2() * 1_200.0;
    let (min, max) = radius_band(zoom);
    raw.clamp(min, max)
}

/// Visual parameters of one heatmap circle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HeatStyle {
    pub color: HeatColor,
    pub opacity: f64,
    pub radius: f64,
}

impl HeatStyle {
    pub fn compute(count: u64, zoom: f64, live: bool) -> Self {
        Self {
            color: if live {
                HeatColor::Live
            } else {
                HeatColor::for_count(count)
            },
            opacity: opacity(count, zoom),
            radius: radius(count, zoom),
        }
    }
}

/// A styled circle ready for a map layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatCircle {
    pub center: GeoPoint,
    pub count: u64,
    pub live: bool,
    pub style: HeatStyle,
}

impl DashboardState {
    /// REST density cells followed by one live circle per tourist with a
    /// pushed position.
    pub fn heatmap_circles(&self, zoom: f64) -> Vec<HeatCircle> {
        let cells = self.heatmap_data().data().iter().map(|point| HeatCircle {
            center: GeoPoint::new(point.lat, point.lng),
            count: point.count,
            live: false,
            style: HeatStyle::compute(point.count, zoom, false),
        });

        let live = self.locations().values().map(|record| HeatCircle {
            center: record.location,
            count: 1,
            live: true,
            style: HeatStyle::compute(1, zoom, true),
        });

        cells.chain(live).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dashboard::{HeatmapPoint, ResourceKind, ResourcePayload};
    use crate::domain::events::{LocationUpdate, TypedEvent};
    use crate::domain::foundation::{SubjectId, Timestamp};
    use proptest::prelude::*;

    #[test]
    fn buckets_follow_thresholds() {
        assert_eq!(HeatColor::for_count(0), HeatColor::Sparse);
        assert_eq!(HeatColor::for_count(19), HeatColor::Sparse);
        assert_eq!(HeatColor::for_count(20), HeatColor::Low);
        assert_eq!(HeatColor::for_count(99), HeatColor::High);
        assert_eq!(HeatColor::for_count(100), HeatColor::Severe);
        assert_eq!(HeatColor::for_count(120), HeatColor::Critical);
        assert_eq!(HeatColor::for_count(10_000), HeatColor::Critical);
    }

    #[test]
    fn opacity_scales_with_zoom_and_caps() {
        assert!((opacity(0, 7.0) - 0.2).abs() < 1e-9);
        assert!((opacity(0, 3.0) - 0.16).abs() < 1e-9);
        assert!((opacity(0, 12.0) - 0.24).abs() < 1e-9);
        assert!((opacity(500, 12.0) - MAX_OPACITY).abs() < 1e-9);
    }

    #[test]
    fn live_points_use_distinct_colour() {
        let style = HeatStyle::compute(1, 10.0, true);
        assert_eq!(style.color, HeatColor::Live);
        assert_ne!(style.color.hex(), HeatColor::Sparse.hex());
    }

    #[test]
    fn circles_include_live_positions() {
        let mut state = DashboardState::default();
        state.begin_refresh(ResourceKind::HeatmapData);
        state.complete_refresh(
            ResourceKind::HeatmapData,
            Ok(ResourcePayload::HeatmapData(vec![HeatmapPoint {
                lat: 1.0,
                lng: 1.0,
                count: 45,
            }])),
        );
        let at = Timestamp::now();
        state.apply_event_at(
            TypedEvent::LocationUpdate(LocationUpdate {
                subject_id: SubjectId::new("a"),
                location: GeoPoint::new(2.0, 2.0),
                timestamp: at,
                location_name: None,
            }),
            at,
        );

        let circles = state.heatmap_circles(10.0);
        assert_eq!(circles.len(), 2);
        assert_eq!(circles[0].style.color, HeatColor::Moderate);
        assert!(circles[1].live);
        assert_eq!(circles[1].count, 1);
    }

    proptest! {
        #[test]
        fn radius_never_grows_when_zooming_in(
            count in 0u64..50_000,
            a in 0.0f64..22.0,
            b in 0.0f64..22.0,
        ) {
            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(radius(count, high) <= radius(count, low) + 1e-9);
        }

        #[test]
        fn radius_never_shrinks_with_density(
            zoom in 0.0f64..22.0,
            a in 0u64..50_000,
            b in 0u64..50_000,
        ) {
            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(radius(high, zoom) + 1e-9 >= radius(low, zoom));
        }

        #[test]
        fn band_bounds_are_ordered_and_non_increasing(a in 0.0f64..22.0, b in 0.0f64..22.0) {
            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            let (min_low, max_low) = radius_band(low);
            let (min_high, max_high) = radius_band(high);
            prop_assert!(min_low <= max_low);
            prop_assert!(min_high <= min_low);
            prop_assert!(max_high <= max_low);
        }

        #[test]
        fn intensity_never_drops_with_density(zoom in 0.0f64..22.0, a in 0u64..500, b in 0u64..500) {
            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(HeatColor::for_count(low) <= HeatColor::for_count(high));
            prop_assert!(opacity(low, zoom) <= opacity(high, zoom) + 1e-9);
        }
    }
}
