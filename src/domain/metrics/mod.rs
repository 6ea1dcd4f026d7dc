//! Derived metrics: pure functions of dashboard state plus view
//! parameters. Nothing here is stored.

mod heatmap;
mod map_view;
mod violations;

pub use heatmap::{opacity, radius, radius_band, HeatCircle, HeatColor, HeatStyle, MAX_OPACITY};
pub use map_view::{MapView, MapViewHint};
pub use violations::{violation_count, ZoneWithViolations};
