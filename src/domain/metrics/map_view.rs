//! Initial map framing from a coarse geolocation hint.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::GeoPoint;

/// Rough operator location supplied by a geolocation lookup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapViewHint {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapView {
    pub center: GeoPoint,
    pub zoom: f64,
}

impl MapView {
    pub const DEFAULT_CENTER: GeoPoint = GeoPoint {
        lat: 20.5937,
        lng: 78.9629,
    };
    pub const DEFAULT_ZOOM: f64 = 5.0;

    /// Centres on the hint and zooms to the most specific place it names.
    /// Without usable coordinates the default country-wide view is used.
    pub fn from_hint(hint: &MapViewHint) -> Self {
        let center = match (hint.lat, hint.lng) {
            (Some(lat), Some(lng)) if GeoPoint::new(lat, lng).is_valid() => GeoPoint::new(lat, lng),
            _ => return Self::default(),
        };

        let named = |field: &Option<String>| field.as_deref().is_some_and(|s| !s.trim().is_empty());
        let zoom = if named(&hint.city) {
            12.0
        } else if named(&hint.state) {
            8.0
        } else if named(&hint.country) {
            5.0
        } else {
            10.0
        };

        Self { center, zoom }
    }
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            center: Self::DEFAULT_CENTER,
            zoom: Self::DEFAULT_ZOOM,
        }
    }
}
