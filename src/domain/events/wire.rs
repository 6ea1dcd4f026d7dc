//! Lenient field readers for backend payloads.
//!
//! Device firmware and the REST layer disagree on field names, and on
//! whether identifiers and coordinates are JSON strings or numbers. Each
//! field is looked up under every known name and the first present,
//! readable value wins; a payload carrying two spellings of one field is
//! not an error.

use serde_json::{Map, Value};

/// Field names that carry a tourist identifier.
pub(crate) const SUBJECT_KEYS: &[&str] = &["aadhaar_number", "subjectId", "subject_id", "tourist_id"];
/// Field names that carry latitude.
pub(crate) const LAT_KEYS: &[&str] = &["latitude", "lat"];
/// Field names that carry longitude.
pub(crate) const LNG_KEYS: &[&str] = &["longitude", "lng"];
pub(crate) const ALERT_ID_KEYS: &[&str] = &["id", "alert_id"];
pub(crate) const LOCATION_NAME_KEYS: &[&str] = &["location_name", "locationName"];
pub(crate) const ZONE_ID_KEYS: &[&str] = &["geofence_id", "zone_id"];
pub(crate) const ZONE_NAME_KEYS: &[&str] = &["geofence_name", "zone_name"];
pub(crate) const TIMESTAMP_KEYS: &[&str] = &["timestamp"];

/// True when `data` is an object containing at least one of `keys` with a
/// non-null value.
pub(crate) fn has_any(data: &Map<String, Value>, keys: &[&str]) -> bool {
    keys.iter()
        .any(|k| data.get(*k).is_some_and(|v| !v.is_null()))
}

/// First value under `keys` that `read` accepts. Nulls and unreadable
/// values are skipped.
pub(crate) fn first_readable<T>(
    data: &Map<String, Value>,
    keys: &[&str],
    read: impl Fn(&Value) -> Option<T>,
) -> Option<T> {
    keys.iter().filter_map(|k| data.get(*k)).find_map(read)
}

/// Identifier text from a string or a number. Blank strings are absent.
pub(crate) fn text_or_number(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Free text. Blank strings are absent.
pub(crate) fn text(value: &Value) -> Option<String> {
    value
        .as_str()
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

/// A finite number, or a string holding one.
pub(crate) fn number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

/// A non-negative counter. Fractional values are rounded.
pub(crate) fn count(value: &Value) -> Option<u64> {
    if let Some(n) = value.as_u64() {
        return Some(n);
    }
    let n = number(value)?;
    (n >= 0.0 && n <= u64::MAX as f64).then(|| n.round() as u64)
}
