//! UTC timestamps as they travel on the wire.
//!
//! Backend payloads carry times as RFC 3339 strings, as ISO strings
//! without an offset (read as UTC), or as epoch milliseconds, integral or
//! not. All deserialize into the same UTC value. Serialization always
//! emits RFC 3339.

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Immutable point in time, always UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now())
    }

    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Returns the duration from another timestamp to this one.
    ///
    /// Returns negative duration if other is after self.
    pub fn duration_since(&self, other: &Timestamp) -> Duration {
        self.0.signed_duration_since(other.0)
    }

    /// Creates a timestamp from Unix milliseconds.
    ///
    /// Returns `None` for values outside chrono's representable range.
    pub fn from_unix_millis(millis: i64) -> Option<Self> {
        Utc.timestamp_millis_opt(millis).single().map(Self)
    }

    /// Returns the timestamp as Unix milliseconds.
    pub fn as_unix_millis(&self) -> i64 {
        self.0.timestamp_millis()
    }

    /// Creates a new timestamp by adding the specified number of seconds.
    pub fn plus_secs(&self, secs: i64) -> Self {
        Self(self.0 + Duration::seconds(secs))
    }

    /// Reads any accepted wire form. `None` when the value is not a time.
    pub fn from_wire(value: &Value) -> Option<Self> {
        match value {
            Value::String(text) => Self::parse_text(text.trim()),
            Value::Number(n) => match n.as_i64() {
                Some(ms) => Self::from_unix_millis(ms),
                None => n
                    .as_f64()
                    .filter(|ms| ms.is_finite() && ms.abs() < i64::MAX as f64)
                    .and_then(|ms| Self::from_unix_millis(ms.round() as i64)),
            },
            _ => None,
        }
    }

    fn parse_text(text: &str) -> Option<Self> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Some(Self(dt.with_timezone(&Utc)));
        }
        NAIVE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
            .map(|naive| Self(Utc.from_utc_datetime(&naive)))
    }

    /// Formats as RFC 3339 for wire output.
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339()
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Self::from_wire(&value)
            .ok_or_else(|| serde::de::Error::custom(format!("not a timestamp: {value}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn timestamp_deserializes_from_rfc3339() {
        let ts: Timestamp = serde_json::from_str("\"2024-01-15T10:30:00Z\"").unwrap();
        assert_eq!(ts.as_datetime().year(), 2024);
        assert_eq!(ts.as_datetime().month(), 1);
    }

    #[test]
    fn timestamp_deserializes_from_epoch_millis() {
        // 2024-01-15T00:00:00Z
        let ts: Timestamp = serde_json::from_str("1705276800000").unwrap();
        assert_eq!(ts.as_datetime().day(), 15);
        assert_eq!(ts.as_unix_millis(), 1_705_276_800_000);
    }

    #[test]
    fn timestamp_reads_iso_without_offset_as_utc() {
        let t = Timestamp::from_wire(&serde_json::json!("2024-01-15T10:30:00")).unwrap();
        assert_eq!(t.to_rfc3339(), "2024-01-15T10:30:00+00:00");

        let t = Timestamp::from_wire(&serde_json::json!("2024-01-15 10:30:00.250")).unwrap();
        assert_eq!(t.as_unix_millis(), 1_705_314_600_250);
    }

    #[test]
    fn timestamp_reads_fractional_millis() {
        let t = Timestamp::from_wire(&serde_json::json!(1_705_276_800_000.4)).unwrap();
        assert_eq!(t.as_unix_millis(), 1_705_276_800_000);
    }

    #[test]
    fn offsets_normalize_to_utc() {
        let t = Timestamp::from_wire(&serde_json::json!("2024-01-15T16:00:00+05:30")).unwrap();
        assert_eq!(t.to_rfc3339(), "2024-01-15T10:30:00+00:00");
    }

    #[test]
    fn timestamp_rejects_garbage() {
        assert_eq!(Timestamp::from_wire(&serde_json::json!(true)), None);
        let result: Result<Timestamp, _> = serde_json::from_str("\"yesterday\"");
        assert!(result.is_err());
    }

    #[test]
    fn timestamp_serializes_as_rfc3339() {
        let ts = Timestamp::from_unix_millis(1_705_276_800_000).unwrap();
        let json = serde_json::to_string(&ts).unwrap();
        assert!(json.contains("2024-01-15T00:00:00"));
    }

    #[test]
    fn later_timestamps_sort_after() {
        let earlier = Timestamp::from_unix_millis(1_000).unwrap();
        let later = earlier.plus_secs(60);

        assert!(earlier < later);
        assert_eq!(later.duration_since(&earlier), Duration::seconds(60));
        assert_eq!(earlier.duration_since(&later), Duration::seconds(-60));
    }
}
