//! Feature flags configuration

use serde::Deserialize;

/// Feature flags for enabling/disabling functionality
#[derive(Debug, Clone, Deserialize, Default)]
pub struct FeatureFlags {
    /// Expose a debug snapshot of the session (connection, feeds, errors)
    #[serde(default)]
    pub debug_introspection: bool,

    /// Emit logs as JSON lines instead of human-readable text
    #[serde(default)]
    pub json_logs: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_flags_defaults() {
        let flags = FeatureFlags::default();
        assert!(!flags.debug_introspection);
        assert!(!flags.json_logs);
    }

    #[test]
    fn test_feature_flags_deserialization() {
        let json = r#"{ "debug_introspection": true }"#;

        let flags: FeatureFlags = serde_json::from_str(json).unwrap();
        assert!(flags.debug_introspection);
        assert!(!flags.json_logs);
    }
}
