//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`ChamberSettings::default()`]
//! 2. If `~/.chamber/settings.json` exists, deep-merge user values over defaults
//! 3. Apply `CHAMBER_*` environment variable overrides (highest priority)
//! 4. Validate the result
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::errors::{Result, SettingsError};
use crate::types::ChamberSettings;

/// Resolve the path to the settings file (`~/.chamber/settings.json`).
pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".chamber").join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<ChamberSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// If the file does not exist, returns defaults. If the file contains
/// invalid JSON, returns an error.
pub fn load_settings_from_path(path: &Path) -> Result<ChamberSettings> {
    let mut settings = load_file_layer(path)?;
    apply_env_overrides(&mut settings);
    validate(&settings)?;
    Ok(settings)
}

fn load_file_layer(path: &Path) -> Result<ChamberSettings> {
    let defaults = serde_json::to_value(ChamberSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let user: Value =
            serde_json::from_str(&content).map_err(|source| SettingsError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    Ok(serde_json::from_value(merged)?)
}

/// Recursive deep merge of two JSON values.
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Reject settings that would make every control call or readiness wait fail.
pub fn validate(settings: &ChamberSettings) -> Result<()> {
    let invalid = |key, reason: &str| {
        Err(SettingsError::InvalidValue {
            key,
            reason: reason.to_string(),
        })
    };

    if settings.transport.request_timeout_ms == 0 {
        return invalid("transport.requestTimeoutMs", "must be greater than 0");
    }
    if settings.transport.connect_timeout_ms == 0 {
        return invalid("transport.connectTimeoutMs", "must be greater than 0");
    }
    if !is_header_value(&settings.transport.user_agent) {
        return invalid(
            "transport.userAgent",
            "must not contain control characters other than tab",
        );
    }
    if settings.readiness.poll_interval_ms == 0 {
        return invalid("readiness.pollIntervalMs", "must be greater than 0");
    }
    if settings.readiness.poll_interval_ms > settings.readiness.timeout_ms {
        return invalid(
            "readiness.pollIntervalMs",
            &format!(
                "{} exceeds readiness.timeoutMs ({})",
                settings.readiness.poll_interval_ms, settings.readiness.timeout_ms
            ),
        );
    }
    Ok(())
}

/// Whether `value` can be sent as an HTTP header value.
fn is_header_value(value: &str) -> bool {
    value.bytes().all(|b| b == b'\t' || (b >= 0x20 && b != 0x7f))
}

/// Apply environment variable overrides from the process environment.
pub fn apply_env_overrides(settings: &mut ChamberSettings) {
    apply_overrides_with(settings, |name| std::env::var(name).ok());
}

/// Apply overrides using an arbitrary variable lookup.
///
/// Each variable has strict parsing rules:
/// - Integers must be valid and within the specified range
/// - Strings must be non-empty
/// - Invalid values are ignored with a warning (fall back to file/default)
pub fn apply_overrides_with<F>(settings: &mut ChamberSettings, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let env = EnvReader { lookup };

    // ── Transport ───────────────────────────────────────────────────
    if let Some(v) = env.read_u64("CHAMBER_REQUEST_TIMEOUT_MS", 1, 3_600_000) {
        settings.transport.request_timeout_ms = v;
    }
    if let Some(v) = env.read_u64("CHAMBER_CONNECT_TIMEOUT_MS", 1, 600_000) {
        settings.transport.connect_timeout_ms = v;
    }
    if let Some(v) = env.read_string("CHAMBER_USER_AGENT") {
        settings.transport.user_agent = v;
    }

    // ── Readiness ───────────────────────────────────────────────────
    if let Some(v) = env.read_u64("CHAMBER_READY_POLL_MS", 1, 60_000) {
        settings.readiness.poll_interval_ms = v;
    }
    if let Some(v) = env.read_u64("CHAMBER_READY_TIMEOUT_MS", 1, 3_600_000) {
        settings.readiness.timeout_ms = v;
    }

    // ── Logging ─────────────────────────────────────────────────────
    if let Some(v) = env.read_string("CHAMBER_LOG_LEVEL") {
        settings.logging.level = v;
    }
}

/// Parse a string as a `u64` within a range.
pub fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

struct EnvReader<F> {
    lookup: F,
}

impl<F> EnvReader<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn read_string(&self, name: &str) -> Option<String> {
        (self.lookup)(name).filter(|v| !v.is_empty())
    }

    fn read_u64(&self, name: &str, min: u64, max: u64) -> Option<u64> {
        let val = (self.lookup)(name)?;
        let result = parse_u64_range(&val, min, max);
        if result.is_none() {
            tracing::warn!(key = name, value = %val, "invalid u64 env var, ignoring");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    // ── deep_merge ──────────────────────────────────────────────────

    #[test]
    fn merge_nested_override() {
        let target = serde_json::json!({
            "transport": {"requestTimeoutMs": 30000, "userAgent": "chamber/0.1"}
        });
        let source = serde_json::json!({
            "transport": {"requestTimeoutMs": 500}
        });
        let merged = deep_merge(target, source);
        assert_eq!(merged["transport"]["requestTimeoutMs"], 500);
        assert_eq!(merged["transport"]["userAgent"], "chamber/0.1");
    }

    #[test]
    fn merge_null_preserves_target() {
        let target = serde_json::json!({"a": 1, "b": 2});
        let source = serde_json::json!({"a": null});
        let merged = deep_merge(target, source);
        assert_eq!(merged["a"], 1);
        assert_eq!(merged["b"], 2);
    }

    #[test]
    fn merge_array_replace() {
        let target = serde_json::json!({"items": [1, 2, 3]});
        let source = serde_json::json!({"items": [4]});
        let merged = deep_merge(target, source);
        assert_eq!(merged["items"], serde_json::json!([4]));
    }

    #[test]
    fn merge_primitive_replaces_object() {
        let target = serde_json::json!({"a": {"nested": true}});
        let source = serde_json::json!({"a": 42});
        let merged = deep_merge(target, source);
        assert_eq!(merged["a"], 42);
    }

    // ── file layer ──────────────────────────────────────────────────

    #[test]
    fn missing_file_returns_defaults() {
        let settings = load_file_layer(Path::new("/nonexistent/settings.json")).unwrap();
        assert_eq!(settings, ChamberSettings::default());
    }

    #[test]
    fn partial_file_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"transport": {"connectTimeoutMs": 250}, "logging": {"level": "debug"}}"#,
        )
        .unwrap();

        let settings = load_file_layer(&path).unwrap();
        assert_eq!(settings.transport.connect_timeout_ms, 250);
        assert_eq!(settings.transport.request_timeout_ms, 30_000);
        assert_eq!(settings.logging.level, "debug");
    }

    #[test]
    fn invalid_json_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "not valid json").unwrap();

        let err = load_settings_from_path(&path).unwrap_err();
        assert!(matches!(err, SettingsError::Parse { .. }));
        assert!(err.to_string().contains("settings.json"));
    }

    #[test]
    fn invalid_value_in_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"readiness": {"pollIntervalMs": 0}}"#).unwrap();

        let err = load_settings_from_path(&path).unwrap_err();
        assert!(matches!(
            err,
            SettingsError::InvalidValue { key: "readiness.pollIntervalMs", .. }
        ));
    }

    #[test]
    fn wrong_type_in_file_is_shape_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"transport": {"requestTimeoutMs": "fast"}}"#).unwrap();

        let err = load_settings_from_path(&path).unwrap_err();
        assert!(matches!(err, SettingsError::Shape(_)));
    }

    // ── validate ────────────────────────────────────────────────────

    #[test]
    fn defaults_validate() {
        assert!(validate(&ChamberSettings::default()).is_ok());
    }

    #[test]
    fn poll_longer_than_timeout_rejected() {
        let mut settings = ChamberSettings::default();
        settings.readiness.poll_interval_ms = 5_000;
        settings.readiness.timeout_ms = 1_000;
        let err = validate(&settings).unwrap_err();
        assert!(err.to_string().contains("pollIntervalMs"));
    }

    #[test]
    fn user_agent_with_newline_rejected() {
        let mut settings = ChamberSettings::default();
        settings.transport.user_agent = "bad\nagent".into();
        let err = validate(&settings).unwrap_err();
        assert!(matches!(
            err,
            SettingsError::InvalidValue { key: "transport.userAgent", .. }
        ));

        settings.transport.user_agent = "chamber\t(sim run 7)".into();
        assert!(validate(&settings).is_ok());
    }

    #[test]
    fn zero_request_timeout_rejected() {
        let mut settings = ChamberSettings::default();
        settings.transport.request_timeout_ms = 0;
        assert!(validate(&settings).is_err());
    }

    // ── env overrides ───────────────────────────────────────────────

    #[test]
    fn env_overrides_apply() {
        let env = vars(&[
            ("CHAMBER_REQUEST_TIMEOUT_MS", "1500"),
            ("CHAMBER_USER_AGENT", "sim-runner"),
            ("CHAMBER_READY_TIMEOUT_MS", "2000"),
            ("CHAMBER_LOG_LEVEL", "debug"),
        ]);
        let mut settings = ChamberSettings::default();
        apply_overrides_with(&mut settings, |k| env.get(k).cloned());

        assert_eq!(settings.transport.request_timeout_ms, 1500);
        assert_eq!(settings.transport.user_agent, "sim-runner");
        assert_eq!(settings.readiness.timeout_ms, 2000);
        assert_eq!(settings.logging.level, "debug");
        assert_eq!(settings.readiness.poll_interval_ms, 100);
    }

    #[test]
    fn env_out_of_range_ignored() {
        let env = vars(&[
            ("CHAMBER_REQUEST_TIMEOUT_MS", "0"),
            ("CHAMBER_READY_POLL_MS", "soon"),
            ("CHAMBER_USER_AGENT", ""),
        ]);
        let mut settings = ChamberSettings::default();
        apply_overrides_with(&mut settings, |k| env.get(k).cloned());
        assert_eq!(settings, ChamberSettings::default());
    }

    #[test]
    fn parse_u64_range_bounds() {
        assert_eq!(parse_u64_range("10", 1, 10), Some(10));
        assert_eq!(parse_u64_range("11", 1, 10), None);
        assert_eq!(parse_u64_range("0", 1, 10), None);
        assert_eq!(parse_u64_range("-1", 1, 10), None);
    }
}
