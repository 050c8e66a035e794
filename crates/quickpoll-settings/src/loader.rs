//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`QuickPollSettings::default()`]
//! 2. If the settings file exists, deep-merge its values over the defaults
//! 3. Apply environment variable overrides (highest priority)
//! 4. Reject values the server cannot run with
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::{Result, SettingsError};
use crate::types::QuickPollSettings;

/// Resolve the `QuickPoll` data directory (`~/.quickpoll`).
pub fn data_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".quickpoll")
}

/// Resolve the path to the settings file (`~/.quickpoll/settings.json`).
pub fn settings_path() -> PathBuf {
    data_dir().join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<QuickPollSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// A missing file yields defaults. Invalid JSON is an error.
pub fn load_settings_from_path(path: &Path) -> Result<QuickPollSettings> {
    let mut settings = read_settings_file(path)?;
    apply_env_overrides(&mut settings);
    validate(&settings)?;
    Ok(settings)
}

/// Defaults merged with the file at `path`, without env overrides.
pub fn read_settings_file(path: &Path) -> Result<QuickPollSettings> {
    let defaults = serde_json::to_value(QuickPollSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
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

/// Apply process environment overrides to loaded settings.
pub fn apply_env_overrides(settings: &mut QuickPollSettings) {
    apply_overrides_with(settings, |name| std::env::var(name).ok());
}

/// Apply overrides read through `lookup`.
///
/// Recognized variables:
/// - `QUICKPOLL_HOST`, `QUICKPOLL_PORT`
/// - `QUICKPOLL_DB_PATH`
/// - `QUICKPOLL_LOG_LEVEL`, `QUICKPOLL_LOG_JSON`
/// - `QUICKPOLL_SEND_TIMEOUT_MS`
/// - `CORS_ORIGINS` (comma-separated)
///
/// Empty values are skipped. Unparseable values are ignored with a warning.
pub fn apply_overrides_with<F>(settings: &mut QuickPollSettings, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let read = |name: &str| lookup(name).filter(|v| !v.is_empty());

    if let Some(v) = read("QUICKPOLL_HOST") {
        settings.server.host = v;
    }
    if let Some(v) = read("QUICKPOLL_PORT") {
        match parse_u16_range(&v, 1, 65535) {
            Some(port) => settings.server.port = port,
            None => warn!(key = "QUICKPOLL_PORT", value = %v, "invalid port env var, ignoring"),
        }
    }
    if let Some(v) = read("QUICKPOLL_DB_PATH") {
        settings.database.path = v;
    }
    if let Some(v) = read("QUICKPOLL_LOG_LEVEL") {
        settings.logging.level = v;
    }
    if let Some(v) = read("QUICKPOLL_LOG_JSON") {
        match parse_bool(&v) {
            Some(json) => settings.logging.json = json,
            None => warn!(key = "QUICKPOLL_LOG_JSON", value = %v, "invalid boolean env var, ignoring"),
        }
    }
    if let Some(v) = read("QUICKPOLL_SEND_TIMEOUT_MS") {
        match parse_u64_range(&v, 1, 60_000) {
            Some(ms) => settings.server.send_timeout_ms = ms,
            None => warn!(key = "QUICKPOLL_SEND_TIMEOUT_MS", value = %v, "invalid u64 env var, ignoring"),
        }
    }
    if let Some(v) = read("CORS_ORIGINS") {
        let origins = parse_csv(&v);
        if origins.is_empty() {
            warn!(key = "CORS_ORIGINS", value = %v, "no origins in env var, ignoring");
        } else {
            settings.server.cors_origins = origins;
        }
    }
}

/// Reject settings the server cannot start with.
pub fn validate(settings: &QuickPollSettings) -> Result<()> {
    if settings.server.send_queue_capacity == 0 {
        return Err(SettingsError::InvalidValue(
            "server.sendQueueCapacity must be at least 1".into(),
        ));
    }
    if settings.server.ping_interval_secs == 0 {
        return Err(SettingsError::InvalidValue(
            "server.pingIntervalSecs must be at least 1".into(),
        ));
    }
    if settings.server.pong_timeout_secs < settings.server.ping_interval_secs {
        return Err(SettingsError::InvalidValue(
            "server.pongTimeoutSecs must not be shorter than server.pingIntervalSecs".into(),
        ));
    }
    if settings.database.pool_size == 0 {
        return Err(SettingsError::InvalidValue(
            "database.poolSize must be at least 1".into(),
        ));
    }
    Ok(())
}

// ── Pure parsing functions ──────────────────────────────────────────────────

/// Parse a string as a boolean.
///
/// Accepts (case-insensitive): `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`.
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a string as a `u16` within a range.
pub fn parse_u16_range(val: &str, min: u16, max: u16) -> Option<u16> {
    let n: u16 = val.trim().parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Parse a string as a `u64` within a range.
pub fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.trim().parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Split a comma-separated list, trimming entries and dropping empty ones.
pub fn parse_csv(val: &str) -> Vec<String> {
    val.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    // ── deep_merge ──────────────────────────────────────────────────

    #[test]
    fn merge_nested_override() {
        let target = serde_json::json!({"server": {"port": 8000, "host": "0.0.0.0"}});
        let source = serde_json::json!({"server": {"port": 9090}});
        let merged = deep_merge(target, source);
        assert_eq!(merged["server"]["port"], 9090);
        assert_eq!(merged["server"]["host"], "0.0.0.0");
    }

    #[test]
    fn merge_array_replace() {
        let target = serde_json::json!({"items": [1, 2, 3]});
        let source = serde_json::json!({"items": [4]});
        assert_eq!(deep_merge(target, source)["items"], serde_json::json!([4]));
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
    fn merge_primitive_replaces_object() {
        let target = serde_json::json!({"a": {"nested": true}});
        let source = serde_json::json!({"a": 42});
        assert_eq!(deep_merge(target, source)["a"], 42);
    }

    // ── file loading ────────────────────────────────────────────────

    #[test]
    fn missing_file_returns_defaults() {
        let settings = read_settings_file(Path::new("/nonexistent/settings.json")).unwrap();
        assert_eq!(settings, QuickPollSettings::default());
    }

    #[test]
    fn partial_file_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"server": {"port": 9001, "corsOrigins": ["https://a.test"]}, "logging": {"json": true}}"#,
        )
        .unwrap();

        let settings = read_settings_file(&path).unwrap();
        assert_eq!(settings.server.port, 9001);
        assert_eq!(settings.server.cors_origins, vec!["https://a.test".to_string()]);
        assert!(settings.logging.json);
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.database.pool_size, 8);
    }

    #[test]
    fn invalid_json_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "not json").unwrap();

        let err = read_settings_file(&path).unwrap_err();
        assert!(matches!(err, SettingsError::Json(_)));
    }

    #[test]
    fn invalid_file_value_rejected_by_validation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"database": {"poolSize": 0}}"#).unwrap();

        let err = load_settings_from_path(&path).unwrap_err();
        assert!(matches!(err, SettingsError::InvalidValue(_)));
    }

    // ── env overrides ───────────────────────────────────────────────

    #[test]
    fn env_overrides_apply() {
        let mut settings = QuickPollSettings::default();
        apply_overrides_with(
            &mut settings,
            env(&[
                ("QUICKPOLL_HOST", "127.0.0.1"),
                ("QUICKPOLL_PORT", "9200"),
                ("QUICKPOLL_DB_PATH", "/tmp/qp.db"),
                ("QUICKPOLL_LOG_LEVEL", "debug"),
                ("QUICKPOLL_LOG_JSON", "yes"),
                ("QUICKPOLL_SEND_TIMEOUT_MS", "250"),
                ("CORS_ORIGINS", "https://a.test, https://b.test ,"),
            ]),
        );
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.server.port, 9200);
        assert_eq!(settings.database.path, "/tmp/qp.db");
        assert_eq!(settings.logging.level, "debug");
        assert!(settings.logging.json);
        assert_eq!(settings.server.send_timeout_ms, 250);
        assert_eq!(
            settings.server.cors_origins,
            vec!["https://a.test".to_string(), "https://b.test".to_string()]
        );
    }

    #[test]
    fn invalid_env_values_ignored() {
        let mut settings = QuickPollSettings::default();
        apply_overrides_with(
            &mut settings,
            env(&[
                ("QUICKPOLL_PORT", "0"),
                ("QUICKPOLL_LOG_JSON", "maybe"),
                ("QUICKPOLL_SEND_TIMEOUT_MS", "soon"),
                ("CORS_ORIGINS", " , "),
                ("QUICKPOLL_HOST", ""),
            ]),
        );
        assert_eq!(settings, QuickPollSettings::default());
    }

    #[test]
    fn validate_rejects_short_pong_timeout() {
        let mut settings = QuickPollSettings::default();
        settings.server.pong_timeout_secs = 5;
        settings.server.ping_interval_secs = 30;
        assert!(validate(&settings).is_err());
    }

    #[test]
    fn validate_accepts_defaults() {
        assert!(validate(&QuickPollSettings::default()).is_ok());
    }

    // ── parsers ─────────────────────────────────────────────────────

    #[test]
    fn parse_bool_variants() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("on"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("Off"), Some(false));
        assert_eq!(parse_bool("nope"), None);
    }

    #[test]
    fn parse_ranges() {
        assert_eq!(parse_u16_range("8080", 1, 65535), Some(8080));
        assert_eq!(parse_u16_range("0", 1, 65535), None);
        assert_eq!(parse_u16_range("70000", 1, 65535), None);
        assert_eq!(parse_u64_range(" 42 ", 1, 100), Some(42));
        assert_eq!(parse_u64_range("101", 1, 100), None);
    }

    #[test]
    fn parse_csv_trims() {
        assert_eq!(parse_csv("a, b,,c "), vec!["a", "b", "c"]);
        assert!(parse_csv("").is_empty());
    }
}
