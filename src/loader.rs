//! Tiered configuration file resolution and store construction.
//!
//! The configuration file is located by probing three candidate paths from
//! most to least specific:
//!
//! 1. `<root>/<app>-v<major>/<env>/config.json` (environment-specific)
//! 2. `<root>/<app>-v<major>/config.json` (version-scoped)
//! 3. `<root>/config.json` (global)
//!
//! The first existing candidate wins and stays the resolved path for the
//! process lifetime; reloads re-read it without re-probing.

use crate::error::{ConfigError, ConfigResult};
use crate::merge::deep_merge;
use crate::sources::OverrideSources;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// File name expected at every tier.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Probe the three tier candidates and return the first that exists.
///
/// Fails with [`ConfigError::NoConfigFileFound`] when every tier is absent.
pub fn probe_tiers(
    root: &Path,
    app_name: &str,
    major_version: &str,
    env: &str,
) -> ConfigResult<PathBuf> {
    let versioned = root.join(format!("{}-v{}", app_name, major_version));
    let candidates = [
        versioned.join(env).join(CONFIG_FILE_NAME),
        versioned.join(CONFIG_FILE_NAME),
        root.join(CONFIG_FILE_NAME),
    ];

    for candidate in &candidates {
        if candidate.exists() {
            info!(path = %candidate.display(), "selected configuration file");
            return Ok(candidate.clone());
        }
        warn!(path = %candidate.display(), "no configuration file here, trying next tier");
    }

    Err(ConfigError::NoConfigFileFound {
        root: root.to_path_buf(),
    })
}

/// Read and parse the resolved configuration file, then overlay the
/// environment and command-line sources on top of it.
///
/// The merge is built entirely off to the side; callers publish the
/// returned value in one step so readers never observe a partial merge.
pub fn build_store(path: &Path, sources: &OverrideSources) -> ConfigResult<Value> {
    let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
    let file_value = parse_config(path, &raw)?;
    Ok(deep_merge(
        deep_merge(file_value, sources.env_overlay()),
        sources.args_overlay(),
    ))
}

/// Parse configuration content as a JSON object, falling back to
/// `key=value` lines (`#` comments and blank lines skipped).
fn parse_config(path: &Path, raw: &str) -> ConfigResult<Value> {
    if raw.trim_start().starts_with('{') {
        return serde_json::from_str(raw).map_err(|e| ConfigError::parse(path, e));
    }

    let mut map = Map::new();
    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            map.insert(
                key.trim().to_string(),
                Value::String(value.trim().to_string()),
            );
        }
    }
    Ok(Value::Object(map))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn write(path: &Path, content: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn tier_one_wins_when_present() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(&root.join("svc-v1/prod/config.json"), "{}");
        write(&root.join("svc-v1/config.json"), "{}");
        write(&root.join("config.json"), "{}");

        let path = probe_tiers(root, "svc", "1", "prod").unwrap();
        assert_eq!(path, root.join("svc-v1/prod/config.json"));
    }

    #[test]
    fn falls_back_to_tier_two() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(&root.join("svc-v1/config.json"), "{}");
        write(&root.join("config.json"), "{}");

        let path = probe_tiers(root, "svc", "1", "prod").unwrap();
        assert_eq!(path, root.join("svc-v1/config.json"));
    }

    #[test]
    fn falls_back_to_tier_three() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(&root.join("config.json"), "{}");

        let path = probe_tiers(root, "svc", "1", "prod").unwrap();
        assert_eq!(path, root.join("config.json"));
    }

    #[test]
    fn all_tiers_absent_is_an_error() {
        let temp = TempDir::new().unwrap();
        let err = probe_tiers(temp.path(), "svc", "1", "prod").unwrap_err();
        assert!(matches!(err, ConfigError::NoConfigFileFound { .. }));
    }

    #[test]
    fn env_in_tier_path_comes_from_caller() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(&root.join("svc-v2/staging/config.json"), "{}");

        assert!(probe_tiers(root, "svc", "2", "prod").is_err());
        assert!(probe_tiers(root, "svc", "2", "staging").is_ok());
    }

    #[test]
    fn store_merges_file_env_and_args() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("config.json");
        write(
            &file,
            r#"{"key": "file", "file_only": true, "env_only": null}"#,
        );

        let sources = OverrideSources::from_parts(
            vec!["--key=args".to_string()],
            [
                ("key".to_string(), "env".to_string()),
                ("env_only".to_string(), "from-env".to_string()),
            ],
        );
        let store = build_store(&file, &sources).unwrap();

        assert_eq!(store["key"], json!("args"));
        assert_eq!(store["file_only"], json!(true));
        assert_eq!(store["env_only"], json!("from-env"));
    }

    #[test]
    fn env_beats_file_when_args_absent() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("config.json");
        write(&file, r#"{"key": "file"}"#);

        let sources = OverrideSources::from_parts(
            vec![],
            [("key".to_string(), "env".to_string())],
        );
        let store = build_store(&file, &sources).unwrap();
        assert_eq!(store["key"], json!("env"));
    }

    #[test]
    fn parses_key_value_lines() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("config.json");
        write(
            &file,
            "# connection settings\ndb_host = localhost\n\ndb_port=5432\n",
        );

        let store = build_store(&file, &OverrideSources::default()).unwrap();
        assert_eq!(store["db_host"], json!("localhost"));
        assert_eq!(store["db_port"], json!("5432"));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("config.json");
        write(&file, "{ broken");

        let err = build_store(&file, &OverrideSources::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn unreadable_file_is_an_io_error() {
        let temp = TempDir::new().unwrap();
        let err =
            build_store(&temp.path().join("missing.json"), &OverrideSources::default())
                .unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
