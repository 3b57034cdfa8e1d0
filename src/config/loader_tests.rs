//! Tests for configuration file loading.

use super::*;
use serial_test::serial;
use std::env;
use std::fs;

/// RAII guard removing an environment variable on drop.
struct EnvGuard(&'static str);

impl EnvGuard {
    fn new(name: &'static str) -> Self {
        env::remove_var(name);
        EnvGuard(name)
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        env::remove_var(self.0);
    }
}

fn write_temp(name: &str, contents: &str) -> PathBuf {
    let path = env::temp_dir().join(name);
    fs::write(&path, contents).expect("Failed to write test config");
    path
}

#[test]
fn default_config_path_points_at_vcontent_config_toml() {
    let path = default_config_path().expect("Should have default path");
    let path_str = path.to_string_lossy();
    assert!(
        path_str.contains("vcontent") && path_str.ends_with("config.toml"),
        "unexpected default config path: {}",
        path_str
    );
}

#[test]
fn default_log_path_ends_with_vcontent_log() {
    let path = default_log_path();
    assert!(path.to_string_lossy().ends_with("vcontent.log"));
}

#[test]
fn load_config_file_returns_ok_none_for_missing_file() {
    let result = load_config_file("/nonexistent/path/to/config.toml");
    assert_eq!(result, Ok(None));
}

#[test]
fn load_config_file_parses_valid_toml() {
    let path = write_temp(
        "vcontent_test_config.toml",
        r#"
chunk_size = 4096
threshold = 3
append = true
content_type = "text"
scroll_throttle_ms = 75
log_file_path = "/tmp/custom.log"
"#,
    );

    let config = load_config_file(&path).unwrap().expect("file exists");
    assert_eq!(config.chunk_size, Some(4096));
    assert_eq!(config.threshold, Some(3));
    assert_eq!(config.append, Some(true));
    assert_eq!(config.content_type, Some(ContentType::Text));
    assert_eq!(config.scroll_throttle_ms, Some(75));
    assert_eq!(config.log_file_path, Some(PathBuf::from("/tmp/custom.log")));

    fs::remove_file(path).ok();
}

#[test]
fn load_config_file_returns_error_for_invalid_toml() {
    let path = write_temp("vcontent_test_invalid.toml", "this is not valid TOML ][}{");

    match load_config_file(&path) {
        Err(ConfigError::ParseError { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("Expected ParseError, got {:?}", other),
    }

    fs::remove_file(path).ok();
}

#[test]
fn config_file_rejects_unknown_fields() {
    let result: Result<ConfigFile, _> = toml::from_str("chunk_size = 10\nwrap = true\n");
    assert!(result.is_err());
}

#[test]
fn config_file_rejects_unknown_content_type() {
    let result: Result<ConfigFile, _> = toml::from_str("content_type = \"markdown\"\n");
    assert!(result.is_err());
}

#[test]
fn merge_config_uses_defaults_when_none() {
    assert_eq!(merge_config(None), ResolvedConfig::default());
}

#[test]
fn merge_config_keeps_defaults_for_missing_fields() {
    let resolved = merge_config(Some(ConfigFile {
        threshold: Some(5),
        ..ConfigFile::default()
    }));
    let defaults = ResolvedConfig::default();

    assert_eq!(resolved.threshold, 5);
    assert_eq!(resolved.chunk_size, defaults.chunk_size);
    assert_eq!(resolved.content_type, defaults.content_type);
    assert_eq!(resolved.scroll_throttle, defaults.scroll_throttle);
    assert_eq!(resolved.log_file_path, defaults.log_file_path);
}

#[test]
fn resolved_config_default_has_expected_values() {
    let config = ResolvedConfig::default();
    assert_eq!(config.chunk_size, 10_240);
    assert_eq!(config.threshold, 2);
    assert!(!config.append);
    assert_eq!(config.content_type, ContentType::Html);
    assert_eq!(config.scroll_throttle, Duration::from_millis(150));
}

#[test]
fn content_config_carries_resolved_values() {
    let resolved = ResolvedConfig {
        chunk_size: 64,
        threshold: 4,
        append: true,
        content_type: ContentType::Text,
        scroll_throttle: Duration::from_millis(20),
        log_file_path: default_log_path(),
    };

    let content = resolved.content_config();
    assert_eq!(content.chunk_size, 64);
    assert_eq!(content.threshold, 4);
    assert_eq!(content.mode, WindowMode::Append);
    assert_eq!(content.content_type, ContentType::Text);
    assert_eq!(content.scroll_throttle, Duration::from_millis(20));
}

#[test]
fn cli_overrides_win_and_leave_unset_fields() {
    let base = merge_config(Some(ConfigFile {
        chunk_size: Some(100),
        threshold: Some(7),
        ..ConfigFile::default()
    }));
    let cli = CliOverrides {
        chunk_size: Some(50),
        content_type: Some(ContentType::Text),
        scroll_throttle_ms: Some(0),
        ..CliOverrides::default()
    };

    let result = apply_cli_overrides(base, &cli);
    assert_eq!(result.chunk_size, 50);
    assert_eq!(result.threshold, 7);
    assert_eq!(result.content_type, ContentType::Text);
    assert_eq!(result.scroll_throttle, Duration::ZERO);
}

#[test]
#[serial(vcontent_env)]
fn env_overrides_apply_numeric_values() {
    let _chunk = EnvGuard::new(CHUNK_SIZE_ENV);
    let _threshold = EnvGuard::new(THRESHOLD_ENV);
    env::set_var(CHUNK_SIZE_ENV, "2048");
    env::set_var(THRESHOLD_ENV, " 6 ");

    let result = apply_env_overrides(ResolvedConfig::default());
    assert_eq!(result.chunk_size, 2048);
    assert_eq!(result.threshold, 6);
}

#[test]
#[serial(vcontent_env)]
fn env_overrides_ignore_garbage() {
    let _chunk = EnvGuard::new(CHUNK_SIZE_ENV);
    let _threshold = EnvGuard::new(THRESHOLD_ENV);
    env::set_var(CHUNK_SIZE_ENV, "big");

    let base = ResolvedConfig::default();
    assert_eq!(apply_env_overrides(base.clone()), base);
}

#[test]
#[serial(vcontent_env)]
fn env_overrides_no_change_when_unset() {
    let _chunk = EnvGuard::new(CHUNK_SIZE_ENV);
    let _threshold = EnvGuard::new(THRESHOLD_ENV);

    let base = ResolvedConfig::default();
    assert_eq!(apply_env_overrides(base.clone()), base);
}

#[test]
#[serial(vcontent_config)]
fn load_config_with_precedence_prefers_explicit_path() {
    let _guard = EnvGuard::new(CONFIG_ENV);
    let explicit = write_temp("vcontent_explicit.toml", "threshold = 9\n");
    let from_env = write_temp("vcontent_env.toml", "threshold = 1\n");
    env::set_var(CONFIG_ENV, &from_env);

    let config = load_config_with_precedence(Some(explicit.clone()))
        .unwrap()
        .unwrap();
    assert_eq!(config.threshold, Some(9));

    fs::remove_file(explicit).ok();
    fs::remove_file(from_env).ok();
}

#[test]
#[serial(vcontent_config)]
fn load_config_with_precedence_uses_env_var_when_no_explicit_path() {
    let _guard = EnvGuard::new(CONFIG_ENV);
    let from_env = write_temp("vcontent_env_only.toml", "append = true\n");
    env::set_var(CONFIG_ENV, &from_env);

    let config = load_config_with_precedence(None).unwrap().unwrap();
    assert_eq!(config.append, Some(true));

    fs::remove_file(from_env).ok();
}

#[test]
#[serial(vcontent_config, vcontent_env)]
fn resolve_applies_full_precedence_chain() {
    let _config = EnvGuard::new(CONFIG_ENV);
    let _chunk = EnvGuard::new(CHUNK_SIZE_ENV);
    let _threshold = EnvGuard::new(THRESHOLD_ENV);

    let path = write_temp(
        "vcontent_chain.toml",
        "chunk_size = 100\nthreshold = 3\nappend = true\n",
    );
    env::set_var(THRESHOLD_ENV, "4");
    let cli = CliOverrides {
        append: Some(false),
        ..CliOverrides::default()
    };

    let resolved = resolve(Some(path.clone()), &cli).unwrap();
    assert_eq!(resolved.chunk_size, 100);
    assert_eq!(resolved.threshold, 4);
    assert!(!resolved.append);

    fs::remove_file(path).ok();
}
