//! Tests for configuration resolution
//!
//! Uses serial_test: tests touching ECUTUNE_ROOT_FOLDER must not run in parallel.

use ecutune_common::config::{
    load_toml_config, CliOverrides, CompiledDefaults, LoggingConfig, RootFolderInitializer,
    RootFolderResolver, ServiceConfig, TomlConfig, ROOT_FOLDER_ENV,
};
use serial_test::serial;
use std::env;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_compiled_defaults_for_current_platform() {
    let defaults = CompiledDefaults::for_current_platform();

    assert!(!defaults.root_folder.as_os_str().is_empty());
    assert_eq!(defaults.bind_address, "127.0.0.1");
    assert_eq!(defaults.port, 5780);
    assert_eq!(defaults.log_level, "info");
}

#[test]
#[serial]
fn test_resolver_with_no_overrides_uses_default() {
    env::remove_var(ROOT_FOLDER_ENV);

    let root_folder = RootFolderResolver::new().resolve();

    assert_eq!(root_folder, CompiledDefaults::for_current_platform().root_folder);
}

#[test]
#[serial]
fn test_resolver_priority_order() {
    let toml = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/ecutune-toml")),
        ..Default::default()
    };

    env::remove_var(ROOT_FOLDER_ENV);
    let from_toml = RootFolderResolver::new().with_toml(&toml).resolve();
    assert_eq!(from_toml, PathBuf::from("/tmp/ecutune-toml"));

    env::set_var(ROOT_FOLDER_ENV, "/tmp/ecutune-env");
    let from_env = RootFolderResolver::new().with_toml(&toml).resolve();
    assert_eq!(from_env, PathBuf::from("/tmp/ecutune-env"));

    let from_cli = RootFolderResolver::new()
        .with_cli_arg(Some(PathBuf::from("/tmp/ecutune-cli")))
        .with_toml(&toml)
        .resolve();
    assert_eq!(from_cli, PathBuf::from("/tmp/ecutune-cli"));

    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
fn test_missing_toml_file_uses_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("nope.toml");

    let config = load_toml_config(Some(&missing)).unwrap();
    assert_eq!(config, TomlConfig::default());
    assert_eq!(config.logging, LoggingConfig::default());
}

#[test]
fn test_toml_file_is_parsed() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
root_folder = "/srv/ecutune"
bind_address = "0.0.0.0"
port = 8080
admin_token = "hunter2"

[logging]
level = "debug"
"#,
    )
    .unwrap();

    let config = load_toml_config(Some(&path)).unwrap();
    assert_eq!(config.root_folder, Some(PathBuf::from("/srv/ecutune")));
    assert_eq!(config.port, Some(8080));
    assert_eq!(config.admin_token.as_deref(), Some("hunter2"));
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn test_malformed_toml_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    std::fs::write(&path, "port = \"not a number").unwrap();

    let err = load_toml_config(Some(&path)).unwrap_err();
    assert!(err.to_string().contains("Configuration error"));
}

#[test]
#[serial]
fn test_service_config_cli_wins_over_toml() {
    env::remove_var(ROOT_FOLDER_ENV);

    let toml = TomlConfig {
        bind_address: Some("0.0.0.0".to_string()),
        port: Some(8080),
        admin_token: Some("from-toml".to_string()),
        ..Default::default()
    };
    let cli = CliOverrides {
        port: Some(9090),
        admin_token: Some("   ".to_string()),
        ..Default::default()
    };

    let config = ServiceConfig::resolve(cli, &toml);
    assert_eq!(config.port, 9090);
    assert_eq!(config.bind_address, "0.0.0.0");
    // Blank CLI token disables admin rather than falling back
    assert_eq!(config.admin_token, None);
    assert_eq!(config.listen_address(), "0.0.0.0:9090");
}

#[test]
fn test_root_folder_initializer_creates_directory() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("data");

    let initializer = RootFolderInitializer::new(root.clone());
    initializer.ensure_directory_exists().unwrap();

    assert!(root.is_dir());
    assert_eq!(initializer.database_path(), root.join("ecutune.db"));
}
