//! Configuration loading tests

mod common;
use common::*;

use modrouter::config::MODULES_DIR_ENV;
use modrouter::{DispatchConfig, HandlerRegistry, Request, Router};
use serial_test::serial;
use std::fs;
use std::path::PathBuf;

#[test]
fn test_load_toml_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("modrouter.toml");
    fs::write(
        &path,
        r#"
[modules]
modules_dir = "plugins"
app_root = "/srv/app"

[logging]
filter = "modrouter=debug"
json_format = true

[instrumentation]
enabled = false
"#,
    )
    .unwrap();

    let config = DispatchConfig::from_file(&path).unwrap();
    assert_eq!(
        config.modules.source_dirs(),
        vec![PathBuf::from("/srv/app/plugins"), PathBuf::from("/srv/app/native")]
    );
    let logging = config.logging.as_ref().unwrap();
    assert_eq!(logging.filter.as_deref(), Some("modrouter=debug"));
    assert!(logging.json_format);
    assert!(!config.instrumentation.enabled);
    assert_eq!(config.instrumentation.max_samples, 1000);
}

#[test]
fn test_json_round_trip_through_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("modrouter.json");
    let mut config = DispatchConfig::default();
    config.modules.native_subdir = "builtin".to_string();
    config.to_json_file(&path).unwrap();

    let loaded = DispatchConfig::from_file(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_malformed_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(&path, "[modules\nmodules_dir = 3").unwrap();
    assert!(DispatchConfig::from_toml_file(&path).is_err());
    assert!(DispatchConfig::from_toml_file(&dir.path().join("absent.toml")).is_err());
}

#[test]
#[serial]
fn test_env_overrides_modules_dir() {
    let tree = ModuleTree::new();
    let alt = tree.root().join("alt");
    fs::create_dir_all(alt.join("blog")).unwrap();

    let mut config = tree.config();
    std::env::set_var(MODULES_DIR_ENV, alt.to_string_lossy().as_ref());
    config.apply_env_overrides();
    std::env::remove_var(MODULES_DIR_ENV);

    assert_eq!(config.modules.user_modules_dir(), alt);
    let router = Router::from_config(&config, HandlerRegistry::with_builtins());
    assert!(router.module("blog").is_some());
}

#[test]
#[serial]
fn test_blank_env_value_ignored() {
    let mut config = DispatchConfig::default();
    std::env::set_var(MODULES_DIR_ENV, "  ");
    config.apply_env_overrides();
    std::env::remove_var(MODULES_DIR_ENV);
    assert_eq!(config.modules.modules_dir, "modules");
}

#[test]
fn test_router_without_instrumentation() {
    let tree = ModuleTree::new();
    tree.add_module("shop", &static_manifest("shop", "/shop", "items", "ok"));
    let mut config = tree.config();
    config.instrumentation.enabled = false;

    let router = Router::from_config(&config, HandlerRegistry::with_builtins());
    let response = router.dispatch(&mut Request::new("GET", "/shop/items"));
    assert_eq!(response.body_text(), "ok");
}
