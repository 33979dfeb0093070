use std::fs;

use forecast_config::{Config, ConfigError, ConfigManager, EngineKind};
use tempfile::tempdir;

#[test]
fn default_config_has_non_empty_fields() {
    let cfg = Config::default();

    assert!(!cfg.currency.is_empty());
    assert!(!cfg.locale.is_empty());
    assert!(!cfg.sheet_name.is_empty());
    assert_eq!(cfg.horizon_fallback_days, 365);
    assert_eq!(cfg.engine.settings.custom_seasonalities[0].name, "monthly");
}

#[test]
fn config_manager_persists_and_loads_config() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::new(dir.path().join("nested").join("config.json"));

    let mut cfg = Config::default();
    cfg.sheet_name = "VEND".to_string();
    cfg.locale = "it-IT".to_string();
    cfg.target_year = Some(2026);
    cfg.engine.kind = EngineKind::Baseline;

    manager.save(&cfg).expect("save config");
    let loaded = manager.load().expect("load config");

    assert_eq!(loaded, cfg);
    assert!(!dir.path().join("nested").join("config.json.tmp").exists());
}

#[test]
fn missing_file_loads_defaults() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::new(dir.path().join("absent.json"));

    assert_eq!(manager.load().expect("defaults"), Config::default());
}

#[test]
fn malformed_file_is_a_serde_error() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("config.json");
    fs::write(&path, "{ not json").expect("write");

    let result = ConfigManager::new(path).load();
    assert!(matches!(result, Err(ConfigError::Serde(_))));
}

#[test]
fn init_refuses_to_overwrite_without_force() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{ "sheet_name": "Mine" }"#).expect("write");
    let manager = ConfigManager::new(path.clone());

    assert!(matches!(manager.init(false), Err(ConfigError::Invalid(_))));
    assert_eq!(manager.load().expect("load").sheet_name, "Mine");

    manager.init(true).expect("forced init");
    assert_eq!(manager.load().expect("load"), Config::default());
}
