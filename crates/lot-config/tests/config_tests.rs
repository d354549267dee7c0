use std::{fs, path::Path};

use lot_config::{Config, ConfigError, ConfigManager};
use tempfile::tempdir;

#[test]
fn default_config_has_non_empty_fields() {
    let cfg = Config::default();

    assert!(!cfg.currency_symbol.is_empty());
    assert_eq!(cfg.tables.vehicles, "vehicles.csv");
    assert_eq!(cfg.classifier.top_k, 3);
    assert!(cfg.classifier.command.is_none());
}

#[test]
fn config_manager_persists_and_loads_config() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path()).expect("manager");

    let mut cfg = Config::default();
    cfg.set("currency", "$").unwrap();
    cfg.set("classifier", "python3 classify.py --top 3").unwrap();

    manager.save(&cfg).expect("save config");
    let loaded = manager.load().expect("load config");

    assert_eq!(loaded.currency_symbol, "$");
    assert_eq!(loaded.classifier.command.as_deref(), Some("python3"));
    assert_eq!(loaded.classifier.args, vec!["classify.py", "--top", "3"]);
    assert_eq!(
        manager.config_path(),
        dir.path().join("config").join("config.json")
    );
}

#[test]
fn missing_fields_fall_back_to_defaults() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{ "data_dir": "/srv/parking" }"#).unwrap();

    let loaded = ConfigManager::new(path).load().expect("load partial config");
    assert_eq!(loaded.currency_symbol, "₹");
    assert!(loaded.ui_color_enabled);
    assert_eq!(
        loaded.resolve_data_dir(Path::new("/home/op/.parking_core")),
        Path::new("/srv/parking")
    );
}

#[test]
fn data_dir_defaults_under_home() {
    let cfg = Config::default();
    assert_eq!(
        cfg.resolve_data_dir(Path::new("/tmp/lot")),
        Path::new("/tmp/lot/data")
    );
}

#[test]
fn set_rejects_bad_values() {
    let mut cfg = Config::default();
    assert!(matches!(cfg.set("top_k", "0"), Err(ConfigError::Invalid(_))));
    assert!(matches!(cfg.set("color", "maybe"), Err(ConfigError::Invalid(_))));
    assert!(matches!(cfg.set("theme", "dark"), Err(ConfigError::Invalid(_))));

    cfg.set("color", "off").unwrap();
    assert!(!cfg.ui_color_enabled);
    cfg.set("top_k", "5").unwrap();
    assert_eq!(cfg.classifier.top_k, 5);
}
