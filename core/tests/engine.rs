//! Startup from configuration, system views and the synthetic generator.

mod common;

use common::{fixture_csv, fixture_engine};
use ledgerscope_core::{
    config::{parse_toggle, EngineConfig, DEFAULT_DATA_PATH, DEFAULT_TEST_DATA_PATH},
    engine::{format_uptime, DataEngine, ENGINE_VERSION},
    error::Violation,
    loader,
    synthetic::{self, SyntheticConfig},
};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("ledgerscope-{}-{name}", std::process::id()))
}

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key: &str| map.get(key).cloned()
}

#[test]
fn config_defaults_when_environment_is_empty() {
    let config = EngineConfig::from_lookup(lookup(&[]));
    assert_eq!(config, EngineConfig::default());
    assert!(!config.test_mode);
    assert_eq!(config.dataset_path(), DEFAULT_DATA_PATH);
}

#[test]
fn test_mode_switches_dataset() {
    let config = EngineConfig::from_lookup(lookup(&[
        ("TEST_MODE", "yes"),
        ("DATA_PATH", "/srv/full.csv"),
        ("TEST_DATA_PATH", "/srv/small.csv"),
        ("LOG_LEVEL", "WARN"),
    ]));
    assert!(config.test_mode);
    assert_eq!(config.dataset_path(), "/srv/small.csv");
    assert_eq!(config.log_level, "warn");

    let test = EngineConfig::default_test();
    assert_eq!(test.dataset_path(), DEFAULT_TEST_DATA_PATH);
}

#[test]
fn toggle_spellings() {
    for on in ["1", "true", "TRUE", "Yes", " yes "] {
        assert!(parse_toggle(on), "{on:?}");
    }
    for off in ["0", "false", "no", "", "2", "enabled"] {
        assert!(!parse_toggle(off), "{off:?}");
    }
}

#[test]
fn config_file_fills_missing_fields_with_defaults() {
    let path = temp_path("config.json");
    std::fs::write(&path, r#"{ "test_mode": true, "test_data_path": "fixture.csv" }"#).unwrap();
    let config = EngineConfig::load(path.to_str().unwrap()).unwrap();
    std::fs::remove_file(&path).ok();

    assert!(config.test_mode);
    assert_eq!(config.dataset_path(), "fixture.csv");
    assert_eq!(config.data_path, DEFAULT_DATA_PATH);

    assert!(EngineConfig::load("/no/such/config.json").is_err());
}

#[test]
fn engine_loads_the_configured_dataset() {
    let path = temp_path("engine.csv");
    std::fs::write(&path, fixture_csv()).unwrap();
    let config = EngineConfig {
        test_data_path: path.to_string_lossy().into_owned(),
        ..EngineConfig::default_test()
    };
    let engine = DataEngine::load(&config).unwrap();
    std::fs::remove_file(&path).ok();

    assert!(engine.test_mode());
    assert_eq!(engine.store().len(), 10);
    assert_eq!(engine.overview().total_transactions, 10);
}

#[test]
fn engine_refuses_to_start_on_a_bad_source() {
    let config = EngineConfig {
        data_path: "/no/such/dataset.csv".into(),
        ..EngineConfig::default()
    };
    let err = DataEngine::load(&config).err().expect("load must fail");
    assert!(matches!(
        &err.violations[..],
        [Violation::SourceUnavailable { .. }]
    ));
}

#[test]
fn health_and_metadata() {
    let engine = fixture_engine(true);
    let health = engine.health();
    assert_eq!(health.status, "ok");
    assert!(health.dataset_loaded);
    assert!(health.uptime.ends_with('s'));

    let meta = engine.metadata();
    assert_eq!(meta.version, ENGINE_VERSION);
    assert!(meta.test_mode);
    assert_eq!(meta.total_transactions, 10);
}

#[test]
fn readers_share_the_engine_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<DataEngine>();

    let engine = Arc::new(fixture_engine(true));
    let readers: Vec<_> = (0..4)
        .map(|_| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                for _ in 0..50 {
                    assert_eq!(engine.overview().total_transactions, 10);
                    let _ = engine.get_transaction("tx_0000004");
                    assert!(engine.store().len() >= 9);
                }
            })
        })
        .collect();
    engine.delete("tx_0000004").unwrap();
    for r in readers {
        r.join().unwrap();
    }
    assert_eq!(engine.store().len(), 9);
}

#[test]
fn uptime_formatting() {
    assert_eq!(format_uptime(0), "0s");
    assert_eq!(format_uptime(59), "59s");
    assert_eq!(format_uptime(61), "1min 1s");
    assert_eq!(format_uptime(3_600), "1h 0min");
    assert_eq!(format_uptime(7_384), "2h 3min");
}

#[test]
fn synthetic_generation_is_deterministic() {
    let config = SyntheticConfig::default();
    let a = synthetic::generate(&config);
    let b = synthetic::generate(&config);
    assert_eq!(a, b);
    assert_eq!(a.len(), config.rows);

    let other = synthetic::generate(&SyntheticConfig { seed: 7, ..config.clone() });
    assert_ne!(a, other);
}

#[test]
fn synthetic_rows_keep_the_dataset_shape() {
    let config = SyntheticConfig {
        rows: 2_000,
        fraud_rate: 0.2,
        ..SyntheticConfig::default()
    };
    let records = synthetic::generate(&config);

    assert_eq!(records[0].id, "tx_0000000");
    assert!(records.windows(2).all(|w| w[0].step <= w[1].step));
    assert!(records.iter().all(|r| (1..=config.steps).contains(&r.step)));
    assert!(records.iter().all(|r| r.amount >= 0.0 && r.origin_balance_after >= 0.0));
    assert!(records
        .iter()
        .filter(|r| r.is_fraud)
        .all(|r| r.txn_type.is_cash_exit()));
    assert!(records
        .iter()
        .filter(|r| r.is_flagged_fraud)
        .all(|r| r.is_fraud));
    assert!(records.iter().any(|r| r.is_fraud));
}

#[test]
fn synthetic_csv_loads_back_unchanged() {
    let records = synthetic::generate(&SyntheticConfig {
        rows: 300,
        ..SyntheticConfig::default()
    });
    let mut buffer = Vec::new();
    synthetic::write_csv(&records, &mut buffer).unwrap();

    let loaded = loader::load_from_reader(buffer.as_slice(), "synthetic").unwrap();
    assert_eq!(loaded, records);
}

#[test]
fn synthetic_generation_survives_extreme_sizes() {
    let config = SyntheticConfig {
        rows: 50,
        customers: u64::MAX,
        steps: u64::MAX,
        fraud_rate: 2.0,
        ..SyntheticConfig::default()
    };
    let records = synthetic::generate(&config);
    assert_eq!(records.len(), 50);
    assert!(records.iter().all(|r| r.step >= 1));
    assert!(records.windows(2).all(|w| w[0].step <= w[1].step));
    assert!(records
        .iter()
        .filter(|r| r.txn_type.is_cash_exit())
        .all(|r| r.is_fraud));

    let engine = DataEngine::from_records(records, false);
    assert_eq!(engine.overview().total_transactions, 50);
}

#[test]
fn engine_over_an_empty_dataset() {
    let engine = DataEngine::from_records(Vec::new(), false);
    assert!(engine.store().is_empty());
    assert_eq!(engine.metadata().total_transactions, 0);
    assert_eq!(engine.overview().most_common_type, "N/A");
    assert!(engine.recent(10).is_empty());
}
