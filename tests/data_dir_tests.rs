//! Tests for the SIDEROLL_DATA_DIR override
//!
//! Kept in its own test binary because it changes the process environment.

use std::time::{SystemTime, UNIX_EPOCH};

use sideroll::roller::types::{ConfigDatabase, ConfigStore, DiceConfig, DATA_DIR_ENV};

#[test]
fn test_data_dir_env_override() {
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let dir = std::env::temp_dir().join(format!("sideroll-env-{}", ts));
    std::env::set_var(DATA_DIR_ENV, &dir);

    let resolved = ConfigDatabase::data_dir().unwrap();
    assert_eq!(resolved, dir);
    assert!(dir.is_dir());

    {
        let store = ConfigStore::open().unwrap();
        store.save(&DiceConfig::new(12)).unwrap();
    }
    assert!(dir.join("sideroll.surrealdb").is_dir());

    std::env::remove_var(DATA_DIR_ENV);
    let _ = std::fs::remove_dir_all(&dir);
}
