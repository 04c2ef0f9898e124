//! Configuration loading tests
//!
//! Environment variables are process-global, so every test here is serial.

use poolguard::config;
use serial_test::serial;

#[test]
#[serial]
fn load_uses_defaults_when_nothing_is_set() {
    let loaded = config::load().expect("defaults should load");
    assert_eq!(loaded.app.name, "poolguard");
    assert_eq!(loaded.server.port, 5000);
    assert_eq!(loaded.retry.max_attempts, 10);
    assert_eq!(loaded.retry.base_delay, 5000);
    assert_eq!(loaded.retry.max_delay, 30000);
    assert_eq!(loaded.database.max_connections, 20);
}

#[test]
#[serial]
fn environment_variables_override_defaults() {
    unsafe {
        std::env::set_var("POOLGUARD__DATABASE__HOST", "db.internal");
        std::env::set_var("POOLGUARD__RETRY__MAX_ATTEMPTS", "4");
    }

    let loaded = config::load().expect("config should load");

    unsafe {
        std::env::remove_var("POOLGUARD__DATABASE__HOST");
        std::env::remove_var("POOLGUARD__RETRY__MAX_ATTEMPTS");
    }

    assert_eq!(loaded.database.host, "db.internal");
    assert_eq!(loaded.retry.max_attempts, 4);
}

#[test]
#[serial]
fn invalid_values_are_rejected() {
    unsafe {
        std::env::set_var("POOLGUARD__RETRY__MAX_ATTEMPTS", "0");
    }

    let result = config::load();

    unsafe {
        std::env::remove_var("POOLGUARD__RETRY__MAX_ATTEMPTS");
    }

    assert!(result.is_err());
}
