use crate::cli::support::{TestEnv, DEAD_RELAY};
use predicates::prelude::*;
use tenex_core::keys::Keys;

// ============================================================================
// setup
// ============================================================================

#[test]
fn test_setup_writes_config() {
    let env = TestEnv::new();
    let keys = Keys::generate();
    let nsec = keys.nsec().unwrap();

    env.cmd()
        .args(["setup", "--private-key", &nsec, "--relay", DEAD_RELAY])
        .args(["--editor", "vim"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration saved to"))
        .stdout(predicate::str::contains(format!(
            "Main key: {}",
            keys.npub().unwrap()
        )))
        .stdout(predicate::str::contains(format!("Relays: {}", DEAD_RELAY)));

    let config = env.read_config();
    assert!(config.contains(&nsec));
    assert!(config.contains(DEAD_RELAY));
    assert!(config.contains("editor = \"vim\""));
}

#[test]
fn test_setup_keeps_existing_settings() {
    let env = TestEnv::offline();
    env.cmd()
        .args(["setup", "--editor", "nano"])
        .assert()
        .success();

    let config = env.read_config();
    assert!(config.contains(DEAD_RELAY));
    assert!(config.contains("relay_timeout_secs = 1"));
    assert!(config.contains("editor = \"nano\""));
}

#[test]
fn test_setup_normalizes_wot_from_npub() {
    let env = TestEnv::new();
    let keys = Keys::generate();

    let output = env
        .cmd()
        .args(["--format", "json", "setup", "--wot-from"])
        .arg(keys.npub().unwrap())
        .assert()
        .success()
        .get_output()
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["wot_from"], keys.public_key_hex());
    assert!(json["npub"].is_null());
    assert!(env.read_config().contains(&keys.public_key_hex()));
}

#[test]
fn test_setup_rejects_bad_key() {
    let env = TestEnv::new();
    env.cmd()
        .args(["setup", "--private-key", "not-a-key"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid key"));

    assert!(!env.path().join("config.toml").exists());
}

#[test]
fn test_setup_rejects_non_websocket_relay() {
    let env = TestEnv::new();
    env.cmd()
        .args(["setup", "--relay", "https://relay.example.com"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid relay url"));
}
