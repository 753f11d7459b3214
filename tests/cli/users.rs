use crate::cli::support::TestEnv;
use predicates::prelude::*;
use tenex_core::keys::Keys;

/// Run a DB-only command so the schema exists, then seed a profile row.
fn seed_profile(env: &TestEnv, pubkey: &str, content: &str) {
    env.cmd().args(["find-user", "warmup"]).assert().success();
    let conn = rusqlite::Connection::open(env.db_path()).unwrap();
    conn.execute(
        "INSERT INTO profiles (pubkey, profile, data) VALUES (?1, ?2, ?2)",
        [pubkey, content],
    )
    .unwrap();
}

// ============================================================================
// users list
// ============================================================================

#[test]
fn test_users_list_empty() {
    TestEnv::new()
        .cmd()
        .args(["users", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No users found"));
}

#[test]
fn test_users_list_configured() {
    let env = TestEnv::new();
    let keys = Keys::generate();
    env.write_config(&format!(
        "[users.alice]\nnsec = \"{}\"\ndisplay_name = \"Alice\"\n",
        keys.nsec().unwrap()
    ));

    env.cmd()
        .args(["users", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Available users (1):"))
        .stdout(predicate::str::contains(format!(
            "Alice - {}",
            keys.npub().unwrap()
        )));
}

#[test]
fn test_users_list_json() {
    let env = TestEnv::new();
    let keys = Keys::generate();
    env.write_config(&format!(
        "[users.bob]\nnsec = \"{}\"\ndisplay_name = \"Bob\"\n",
        keys.nsec().unwrap()
    ));

    let output = env
        .cmd()
        .args(["--format", "json", "users", "list"])
        .assert()
        .success()
        .get_output()
        .clone();
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json[0]["username"], "bob");
    assert_eq!(json[0]["npub"], keys.npub().unwrap());
}

// ============================================================================
// find-user
// ============================================================================

#[test]
fn test_find_user_no_match() {
    TestEnv::offline()
        .cmd()
        .args(["find-user", "nobody"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No users found matching the query."));
}

#[test]
fn test_find_user_by_cached_profile() {
    let env = TestEnv::offline();
    let keys = Keys::generate();
    seed_profile(
        &env,
        &keys.public_key_hex(),
        r#"{"name":"pablo","about":"nostr developer"}"#,
    );

    env.cmd()
        .args(["find-user", "Developer"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 1 users:"))
        .stdout(predicate::str::contains(format!(
            "Npub: {}",
            keys.npub().unwrap()
        )))
        .stdout(predicate::str::contains("Name: pablo"));
}
