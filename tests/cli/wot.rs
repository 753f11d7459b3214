use crate::cli::support::TestEnv;
use predicates::prelude::*;
use tenex_core::keys::Keys;

fn seed_follows(env: &TestEnv, edges: &[(&str, &str)]) {
    env.cmd().args(["find-user", "warmup"]).assert().success();
    let conn = rusqlite::Connection::open(env.db_path()).unwrap();
    for (follower, followed) in edges {
        conn.execute(
            "INSERT INTO wot (follower, followed) VALUES (?1, ?2)",
            [follower, followed],
        )
        .unwrap();
    }
}

// ============================================================================
// wot summary
// ============================================================================

#[test]
fn test_wot_unknown_pubkey_has_no_ratio() {
    let env = TestEnv::offline();
    let pubkey = Keys::generate().public_key_hex();

    env.cmd()
        .args(["wot", &pubkey])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("Pubkey: {}", pubkey)))
        .stdout(predicate::str::contains("Followers: 0"))
        .stdout(predicate::str::contains("Following: 0"))
        .stdout(predicate::str::contains("Follower/Following Ratio: N/A"));
}

#[test]
fn test_wot_counts_and_influential_followers() {
    let env = TestEnv::offline();
    let target = Keys::generate().public_key_hex();
    let fan = Keys::generate().public_key_hex();
    let other = Keys::generate().public_key_hex();
    let followed = Keys::generate().public_key_hex();

    seed_follows(
        &env,
        &[
            (&fan, &target),
            (&other, &target),
            (&other, &fan),
            (&target, &followed),
        ],
    );

    env.cmd()
        .args(["wot", &target])
        .assert()
        .success()
        .stdout(predicate::str::contains("Followers: 2"))
        .stdout(predicate::str::contains("Following: 1"))
        .stdout(predicate::str::contains("Follower/Following Ratio: 2.00"))
        .stdout(predicate::str::contains("Most influential followers:"))
        .stdout(predicate::str::contains(format!(
            "- {}... (followed by 1 users)",
            &fan[..8]
        )));
}

#[test]
fn test_wot_accepts_npub() {
    let env = TestEnv::offline();
    let keys = Keys::generate();

    let output = env
        .cmd()
        .args(["--format", "json", "wot"])
        .arg(keys.npub().unwrap())
        .assert()
        .success()
        .get_output()
        .clone();
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["pubkey"], keys.public_key_hex());
    assert_eq!(json["followers"], 0);
    assert!(json["ratio"].is_null());
}

#[test]
fn test_wot_invalid_pubkey_is_usage_error() {
    TestEnv::offline()
        .cmd()
        .args(["wot", "not-a-pubkey"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid pubkey format"));
}
