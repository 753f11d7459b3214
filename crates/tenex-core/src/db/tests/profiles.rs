use crate::db::Database;
use crate::profile::Profile;

fn profile(name: &str) -> Profile {
    Profile {
        name: Some(name.to_string()),
        ..Default::default()
    }
}

#[test]
fn test_save_and_load_profiles() {
    let db = Database::open_in_memory().unwrap();
    db.save_profile("pk1", &profile("alice"), r#"{"name":"alice"}"#)
        .unwrap();
    db.save_profile("pk2", &profile("bob"), r#"{"name":"bob"}"#)
        .unwrap();

    let loaded = db.load_profiles().unwrap();
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded[0].pubkey, "pk1");
    assert_eq!(loaded[0].profile.name.as_deref(), Some("alice"));
    assert_eq!(loaded[1].data, r#"{"name":"bob"}"#);
}

#[test]
fn test_save_profile_updates_existing() {
    let db = Database::open_in_memory().unwrap();
    db.save_profile("pk1", &profile("alice"), "old").unwrap();
    db.save_profile("pk1", &profile("alice2"), "new").unwrap();

    let loaded = db.load_profiles().unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].profile.name.as_deref(), Some("alice2"));
    assert_eq!(loaded[0].data, "new");
}

#[test]
fn test_search_profiles_matches_raw_data() {
    let db = Database::open_in_memory().unwrap();
    db.save_profile("pk1", &profile("Alice"), r#"{"name":"Alice","about":"Rust dev"}"#)
        .unwrap();
    db.save_profile("pk2", &profile("bob"), r#"{"name":"bob"}"#)
        .unwrap();

    assert_eq!(db.search_profiles("rust").unwrap(), vec!["pk1"]);
    assert_eq!(db.search_profiles("ALICE").unwrap(), vec!["pk1"]);
    assert!(db.search_profiles("carol").unwrap().is_empty());
}
