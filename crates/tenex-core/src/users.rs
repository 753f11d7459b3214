//! Known users: profile lookup, identifier resolution, local identities

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::json;

use crate::config::{Config, UserEntry};
use crate::db::Database;
use crate::error::{Result, TenexError};
use crate::event::{kind, UnsignedEvent};
use crate::keys::{self, Keys};
use crate::profile::Profile;
use crate::relay::EventPublisher;

/// A cached profile with the raw kind-0 content it was parsed from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnownUser {
    pub profile: Profile,
    pub data: String,
}

/// In-memory profile cache keyed by hex pubkey, backed by the `profiles` table
#[derive(Debug, Clone, Default)]
pub struct KnownUsers {
    users: BTreeMap<String, KnownUser>,
}

impl KnownUsers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(db: &Database) -> Result<Self> {
        let users = db
            .load_profiles()?
            .into_iter()
            .map(|stored| {
                (
                    stored.pubkey,
                    KnownUser {
                        profile: stored.profile,
                        data: stored.data,
                    },
                )
            })
            .collect::<BTreeMap<_, _>>();
        tracing::debug!(count = users.len(), "known users loaded");
        Ok(Self { users })
    }

    pub fn get(&self, pubkey: &str) -> Option<&KnownUser> {
        self.users.get(pubkey)
    }

    pub fn contains(&self, pubkey: &str) -> bool {
        self.users.contains_key(pubkey)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Profile `name` of a known user.
    pub fn name(&self, pubkey: &str) -> Option<&str> {
        self.get(pubkey)
            .and_then(|u| u.profile.name.as_deref())
            .filter(|n| !n.is_empty())
    }

    /// Cache a profile and persist it.
    pub fn remember(
        &mut self,
        db: &Database,
        pubkey: &str,
        profile: Profile,
        data: String,
    ) -> Result<()> {
        db.save_profile(pubkey, &profile, &data)?;
        self.users
            .insert(pubkey.to_string(), KnownUser { profile, data });
        Ok(())
    }

    /// Pubkeys whose raw profile content contains `query` (case-insensitive).
    /// Falls back to the database when nothing cached matches.
    pub fn query(&self, db: &Database, query: &str) -> Result<Vec<String>> {
        let lower = query.to_lowercase();
        let cached: Vec<String> = self
            .users
            .iter()
            .filter(|(_, user)| user.data.to_lowercase().contains(&lower))
            .map(|(pubkey, _)| pubkey.clone())
            .collect();
        if !cached.is_empty() {
            return Ok(cached);
        }
        db.search_profiles(&lower)
    }

    /// `npub…` decodes, 64-hex passes through, anything else is a profile query.
    pub fn resolve_identifier(&self, db: &Database, identifier: &str) -> Result<Vec<String>> {
        if identifier.starts_with("npub") {
            return Ok(vec![keys::decode_npub(identifier)?]);
        }
        if keys::looks_like_hex_pubkey(identifier) {
            return Ok(vec![identifier.to_lowercase()]);
        }
        self.query(db, identifier)
    }

    /// `Npub:` line, then `Name:`, `About:`, `Picture:` when known.
    pub fn format_user(&self, pubkey: &str) -> Result<String> {
        let mut lines = vec![format!("Npub: {}", keys::encode_npub(pubkey)?)];
        if let Some(profile) = self.get(pubkey).map(|u| &u.profile) {
            let fields = [
                ("Name", &profile.name),
                ("About", &profile.about),
                ("Picture", &profile.picture),
            ];
            for (label, value) in fields {
                if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                    lines.push(format!("{}: {}", label, value));
                }
            }
        }
        Ok(lines.join("\n"))
    }

    /// Text result for a user search.
    pub fn find_user(&self, db: &Database, query: &str) -> Result<String> {
        let pubkeys = self.query(db, query)?;
        if pubkeys.is_empty() {
            return Ok("No users found matching the query.".to_string());
        }
        let formatted = pubkeys
            .iter()
            .map(|pubkey| self.format_user(pubkey))
            .collect::<Result<Vec<_>>>()?;
        Ok(format!(
            "Found {} users:\n\n{}",
            pubkeys.len(),
            formatted.join("\n\n---\n\n")
        ))
    }
}

/// A configured identity with its public key
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Username {
    pub username: String,
    pub display_name: String,
    pub npub: String,
}

pub fn list_usernames(config: &Config) -> Result<Vec<Username>> {
    config
        .users
        .iter()
        .map(|(username, entry)| {
            let npub = Keys::parse(&entry.nsec)
                .and_then(|k| k.npub())
                .map_err(|e| TenexError::invalid_value(&format!("key for user {}", username), e))?;
            Ok(Username {
                username: username.clone(),
                display_name: entry.display_name.clone(),
                npub,
            })
        })
        .collect()
}

pub fn format_usernames(users: &[Username]) -> String {
    if users.is_empty() {
        return "No users found. Try creating a user with `tenex-tools users create` first."
            .to_string();
    }
    let lines: Vec<String> = users
        .iter()
        .map(|u| format!("{} - {}", u.display_name, u.npub))
        .collect();
    format!("Available users ({}):\n{}", users.len(), lines.join("\n"))
}

/// Result of creating a local identity
#[derive(Debug, Clone, Serialize)]
pub struct CreatedUser {
    pub username: String,
    pub pubkey: String,
    pub npub: String,
    pub profile_event_id: String,
}

/// Generate keys for `username`, publish its kind-0 profile, then store it
/// in the config.
pub fn create_user(
    config: &mut Config,
    publisher: &(impl EventPublisher + ?Sized),
    username: &str,
    display_name: &str,
    about: Option<&str>,
) -> Result<CreatedUser> {
    if username.trim().is_empty() {
        crate::bail_usage!("username must not be empty");
    }
    if config.get_user(username).is_some() {
        crate::bail_invalid!("username", format!("\"{}\" already exists", username));
    }

    let keys = Keys::generate();
    let content = json!({
        "display_name": display_name,
        "name": display_name,
        "about": about.unwrap_or(""),
    })
    .to_string();
    let event = UnsignedEvent::new(kind::METADATA, content, Vec::new()).sign(&keys)?;
    publisher.publish(&event)?;

    config.save_user(
        username,
        UserEntry {
            nsec: keys.nsec()?,
            display_name: display_name.to_string(),
            about: about.unwrap_or("").to_string(),
            picture: None,
        },
    )?;

    let created = CreatedUser {
        username: username.to_string(),
        pubkey: keys.public_key_hex(),
        npub: keys.npub()?,
        profile_event_id: event.id,
    };
    tracing::info!(username, pubkey = %created.pubkey, "created user");
    Ok(created)
}
