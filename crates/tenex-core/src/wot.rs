//! Web of trust: harvesting contact lists and summarising follow edges

use std::fmt;

use serde::Serialize;

use crate::db::{Database, InfluentialFollower};
use crate::error::Result;
use crate::event::{kind, Event};
use crate::keys::encode_npub;
use crate::profile::Profile;
use crate::relay::{EventSource, Filter};
use crate::users::KnownUsers;

/// Authors per request when fetching profiles of unknown follows.
pub const AUTHOR_CHUNK: usize = 250;
const TOP_FOLLOWERS: usize = 5;

/// Counts from one `refresh_follow_list` run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RefreshReport {
    pub follows: usize,
    pub unknown: usize,
    pub profiles: usize,
    pub contact_lists: usize,
}

impl fmt::Display for RefreshReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Stored {} follows; fetched {} profiles and {} contact lists for {} unknown users",
            self.follows, self.profiles, self.contact_lists, self.unknown
        )
    }
}

fn followed_pubkeys(event: &Event) -> Vec<String> {
    event
        .tag_values("p")
        .into_iter()
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Fetch `pubkey`'s contact list and store its edges, then pull profiles
/// and contact lists of every follow not yet known.
pub fn refresh_follow_list(
    source: &(impl EventSource + ?Sized),
    db: &mut Database,
    users: &mut KnownUsers,
    pubkey: &str,
) -> Result<RefreshReport> {
    let filter = Filter::new()
        .kind(kind::CONTACTS)
        .authors([pubkey.to_string()]);
    let Some(contacts) = source
        .fetch_events(&filter)?
        .into_iter()
        .max_by_key(|e| e.created_at)
    else {
        tracing::warn!(pubkey, "no contact list found");
        return Ok(RefreshReport::default());
    };

    let follows = followed_pubkeys(&contacts);
    db.add_follows(pubkey, &follows)?;

    let unknown: Vec<String> = follows
        .iter()
        .filter(|p| !users.contains(p))
        .cloned()
        .collect();
    let mut report = RefreshReport {
        follows: follows.len(),
        unknown: unknown.len(),
        ..RefreshReport::default()
    };

    for chunk in unknown.chunks(AUTHOR_CHUNK) {
        let filter = Filter::new()
            .kinds([kind::METADATA, kind::CONTACTS])
            .authors(chunk.iter().cloned());
        let mut events = source.fetch_events(&filter)?;
        events.sort_by_key(|e| e.created_at);

        for event in events {
            match event.kind {
                kind::METADATA => {
                    let profile = Profile::from_content(&event.content);
                    users.remember(db, &event.pubkey, profile, event.content)?;
                    report.profiles += 1;
                }
                kind::CONTACTS => {
                    db.add_follows(&event.pubkey, &followed_pubkeys(&event))?;
                    report.contact_lists += 1;
                }
                _ => {}
            }
        }
    }

    tracing::info!(
        follows = report.follows,
        unknown = report.unknown,
        profiles = report.profiles,
        "follow list refreshed"
    );
    Ok(report)
}

/// Web-of-trust numbers for one pubkey
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WotSummary {
    pub name: String,
    pub pubkey: String,
    pub npub: String,
    pub followers: i64,
    pub following: usize,
    pub ratio: Option<f64>,
    pub influential: Vec<NamedFollower>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedFollower {
    pub name: String,
    #[serde(flatten)]
    pub follower: InfluentialFollower,
}

pub fn wot_summary(db: &Database, users: &KnownUsers, pubkey: &str) -> Result<WotSummary> {
    let followers = db.follower_count(pubkey)?;
    let following = db.following(pubkey)?.len();
    let ratio = (following > 0).then(|| followers as f64 / following as f64);

    let influential = if followers > 0 {
        db.influential_followers(pubkey, TOP_FOLLOWERS)?
            .into_iter()
            .map(|follower| NamedFollower {
                name: users
                    .name(&follower.pubkey)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("{}...", short(&follower.pubkey))),
                follower,
            })
            .collect()
    } else {
        Vec::new()
    };

    Ok(WotSummary {
        name: users.name(pubkey).unwrap_or(pubkey).to_string(),
        pubkey: pubkey.to_string(),
        npub: encode_npub(pubkey)?,
        followers,
        following,
        ratio,
        influential,
    })
}

fn short(pubkey: &str) -> &str {
    pubkey.get(..8).unwrap_or(pubkey)
}

impl WotSummary {
    pub fn render(&self) -> String {
        let ratio = self
            .ratio
            .map(|r| format!("{:.2}", r))
            .unwrap_or_else(|| "N/A".to_string());
        let mut lines = vec![
            format!("Web of Trust for {}:", self.name),
            format!("Pubkey: {}", self.pubkey),
            format!("Npub: {}", self.npub),
            format!("Followers: {}", self.followers),
            format!("Following: {}", self.following),
            format!("Follower/Following Ratio: {}", ratio),
        ];
        if !self.influential.is_empty() {
            lines.push("\nMost influential followers:".to_string());
            for f in &self.influential {
                lines.push(format!(
                    "- {} (followed by {} users)",
                    f.name, f.follower.followed_by
                ));
            }
        }
        lines.join("\n")
    }
}
