use crate::error::Result;
use crate::profile::Profile;
use rusqlite::params;

/// A profile row: parsed fields plus the raw kind-0 content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredProfile {
    pub pubkey: String,
    pub profile: Profile,
    pub data: String,
}

impl super::Database {
    /// Insert or update a profile, bumping `updated_at`.
    pub fn save_profile(&self, pubkey: &str, profile: &Profile, data: &str) -> Result<()> {
        let profile_json = serde_json::to_string(profile)?;
        self.conn
            .execute(
                "INSERT INTO profiles (pubkey, profile, data) VALUES (?1, ?2, ?3)
                 ON CONFLICT(pubkey) DO UPDATE SET
                     profile = excluded.profile,
                     data = excluded.data,
                     updated_at = CURRENT_TIMESTAMP",
                params![pubkey, profile_json, data],
            )
            .map_err(|e| crate::map_db_err!("save profile", e))?;
        Ok(())
    }

    /// All stored profiles. Rows whose profile JSON no longer parses are
    /// skipped with a warning.
    pub fn load_profiles(&self) -> Result<Vec<StoredProfile>> {
        let mut stmt = self
            .conn
            .prepare("SELECT pubkey, profile, data FROM profiles ORDER BY pubkey")?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| crate::map_db_err!("load profiles", e))?;

        let mut profiles = Vec::with_capacity(rows.len());
        for (pubkey, profile_json, data) in rows {
            match serde_json::from_str::<Profile>(&profile_json) {
                Ok(profile) => profiles.push(StoredProfile {
                    pubkey,
                    profile,
                    data,
                }),
                Err(e) => tracing::warn!(pubkey = %pubkey, error = %e, "skipping unreadable profile"),
            }
        }
        tracing::debug!(count = profiles.len(), "profiles loaded");
        Ok(profiles)
    }

    /// Pubkeys whose raw profile content contains `query` (case-insensitive).
    pub fn search_profiles(&self, query: &str) -> Result<Vec<String>> {
        let pattern = format!("%{}%", query.to_lowercase());
        let mut stmt = self
            .conn
            .prepare("SELECT pubkey FROM profiles WHERE data LIKE ?1 ORDER BY pubkey")?;
        let pubkeys = stmt
            .query_map([pattern], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()
            .map_err(|e| crate::map_db_err!("search profiles", e))?;
        Ok(pubkeys)
    }
}
