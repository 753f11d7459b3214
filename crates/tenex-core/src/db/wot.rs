use crate::error::Result;
use rusqlite::params;
use serde::Serialize;

/// A follower together with how many users follow them
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InfluentialFollower {
    pub pubkey: String,
    pub followed_by: i64,
}

impl super::Database {
    /// Record that `follower` follows each of `followed`. Existing edges are kept.
    pub fn add_follows(&mut self, follower: &str, followed: &[String]) -> Result<usize> {
        let tx = self
            .conn
            .transaction()
            .map_err(|e| crate::map_db_err!("start transaction", e))?;
        let mut inserted = 0;
        {
            let mut stmt =
                tx.prepare_cached("INSERT OR IGNORE INTO wot (follower, followed) VALUES (?1, ?2)")?;
            for target in followed {
                inserted += stmt.execute(params![follower, target])?;
            }
        }
        tx.commit()
            .map_err(|e| crate::map_db_err!("commit follows", e))?;
        tracing::debug!(follower, inserted, total = followed.len(), "follows stored");
        Ok(inserted)
    }

    pub fn follower_count(&self, pubkey: &str) -> Result<i64> {
        self.conn
            .query_row(
                "SELECT COUNT(DISTINCT follower) FROM wot WHERE followed = ?1",
                [pubkey],
                |r| r.get(0),
            )
            .map_err(|e| crate::map_db_err!("count followers", e))
    }

    pub fn followers(&self, pubkey: &str) -> Result<Vec<String>> {
        self.pubkey_column(
            "SELECT DISTINCT follower FROM wot WHERE followed = ?1 ORDER BY follower",
            pubkey,
        )
    }

    pub fn following(&self, pubkey: &str) -> Result<Vec<String>> {
        self.pubkey_column(
            "SELECT DISTINCT followed FROM wot WHERE follower = ?1 ORDER BY followed",
            pubkey,
        )
    }

    pub fn remove_follow(&self, follower: &str, followed: &str) -> Result<bool> {
        let removed = self
            .conn
            .execute(
                "DELETE FROM wot WHERE follower = ?1 AND followed = ?2",
                params![follower, followed],
            )
            .map_err(|e| crate::map_db_err!("remove follow", e))?;
        Ok(removed > 0)
    }

    /// Followers of `pubkey`, most-followed first.
    pub fn influential_followers(
        &self,
        pubkey: &str,
        limit: usize,
    ) -> Result<Vec<InfluentialFollower>> {
        let mut stmt = self.conn.prepare(
            "SELECT f.follower, COUNT(*) AS count
             FROM wot f
             JOIN wot f2 ON f.follower = f2.followed
             WHERE f.followed = ?1
             GROUP BY f.follower
             ORDER BY count DESC, f.follower
             LIMIT ?2",
        )?;
        let rows = stmt
            .query_map(
                params![pubkey, i64::try_from(limit).unwrap_or(i64::MAX)],
                |row| {
                    Ok(InfluentialFollower {
                        pubkey: row.get(0)?,
                        followed_by: row.get(1)?,
                    })
                },
            )?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| crate::map_db_err!("rank followers", e))?;
        Ok(rows)
    }

    fn pubkey_column(&self, sql: &str, pubkey: &str) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt
            .query_map([pubkey], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()
            .map_err(|e| crate::map_db_err!("read follow edges", e))?;
        Ok(rows)
    }
}
