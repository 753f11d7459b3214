//! Configuration for tenex-tools (stored in ~/.config/tenex-tools/config.toml)

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TenexError};
use crate::keys::Keys;

const CONFIG_DIR: &str = "tenex-tools";
const CONFIG_FILE: &str = "config.toml";
const DB_FILE: &str = "tenex.db";
pub const CONFIG_DIR_ENV_VAR: &str = "TENEX_CONFIG_DIR";

/// Username that selects the main `private_key` signer.
pub const MAIN_USER: &str = "main";

pub const DEFAULT_RELAYS: &[&str] = &[
    "wss://relay.primal.net",
    "wss://relay.damus.io",
    "wss://nos.lol",
];

/// A locally managed identity that tools can publish as
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserEntry {
    pub nsec: String,
    pub display_name: String,
    #[serde(default)]
    pub about: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Main signing key (nsec or hex).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
    pub relays: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_path: Option<PathBuf>,
    /// Pubkey whose follow list seeds `wot refresh`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wot_from: Option<String>,
    /// MCP command keys to expose; all when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mcp_commands: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub editor: Option<String>,
    /// Open published snippets in the editor before signing.
    pub review_snippets: bool,
    pub relay_timeout_secs: u64,
    pub users: BTreeMap<String, UserEntry>,

    #[serde(skip)]
    dir: PathBuf,
    #[serde(skip)]
    dir_overridden: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            private_key: None,
            relays: DEFAULT_RELAYS.iter().map(|r| r.to_string()).collect(),
            db_path: None,
            wot_from: None,
            mcp_commands: None,
            editor: None,
            review_snippets: true,
            relay_timeout_secs: 10,
            users: BTreeMap::new(),
            dir: PathBuf::new(),
            dir_overridden: false,
        }
    }
}

impl Config {
    /// Resolve the config directory: explicit override, then
    /// `TENEX_CONFIG_DIR`, then the platform config dir.
    fn locate(dir_override: Option<&Path>) -> Result<(PathBuf, bool)> {
        if let Some(dir) = dir_override {
            return Ok((dir.to_path_buf(), true));
        }
        if let Ok(env_dir) = std::env::var(CONFIG_DIR_ENV_VAR) {
            return Ok((PathBuf::from(env_dir), true));
        }
        let dir = dirs::config_dir()
            .ok_or_else(|| TenexError::Other("unable to determine config directory".to_string()))?
            .join(CONFIG_DIR);
        Ok((dir, false))
    }

    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load from `dir_override` (or the default location). A missing file
    /// yields defaults.
    pub fn load_from(dir_override: Option<&Path>) -> Result<Self> {
        let (dir, dir_overridden) = Self::locate(dir_override)?;
        let path = dir.join(CONFIG_FILE);

        let mut config = if path.exists() {
            let content = fs::read_to_string(&path)
                .map_err(|e| TenexError::io_operation("read config", &path, e))?;
            toml::from_str::<Config>(&content)?
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Config::default()
        };

        config.dir = dir;
        config.dir_overridden = dir_overridden;
        Ok(config)
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.join(CONFIG_FILE)
    }

    pub fn save(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| TenexError::io_operation("create config directory", &self.dir, e))?;

        let content = toml::to_string_pretty(self)
            .map_err(|e| TenexError::Other(format!("failed to serialize config: {}", e)))?;

        let path = self.config_path();
        fs::write(&path, content).map_err(|e| TenexError::io_operation("write config", &path, e))?;
        tracing::debug!(path = %path.display(), "config saved");
        Ok(())
    }

    pub fn get_user(&self, username: &str) -> Option<&UserEntry> {
        self.users.get(username)
    }

    /// Store `entry` under `username` and write the file.
    pub fn save_user(&mut self, username: &str, entry: UserEntry) -> Result<()> {
        self.users.insert(username.to_string(), entry);
        self.save()
    }

    /// Database location. A relative `db_path` is resolved against the
    /// config directory; without one, the platform data dir is used unless
    /// the config dir was overridden, in which case the database lives next
    /// to the config file.
    pub fn resolved_db_path(&self) -> Result<PathBuf> {
        match &self.db_path {
            Some(path) if path.is_absolute() => Ok(path.clone()),
            Some(path) => Ok(self.dir.join(path)),
            None if self.dir_overridden => Ok(self.dir.join(DB_FILE)),
            None => Ok(dirs::data_dir()
                .ok_or_else(|| TenexError::Other("unable to determine data directory".to_string()))?
                .join(CONFIG_DIR)
                .join(DB_FILE)),
        }
    }

    pub fn relay_timeout(&self) -> Duration {
        Duration::from_secs(self.relay_timeout_secs.max(1))
    }

    /// Keys for `username`; `None` or `"main"` selects `private_key`.
    pub fn signing_keys(&self, username: Option<&str>) -> Result<Keys> {
        match username {
            None | Some(MAIN_USER) => {
                let secret = self.private_key.as_deref().ok_or(TenexError::NoSigner)?;
                Keys::parse(secret)
            }
            Some(name) => {
                let entry = self
                    .get_user(name)
                    .filter(|u| !u.nsec.is_empty())
                    .ok_or_else(|| TenexError::UnknownUser(name.to_string()))?;
                Keys::parse(&entry.nsec)
            }
        }
    }

    /// Whether an MCP command key is enabled by `mcp_commands`.
    pub fn command_enabled(&self, key: &str) -> bool {
        self.mcp_commands
            .as_ref()
            .is_none_or(|enabled| enabled.iter().any(|k| k == key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.relays.len(), 3);
        assert!(config.review_snippets);
        assert_eq!(config.relay_timeout_secs, 10);
        assert!(config.users.is_empty());
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(Some(dir.path())).unwrap();
        assert_eq!(config.config_path(), dir.path().join("config.toml"));
        assert!(config.private_key.is_none());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let mut config = Config::load_from(Some(dir.path())).unwrap();
        config.private_key = Some("ab".repeat(32));
        config.editor = Some("vim".to_string());
        config.mcp_commands = Some(vec!["snippets.find".to_string()]);
        config
            .save_user(
                "alice",
                UserEntry {
                    nsec: "nsec1xyz".to_string(),
                    display_name: "Alice".to_string(),
                    ..Default::default()
                },
            )
            .unwrap();

        let loaded = Config::load_from(Some(dir.path())).unwrap();
        assert_eq!(loaded.private_key, config.private_key);
        assert_eq!(loaded.editor.as_deref(), Some("vim"));
        assert_eq!(loaded.get_user("alice").unwrap().display_name, "Alice");
        assert!(loaded.command_enabled("snippets.find"));
        assert!(!loaded.command_enabled("note.publish"));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("config.toml"), "editor = \"nano\"\n").unwrap();
        let config = Config::load_from(Some(dir.path())).unwrap();
        assert_eq!(config.editor.as_deref(), Some("nano"));
        assert_eq!(config.relays.len(), 3);
        assert!(config.review_snippets);
        assert!(config.command_enabled("anything"));
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("config.toml"), "relays = 12 = x").unwrap();
        assert!(matches!(
            Config::load_from(Some(dir.path())),
            Err(TenexError::Toml(_))
        ));
    }

    #[test]
    fn test_db_path_resolution() {
        let dir = tempdir().unwrap();
        let mut config = Config::load_from(Some(dir.path())).unwrap();
        assert_eq!(config.resolved_db_path().unwrap(), dir.path().join("tenex.db"));

        config.db_path = Some(PathBuf::from("cache/other.db"));
        assert_eq!(
            config.resolved_db_path().unwrap(),
            dir.path().join("cache/other.db")
        );

        let absolute = dir.path().join("abs.db");
        config.db_path = Some(absolute.clone());
        assert_eq!(config.resolved_db_path().unwrap(), absolute);
    }

    #[test]
    fn test_signing_keys() {
        let dir = tempdir().unwrap();
        let mut config = Config::load_from(Some(dir.path())).unwrap();
        assert!(matches!(config.signing_keys(None), Err(TenexError::NoSigner)));

        let main = Keys::generate();
        config.private_key = Some(main.nsec().unwrap());
        assert_eq!(
            config.signing_keys(Some("main")).unwrap().public_key_hex(),
            main.public_key_hex()
        );

        assert!(matches!(
            config.signing_keys(Some("bob")),
            Err(TenexError::UnknownUser(_))
        ));

        let bob = Keys::generate();
        config.users.insert(
            "bob".to_string(),
            UserEntry {
                nsec: bob.nsec().unwrap(),
                display_name: "Bob".to_string(),
                ..Default::default()
            },
        );
        assert_eq!(
            config.signing_keys(Some("bob")).unwrap().public_key_hex(),
            bob.public_key_hex()
        );
    }
}
