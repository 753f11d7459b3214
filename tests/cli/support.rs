use std::fs;
use std::path::Path;

use assert_cmd::{cargo::cargo_bin_cmd, Command};
use tempfile::TempDir;

/// Unreachable relay so no test ever talks to the network.
pub const DEAD_RELAY: &str = "ws://127.0.0.1:1";

/// A private config directory for one test
pub struct TestEnv {
    dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    /// Config pointing at [`DEAD_RELAY`] with a short timeout.
    pub fn offline() -> Self {
        let env = Self::new();
        env.write_config(&format!(
            "relays = [\"{}\"]\nrelay_timeout_secs = 1\n",
            DEAD_RELAY
        ));
        env
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write_config(&self, toml: &str) {
        fs::write(self.path().join("config.toml"), toml).unwrap();
    }

    pub fn read_config(&self) -> String {
        fs::read_to_string(self.path().join("config.toml")).unwrap()
    }

    pub fn db_path(&self) -> std::path::PathBuf {
        self.path().join("tenex.db")
    }

    /// tenex-tools bound to this config directory
    pub fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("tenex-tools");
        cmd.env("TENEX_CONFIG_DIR", self.path())
            .env_remove("EDITOR")
            .env_remove("RUST_LOG")
            .env_remove("TENEX_LOG");
        cmd
    }
}
