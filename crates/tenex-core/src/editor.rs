//! Round-tripping text through the user's editor

use std::io::Write;
use std::process::{Command, Stdio};

use crate::config::Config;
use crate::error::{Result, TenexError};

/// Used when neither the config nor `$EDITOR` names an editor.
pub const FALLBACK_EDITOR: &str = "code --wait";

/// Where the editor process reads and writes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EditorStdio {
    /// Share the terminal with the caller.
    #[default]
    Inherit,
    /// No stdin, stdout redirected to our stderr. Required when our own
    /// stdin and stdout carry a protocol stream.
    Detached,
}

/// A resolved editor command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Editor {
    program: String,
    args: Vec<String>,
    stdio: EditorStdio,
}

impl Editor {
    /// Split a shell-style command line such as `code --wait`.
    pub fn parse(command: &str) -> Result<Self> {
        let mut parts = shlex::split(command)
            .ok_or_else(|| TenexError::invalid_value("editor command", command))?
            .into_iter();
        let program = parts
            .next()
            .ok_or_else(|| TenexError::invalid_value("editor command", "(empty)"))?;
        Ok(Self {
            program,
            args: parts.collect(),
            stdio: EditorStdio::Inherit,
        })
    }

    /// Configured editor, then `$EDITOR`, then [`FALLBACK_EDITOR`].
    pub fn resolve(config: &Config) -> Result<Self> {
        let command = config
            .editor
            .clone()
            .filter(|e| !e.trim().is_empty())
            .or_else(|| std::env::var("EDITOR").ok().filter(|e| !e.trim().is_empty()))
            .unwrap_or_else(|| FALLBACK_EDITOR.to_string());
        Self::parse(&command)
    }

    pub fn with_stdio(mut self, stdio: EditorStdio) -> Self {
        self.stdio = stdio;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Write `content` to a temp file named `*.{extension}`, block until the
    /// editor exits, and return the file's new content.
    pub fn edit(&self, content: &str, extension: &str) -> Result<String> {
        let suffix = format!(".{}", sanitize_extension(extension));
        let mut file = tempfile::Builder::new()
            .prefix("snippet-")
            .suffix(&suffix)
            .tempfile()?;
        file.write_all(content.as_bytes())?;
        file.flush()?;

        tracing::debug!(editor = %self.program, path = %file.path().display(), stdio = ?self.stdio, "open_editor");
        let mut command = Command::new(&self.program);
        command.args(&self.args).arg(file.path());
        if self.stdio == EditorStdio::Detached {
            command
                .stdin(Stdio::null())
                .stdout(Stdio::from(std::io::stderr()));
        }
        let status = command
            .status()
            .map_err(|e| TenexError::FailedOperation {
                operation: format!("launch editor '{}'", self.program),
                reason: e.to_string(),
            })?;

        if !status.success() {
            return Err(TenexError::FailedOperation {
                operation: format!("edit with '{}'", self.program),
                reason: format!("editor exited with {}", status),
            });
        }

        std::fs::read_to_string(file.path())
            .map_err(|e| TenexError::io_operation("read", file.path(), e))
    }
}

fn sanitize_extension(extension: &str) -> String {
    let cleaned: String = extension
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();
    if cleaned.is_empty() {
        "txt".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_splits_arguments() {
        let editor = Editor::parse("code --wait").unwrap();
        assert_eq!(editor.program(), "code");
        assert_eq!(editor.args, vec!["--wait"]);

        let quoted = Editor::parse("'my editor' -n").unwrap();
        assert_eq!(quoted.program(), "my editor");
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert!(Editor::parse("").is_err());
        assert!(Editor::parse("'unterminated").is_err());
    }

    #[test]
    fn test_configured_editor_wins() {
        let mut config = Config::default();
        config.editor = Some("vim -n".into());
        assert_eq!(Editor::resolve(&config).unwrap().program(), "vim");
    }

    #[test]
    fn test_sanitize_extension() {
        assert_eq!(sanitize_extension("rust"), "rust");
        assert_eq!(sanitize_extension("c++"), "c");
        assert_eq!(sanitize_extension("../"), "txt");
    }

    #[cfg(unix)]
    #[test]
    fn test_edit_returns_rewritten_file() {
        let editor = Editor::parse("sh -c 'printf edited > \"$0\"'").unwrap();
        assert_eq!(editor.edit("original", "rs").unwrap(), "edited");
    }

    #[cfg(unix)]
    #[test]
    fn test_noop_editor_keeps_content() {
        let editor = Editor::parse("true").unwrap();
        assert_eq!(editor.edit("unchanged\n", "txt").unwrap(), "unchanged\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_detached_editor_gets_no_stdin() {
        let editor = Editor::parse("sh -c 'cat > \"$0\"; echo noise'")
            .unwrap()
            .with_stdio(EditorStdio::Detached);
        assert_eq!(editor.edit("original", "txt").unwrap(), "");
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_editor_is_an_error() {
        let editor = Editor::parse("false").unwrap();
        assert!(matches!(
            editor.edit("x", "txt"),
            Err(TenexError::FailedOperation { .. })
        ));
    }
}
