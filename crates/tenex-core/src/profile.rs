//! Kind-0 profile metadata

use serde::{Deserialize, Serialize};

/// Profile fields from a kind-0 event's JSON content
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub about: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nip05: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lud16: Option<String>,
}

impl Profile {
    /// Parse event content leniently; malformed JSON yields an empty profile.
    pub fn from_content(content: &str) -> Self {
        match serde_json::from_str::<Profile>(content) {
            Ok(profile) => profile,
            Err(e) => {
                tracing::debug!(error = %e, "unparseable profile content");
                Profile::default()
            }
        }
    }

    /// `name`, falling back to `display_name`.
    pub fn best_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .or_else(|| self.display_name.as_deref().filter(|n| !n.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_content_ignores_unknown_fields() {
        let profile =
            Profile::from_content(r#"{"name":"pablo","about":"nostr dev","website":"x"}"#);
        assert_eq!(profile.name.as_deref(), Some("pablo"));
        assert_eq!(profile.about.as_deref(), Some("nostr dev"));
        assert!(profile.picture.is_none());
    }

    #[test]
    fn test_malformed_content_is_empty_profile() {
        assert_eq!(Profile::from_content("not json"), Profile::default());
    }

    #[test]
    fn test_best_name_falls_back_to_display_name() {
        let profile = Profile {
            name: Some(String::new()),
            display_name: Some("Alice".into()),
            ..Default::default()
        };
        assert_eq!(profile.best_name(), Some("Alice"));
    }
}
