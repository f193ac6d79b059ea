//! Client configuration types.
//!
//! The CLI reads and writes `cookai.toml` using these types. Locating the file
//! on disk is left to the binary.

use serde::{Deserialize, Serialize};

/// Canonical config file name.
pub const CONFIG_FILE_NAME: &str = "cookai.toml";

pub const DEFAULT_SERVER_URL: &str = "http://localhost:8000";

/// Top-level client configuration (persisted as `cookai.toml`).
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ClientConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub identity: IdentitySettings,
    #[serde(default)]
    pub chat: ChatSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerSettings {
    #[serde(default = "default_server_url")]
    pub url: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            url: default_server_url(),
        }
    }
}

/// Who the client acts as. The backend has no auth yet, so these ids are
/// sent verbatim with every request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IdentitySettings {
    #[serde(default = "default_id")]
    pub user_id: i64,
    #[serde(default = "default_id")]
    pub course_id: i64,
    #[serde(default = "default_id")]
    pub uploader_id: i64,
}

impl Default for IdentitySettings {
    fn default() -> Self {
        Self {
            user_id: default_id(),
            course_id: default_id(),
            uploader_id: default_id(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ChatSettings {
    /// Content ids selected when an interactive chat starts.
    #[serde(default)]
    pub default_sources: Vec<i64>,
}

// ── Serde default functions ─────────────────────────────────────────────

fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}
fn default_id() -> i64 {
    1
}

/// Apply compatibility fallbacks after loading raw TOML.
/// Returns true when any field was updated.
pub fn apply_compat_fallbacks(config: &mut ClientConfig) -> bool {
    let mut changed = false;

    let trimmed = config.server.url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        config.server.url = default_server_url();
        changed = true;
    } else if trimmed != config.server.url {
        config.server.url = trimmed.to_string();
        changed = true;
    }

    let mut seen = Vec::with_capacity(config.chat.default_sources.len());
    for id in &config.chat.default_sources {
        if !seen.contains(id) {
            seen.push(*id);
        }
    }
    if seen.len() != config.chat.default_sources.len() {
        config.chat.default_sources = seen;
        changed = true;
    }

    changed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_local_backend() {
        let cfg = ClientConfig::default();
        assert_eq!(cfg.server.url, "http://localhost:8000");
        assert_eq!(cfg.identity.user_id, 1);
        assert_eq!(cfg.identity.course_id, 1);
        assert_eq!(cfg.identity.uploader_id, 1);
        assert!(cfg.chat.default_sources.is_empty());
    }

    #[test]
    fn partial_toml_keeps_defaults_for_missing_fields() {
        let cfg: ClientConfig = toml::from_str(
            r#"
[identity]
user_id = 42

[chat]
default_sources = [7, 9]
"#,
        )
        .expect("parse toml");

        assert_eq!(cfg.server.url, DEFAULT_SERVER_URL);
        assert_eq!(cfg.identity.user_id, 42);
        assert_eq!(cfg.identity.course_id, 1);
        assert_eq!(cfg.chat.default_sources, vec![7, 9]);
    }

    #[test]
    fn apply_compat_fallbacks_normalizes_url_and_sources() {
        let mut cfg: ClientConfig = toml::from_str(
            r#"
[server]
url = "https://cook.example.edu//"

[chat]
default_sources = [3, 3, 5]
"#,
        )
        .expect("parse toml");

        assert!(apply_compat_fallbacks(&mut cfg));
        assert_eq!(cfg.server.url, "https://cook.example.edu");
        assert_eq!(cfg.chat.default_sources, vec![3, 5]);
    }

    #[test]
    fn apply_compat_fallbacks_restores_blank_url() {
        let mut cfg = ClientConfig::default();
        cfg.server.url = "   ".to_string();
        assert!(apply_compat_fallbacks(&mut cfg));
        assert_eq!(cfg.server.url, DEFAULT_SERVER_URL);
    }

    #[test]
    fn apply_compat_fallbacks_is_noop_for_clean_values() {
        let mut cfg = ClientConfig::default();
        cfg.chat.default_sources = vec![1, 2];
        let before = cfg.clone();
        assert!(!apply_compat_fallbacks(&mut cfg));
        assert_eq!(cfg, before);
    }

    #[test]
    fn unknown_sections_are_ignored() {
        let cfg: ClientConfig = toml::from_str(
            r#"
[daemon]
auto_publish = true

[server]
url = "http://10.0.0.5:8000"
timeout_secs = 30
"#,
        )
        .expect("parse toml");
        assert_eq!(cfg.server.url, "http://10.0.0.5:8000");
    }

    #[test]
    fn serializes_all_sections() {
        let encoded = toml::to_string(&ClientConfig::default()).expect("serialize config");
        assert!(encoded.contains("[server]"));
        assert!(encoded.contains("[identity]"));
        assert!(encoded.contains("[chat]"));
    }
}
