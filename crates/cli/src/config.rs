use anyhow::{Context, Result};
use cookai_runtime_config::{CONFIG_FILE_NAME, ClientConfig, apply_compat_fallbacks};
use std::path::{Path, PathBuf};

/// Get the config directory path (~/.config/cookai/)
pub fn config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .context("Could not determine home directory")?;
    Ok(PathBuf::from(home).join(".config").join("cookai"))
}

/// Config file to use: the `--config` override, or the canonical path.
pub fn config_path(override_path: Option<&Path>) -> Result<PathBuf> {
    match override_path {
        Some(path) => Ok(path.to_path_buf()),
        None => Ok(config_dir()?.join(CONFIG_FILE_NAME)),
    }
}

/// Load config from `path`, returning defaults if the file does not exist.
pub fn load_config_at(path: &Path) -> Result<ClientConfig> {
    if !path.exists() {
        return Ok(ClientConfig::default());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config at {}", path.display()))?;
    let mut config: ClientConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config at {}", path.display()))?;
    if apply_compat_fallbacks(&mut config) {
        tracing::debug!("normalized config loaded from {}", path.display());
    }
    Ok(config)
}

pub fn save_config_at(path: &Path, config: &ClientConfig) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create config dir at {}", dir.display()))?;
    }
    let content = toml::to_string_pretty(config).context("Failed to serialize config")?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write config at {}", path.display()))?;
    Ok(())
}

pub fn load_config(override_path: Option<&Path>) -> Result<ClientConfig> {
    load_config_at(&config_path(override_path)?)
}

/// Print current config.
pub fn show_config(override_path: Option<&Path>) -> Result<()> {
    let path = config_path(override_path)?;
    let config = load_config_at(&path)?;
    println!("Config file: {}", path.display());
    println!();
    println!("[server]");
    println!("  url = {}", config.server.url);
    println!();
    println!("[identity]");
    println!("  user_id     = {}", config.identity.user_id);
    println!("  course_id   = {}", config.identity.course_id);
    println!("  uploader_id = {}", config.identity.uploader_id);
    println!();
    println!("[chat]");
    if config.chat.default_sources.is_empty() {
        println!("  default_sources = (none)");
    } else {
        let ids: Vec<String> = config
            .chat
            .default_sources
            .iter()
            .map(ToString::to_string)
            .collect();
        println!("  default_sources = {}", ids.join(", "));
    }
    Ok(())
}

/// Values `cookai config` may change.
#[derive(Debug, Default)]
pub struct ConfigUpdate {
    pub server: Option<String>,
    pub user_id: Option<i64>,
    pub course_id: Option<i64>,
    pub default_sources: Option<Vec<i64>>,
}

impl ConfigUpdate {
    pub fn is_empty(&self) -> bool {
        self.server.is_none()
            && self.user_id.is_none()
            && self.course_id.is_none()
            && self.default_sources.is_none()
    }

    fn apply(self, config: &mut ClientConfig) {
        if let Some(url) = self.server {
            config.server.url = url;
        }
        if let Some(user_id) = self.user_id {
            config.identity.user_id = user_id;
            config.identity.uploader_id = user_id;
        }
        if let Some(course_id) = self.course_id {
            config.identity.course_id = course_id;
        }
        if let Some(sources) = self.default_sources {
            config.chat.default_sources = sources;
        }
        apply_compat_fallbacks(config);
    }
}

/// Update config with provided values.
pub fn set_config(override_path: Option<&Path>, update: ConfigUpdate) -> Result<()> {
    let path = config_path(override_path)?;
    let mut config = load_config_at(&path)?;
    update.apply(&mut config);
    save_config_at(&path, &config)?;
    println!("Configuration updated.");
    show_config(Some(&path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = load_config_at(&dir.path().join("cookai.toml")).expect("load");
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn update_round_trips_through_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("cookai.toml");

        let mut config = load_config_at(&path).expect("load");
        ConfigUpdate {
            server: Some("http://10.1.2.3:8000/".to_string()),
            user_id: Some(9),
            course_id: Some(4),
            default_sources: Some(vec![7, 7, 8]),
        }
        .apply(&mut config);
        save_config_at(&path, &config).expect("save");

        let loaded = load_config_at(&path).expect("reload");
        assert_eq!(loaded.server.url, "http://10.1.2.3:8000");
        assert_eq!(loaded.identity.user_id, 9);
        assert_eq!(loaded.identity.uploader_id, 9);
        assert_eq!(loaded.identity.course_id, 4);
        assert_eq!(loaded.chat.default_sources, vec![7, 8]);
    }

    #[test]
    fn broken_file_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("cookai.toml");
        std::fs::write(&path, "[server\nurl = ").expect("write");
        let err = load_config_at(&path).expect_err("invalid toml");
        assert!(format!("{err:#}").contains("Failed to parse config"));
    }

    #[test]
    fn override_path_wins() {
        let path = PathBuf::from("/tmp/elsewhere.toml");
        assert_eq!(config_path(Some(&path)).expect("path"), path);
    }
}
