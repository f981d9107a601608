use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api;
use crate::feed;

const DEFAULT_ENV_PREFIX: &str = "TAGFEED";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            ui: UiConfig::default(),
            categories: default_categories(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_base_url() -> String {
    api::DEFAULT_BASE_URL.to_string()
}

fn default_user_agent() -> String {
    format!("tagfeed/{}", env!("CARGO_PKG_VERSION"))
}

fn default_categories() -> Vec<String> {
    feed::default_categories()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UiConfig {
    #[serde(default = "default_theme")]
    pub theme: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            theme: default_theme(),
        }
    }
}

fn default_theme() -> String {
    "default".into()
}

#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    pub config_file: Option<PathBuf>,
    pub env_prefix: Option<String>,
}

pub fn load(options: LoadOptions) -> Result<Config> {
    let mut cfg = Config::default();

    if let Some(path) = options.config_file.as_ref() {
        if path.exists() {
            let from_file = read_config_file(path)?;
            cfg = merge_config(cfg, from_file);
        }
    } else if let Some(default_path) = default_config_path() {
        if default_path.exists() {
            let from_file = read_config_file(&default_path)?;
            cfg = merge_config(cfg, from_file);
        }
    }

    let prefix = options.env_prefix.as_deref().unwrap_or(DEFAULT_ENV_PREFIX);
    cfg = merge_config(cfg, load_env(prefix)?);

    Ok(cfg)
}

fn read_config_file(path: &Path) -> Result<Config> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file at {}", path.display()))?;
    let config: Config = serde_yaml::from_str(&data)
        .with_context(|| format!("Failed to parse config file at {}", path.display()))?;
    Ok(config)
}

fn merge_config(mut base: Config, other: Config) -> Config {
    if !other.api.base_url.is_empty() && other.api.base_url != default_base_url() {
        base.api.base_url = other.api.base_url;
    }
    if !other.api.user_agent.is_empty() && other.api.user_agent != default_user_agent() {
        base.api.user_agent = other.api.user_agent;
    }
    if !other.ui.theme.is_empty() && other.ui.theme != default_theme() {
        base.ui.theme = other.ui.theme;
    }
    if !other.categories.is_empty() && other.categories != default_categories() {
        base.categories = other.categories;
    }
    base
}

fn load_env(prefix: &str) -> Result<Config> {
    let mut map: HashMap<String, String> = HashMap::new();
    let upper_prefix = format!("{}_", prefix.to_uppercase());

    for (key, value) in env::vars() {
        if let Some(stripped) = key.strip_prefix(&upper_prefix) {
            let normalized = stripped.to_ascii_lowercase().replace("__", ".");
            map.insert(normalized, value);
        }
    }

    if map.is_empty() {
        return Ok(Config::default());
    }

    let mut cfg = Config::default();

    for (key, value) in map {
        apply_env_value(&mut cfg, &key, value);
    }

    Ok(cfg)
}

fn apply_env_value(cfg: &mut Config, key: &str, value: String) {
    match key {
        "api.base_url" => cfg.api.base_url = value,
        "api.user_agent" => cfg.api.user_agent = value,
        "ui.theme" => cfg.ui.theme = value,
        "categories" => {
            cfg.categories = value
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        _ => {}
    }
}

pub fn default_path() -> Option<PathBuf> {
    default_config_path()
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("tagfeed").join("config.yaml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn load_defaults_without_files() {
        let cfg = load(LoadOptions::default()).unwrap();
        assert_eq!(cfg.ui.theme, "default");
        assert_eq!(cfg.api.base_url, api::DEFAULT_BASE_URL);
        assert_eq!(cfg.categories, feed::default_categories());
    }

    #[test]
    fn file_overrides_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(
            &path,
            "api:\n  base_url: http://localhost:9000/\ncategories:\n  - All\n  - science\n",
        )
        .unwrap();
        let cfg = load(LoadOptions {
            config_file: Some(path),
            env_prefix: None,
        })
        .unwrap();
        assert_eq!(cfg.api.base_url, "http://localhost:9000/");
        assert_eq!(cfg.categories, vec!["All".to_string(), "science".to_string()]);
        // Untouched sections keep their defaults.
        assert_eq!(cfg.ui.theme, "default");
    }

    #[test]
    fn env_overrides() {
        // Scoped prefix so this test cannot leak into the defaults test.
        env::set_var("TAGFEED_TEST_UI__THEME", "dracula");
        env::set_var("TAGFEED_TEST_CATEGORIES", "All, history , crime");
        let cfg = load(LoadOptions {
            config_file: None,
            env_prefix: Some("TAGFEED_TEST".into()),
        })
        .unwrap();
        assert_eq!(cfg.ui.theme, "dracula");
        assert_eq!(
            cfg.categories,
            vec!["All".to_string(), "history".to_string(), "crime".to_string()]
        );
        env::remove_var("TAGFEED_TEST_UI__THEME");
        env::remove_var("TAGFEED_TEST_CATEGORIES");
    }
}
