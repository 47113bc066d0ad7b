use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::error::ConfigError;

pub const TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";
pub const VERSION_ENV: &str = "APP_VERSION";

const DEFAULT_VERSION: &str = "1.0.0";

/// How updates reach the bot
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum IngressMode {
    #[default]
    Polling,
    Webhook,
}

impl std::fmt::Display for IngressMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IngressMode::Polling => write!(f, "polling"),
            IngressMode::Webhook => write!(f, "webhook"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub telegram: TelegramConfig,
    pub server: ServerConfig,
    /// Stamped on every webhook response
    pub app_version: String,
}

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default)]
    pub mode: IngressMode,
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            mode: IngressMode::default(),
            listen: default_listen(),
        }
    }
}

/// Optional `config.toml` contents
#[derive(Debug, Deserialize, Default)]
struct FileConfig {
    #[serde(default)]
    server: ServerConfig,
}

fn default_listen() -> String {
    "0.0.0.0:3333".to_string()
}

impl Config {
    /// Load from the process environment, plus `path` if given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let content = match path {
            Some(path) => Some(
                std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file: {}", path.display()))?,
            ),
            None => None,
        };

        let config = Self::from_sources(content.as_deref(), |key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Build from raw TOML contents and an environment lookup.
    pub fn from_sources<F>(file: Option<&str>, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bot_token = env(TOKEN_ENV)
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::MissingToken)?;

        let app_version = env(VERSION_ENV)
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_VERSION.to_string());

        let file: FileConfig = match file {
            Some(content) => toml::from_str(content)?,
            None => FileConfig::default(),
        };

        Ok(Config {
            telegram: TelegramConfig { bot_token },
            server: file.server,
            app_version,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_missing_token() {
        let err = Config::from_sources(None, env(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingToken));
    }

    #[test]
    fn test_empty_token() {
        let err = Config::from_sources(None, env(&[(TOKEN_ENV, "")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingToken));
    }

    #[test]
    fn test_version_defaults() {
        let config = Config::from_sources(None, env(&[(TOKEN_ENV, "1:abc")])).unwrap();
        assert_eq!(config.app_version, "1.0.0");

        let config =
            Config::from_sources(None, env(&[(TOKEN_ENV, "1:abc"), (VERSION_ENV, "")])).unwrap();
        assert_eq!(config.app_version, "1.0.0");
    }

    #[test]
    fn test_version_from_env() {
        let config =
            Config::from_sources(None, env(&[(TOKEN_ENV, "1:abc"), (VERSION_ENV, "1.0.1")]))
                .unwrap();
        assert_eq!(config.app_version, "1.0.1");
        assert_eq!(config.telegram.bot_token, "1:abc");
    }

    #[test]
    fn test_server_defaults() {
        let config = Config::from_sources(None, env(&[(TOKEN_ENV, "1:abc")])).unwrap();
        assert_eq!(config.server.mode, IngressMode::Polling);
        assert_eq!(config.server.listen, "0.0.0.0:3333");
    }

    #[test]
    fn test_server_from_file() {
        let toml = r#"
[server]
mode = "webhook"
listen = "127.0.0.1:8080"
"#;
        let config = Config::from_sources(Some(toml), env(&[(TOKEN_ENV, "1:abc")])).unwrap();
        assert_eq!(config.server.mode, IngressMode::Webhook);
        assert_eq!(config.server.listen, "127.0.0.1:8080");
    }

    #[test]
    fn test_invalid_mode() {
        let toml = "[server]\nmode = \"carrier-pigeon\"\n";
        let err = Config::from_sources(Some(toml), env(&[(TOKEN_ENV, "1:abc")])).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_token_checked_before_file() {
        let err = Config::from_sources(Some("not toml ["), env(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingToken));
    }
}
