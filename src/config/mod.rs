use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{fs, io};

use crate::core::DEFAULT_GRACE_DELAY;
use crate::transport::{BaseUrl, HttpConfig};

pub const DEFAULT_BASE_URL: &str = "http://localhost:7861";
const TEMPLATE: &str = include_str!("config.template.toml");

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Config error: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Config directory not found")]
    NoConfigDir,

    #[error("Config file already exists at {0}")]
    AlreadyExists(PathBuf),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

pub fn get_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME")
            .map(PathBuf::from)
            .map(|h| h.join("Library/Application Support/streamchat"))
    }

    #[cfg(target_os = "linux")]
    {
        std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))
            .map(|c| c.join("streamchat"))
    }

    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA")
            .map(PathBuf::from)
            .map(|a| a.join("streamchat"))
    }

    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    {
        std::env::var_os("HOME")
            .map(PathBuf::from)
            .map(|h| h.join(".config/streamchat"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub grace_delay_ms: u64,
    pub connect_timeout_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            grace_delay_ms: DEFAULT_GRACE_DELAY.as_millis() as u64,
            connect_timeout_secs: 10,
            user_agent: None,
        }
    }
}

impl AppConfig {
    /// File settings overlaid with `STREAMCHAT_*` environment variables.
    /// Falls back to defaults when loading fails.
    #[must_use]
    pub fn load() -> Self {
        Self::load_from(Self::get_config_path().as_deref()).unwrap_or_else(|e| {
            eprintln!("Warning: Failed to load config: {e}");
            Self::default()
        })
    }

    pub fn load_from(path: Option<&Path>) -> ConfigResult<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(false));
        }

        builder = builder.add_source(Environment::with_prefix("STREAMCHAT").try_parsing(true));

        Ok(builder.build()?.try_deserialize()?)
    }

    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        get_config_dir().map(|dir| dir.join("config.toml"))
    }

    pub fn init_default() -> ConfigResult<PathBuf> {
        let path = Self::get_config_path().ok_or(ConfigError::NoConfigDir)?;
        Self::init_at(&path)?;
        Ok(path)
    }

    pub fn init_at(path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        if path.exists() {
            return Err(ConfigError::AlreadyExists(path.to_path_buf()));
        }

        fs::write(path, TEMPLATE)?;
        Ok(())
    }

    pub fn to_toml(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    #[must_use]
    pub fn base_url(&self) -> BaseUrl {
        BaseUrl::new(self.base_url.clone())
    }

    #[must_use]
    pub const fn grace_delay(&self) -> Duration {
        Duration::from_millis(self.grace_delay_ms)
    }

    #[must_use]
    pub fn http_config(&self) -> HttpConfig {
        let config =
            HttpConfig::new().with_connect_timeout(Duration::from_secs(self.connect_timeout_secs));
        match &self.user_agent {
            Some(ua) => config.with_user_agent(ua.clone()),
            None => config.with_user_agent(concat!("streamchat/", env!("CARGO_PKG_VERSION"))),
        }
    }
}
