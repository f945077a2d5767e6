//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::application::converters::PollSettings;
use crate::application::errors::ConfigError;
use crate::domain::entities::Id;

/// Bot configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    pub bot: BotConfig,
    pub extensions: ExtensionsConfig,
    pub database: DatabaseConfig,
    pub converters: ConverterConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct BotConfig {
    pub name: String,
    pub prefix: String,
    /// Users treated as owners in addition to the application owner
    pub admins: Vec<Id>,
    pub council_roles: Vec<Id>,
    pub suggestions_channel: Option<Id>,
    /// Channel receiving `Runtime::log` lines
    pub bot_log: Option<Id>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ExtensionsConfig {
    pub directory: PathBuf,
    pub auto_load: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ConverterConfig {
    /// How many times to check for a link preview before giving up
    pub preview_poll_attempts: u32,
    pub preview_poll_interval_ms: u64,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: "queuebot".to_string(),
            prefix: "q!".to_string(),
            admins: Vec::new(),
            council_roles: Vec::new(),
            suggestions_channel: None,
            bot_log: None,
        }
    }
}

impl Default for ExtensionsConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("./extensions"),
            auto_load: true,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("queuebot.db"),
        }
    }
}

impl Default for ConverterConfig {
    fn default() -> Self {
        let defaults = PollSettings::default();
        Self {
            preview_poll_attempts: defaults.attempts,
            preview_poll_interval_ms: defaults.interval.as_millis() as u64,
        }
    }
}

impl ConverterConfig {
    pub fn poll_settings(&self) -> PollSettings {
        PollSettings {
            attempts: self.preview_poll_attempts,
            interval: Duration::from_millis(self.preview_poll_interval_ms),
        }
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bot.prefix.trim().is_empty() {
            return Err(ConfigError::InvalidValue("bot.prefix must not be empty".to_string()));
        }
        if self.converters.preview_poll_attempts == 0 {
            return Err(ConfigError::InvalidValue(
                "converters.preview-poll-attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn load_env() -> Self {
        // Load from environment variables
        let mut config = Config::default();

        if let Ok(prefix) = std::env::var("QUEUEBOT_PREFIX") {
            config.bot.prefix = prefix;
        }

        if let Ok(path) = std::env::var("QUEUEBOT_DATABASE") {
            config.database.path = PathBuf::from(path);
        }

        config
    }
}
