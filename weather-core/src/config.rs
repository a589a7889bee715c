use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

pub const BOT_TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";
const DEFAULT_LANG: &str = "ru";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const LOG_FILE_NAME: &str = "weather_telegram_bot.log";

/// Telegram side of the bot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    pub bot_token: Option<String>,

    /// Offer the "send location" flow for a bare `/weather`.
    pub location_requests: bool,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            location_requests: true,
        }
    }
}

/// OpenWeather client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenWeatherConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    /// Language of the condition descriptions.
    pub lang: String,
    pub timeout_secs: u64,
}

impl Default for OpenWeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            lang: DEFAULT_LANG.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl OpenWeatherConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// log_file = "/var/log/weather_telegram_bot.log"
///
/// [telegram]
/// bot_token = "..."
///
/// [openweather]
/// api_key = "..."
/// lang = "en"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub log_file: Option<PathBuf>,
    pub telegram: TelegramConfig,
    pub openweather: OpenWeatherConfig,
}

impl Config {
    /// Load config from `path`, or return defaults if it doesn't exist yet.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(project_dirs()?.config_dir().join("config.toml"))
    }

    /// Log file from config, falling back to the platform data directory.
    pub fn log_file_path(&self) -> Result<PathBuf> {
        match &self.log_file {
            Some(path) => Ok(path.clone()),
            None => Ok(project_dirs()?.data_local_dir().join(LOG_FILE_NAME)),
        }
    }

    /// Overlay secrets from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// Overlay secrets from `lookup`. Non-empty values win over the file.
    pub fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = non_empty(BOT_TOKEN_ENV) {
            self.telegram.bot_token = Some(token);
        }
        if let Some(key) = non_empty(API_KEY_ENV) {
            self.openweather.api_key = Some(key);
        }
    }

    pub fn require_bot_token(&self) -> Result<&str> {
        non_blank(self.telegram.bot_token.as_deref()).ok_or_else(|| {
            anyhow!(
                "No Telegram bot token configured.\n\
                 Hint: set {BOT_TOKEN_ENV} or run `weather-bot configure`."
            )
        })
    }

    pub fn require_api_key(&self) -> Result<&str> {
        non_blank(self.openweather.api_key.as_deref()).ok_or_else(|| {
            anyhow!(
                "No OpenWeather API key configured.\n\
                 Hint: set {API_KEY_ENV} or run `weather-bot configure`."
            )
        })
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("dev", "weather-task", "weather-bot")
        .ok_or_else(|| anyhow!("Could not determine platform config directory"))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_point_at_openweather() {
        let cfg = Config::default();

        assert_eq!(cfg.openweather.base_url, "https://api.openweathermap.org");
        assert_eq!(cfg.openweather.lang, "ru");
        assert_eq!(cfg.openweather.timeout(), Duration::from_secs(10));
        assert!(cfg.telegram.location_requests);
    }

    #[test]
    fn require_secrets_errors_when_not_set() {
        let cfg = Config::default();

        let err = cfg.require_bot_token().unwrap_err();
        assert!(err.to_string().contains("No Telegram bot token configured"));
        assert!(err.to_string().contains("Hint: set TELEGRAM_BOT_TOKEN"));

        let err = cfg.require_api_key().unwrap_err();
        assert!(err.to_string().contains("No OpenWeather API key configured"));
    }

    #[test]
    fn blank_secret_counts_as_missing() {
        let mut cfg = Config::default();
        cfg.openweather.api_key = Some("   ".into());

        assert!(cfg.require_api_key().is_err());
    }

    #[test]
    fn env_overrides_file_values() {
        let mut cfg = Config::default();
        cfg.telegram.bot_token = Some("FILE_TOKEN".into());
        cfg.openweather.api_key = Some("FILE_KEY".into());

        let env: HashMap<&str, String> = [(BOT_TOKEN_ENV, "ENV_TOKEN".to_string())].into();
        cfg.apply_env_with(|key| env.get(key).cloned());

        assert_eq!(cfg.require_bot_token().unwrap(), "ENV_TOKEN");
        assert_eq!(cfg.require_api_key().unwrap(), "FILE_KEY");
    }

    #[test]
    fn empty_env_value_does_not_override() {
        let mut cfg = Config::default();
        cfg.openweather.api_key = Some("FILE_KEY".into());

        cfg.apply_env_with(|_| Some(String::new()));

        assert_eq!(cfg.require_api_key().unwrap(), "FILE_KEY");
    }

    #[test]
    fn save_then_load_preserves_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.telegram.bot_token = Some("TOKEN".into());
        cfg.telegram.location_requests = false;
        cfg.openweather.lang = "en".into();
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.telegram.bot_token.as_deref(), Some("TOKEN"));
        assert!(!loaded.telegram.location_requests);
        assert_eq!(loaded.openweather.lang, "en");
        assert_eq!(loaded.openweather.timeout_secs, 10);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[openweather]\napi_key = \"KEY\"\n").unwrap();

        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.require_api_key().unwrap(), "KEY");
        assert_eq!(cfg.openweather.lang, "ru");
        assert!(cfg.telegram.location_requests);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("absent.toml")).unwrap();

        assert!(cfg.telegram.bot_token.is_none());
    }

    #[test]
    fn explicit_log_file_wins() {
        let cfg = Config {
            log_file: Some(PathBuf::from("/tmp/bot.log")),
            ..Config::default()
        };

        assert_eq!(cfg.log_file_path().unwrap(), PathBuf::from("/tmp/bot.log"));
    }
}
