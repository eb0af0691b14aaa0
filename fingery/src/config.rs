use std::path::PathBuf;

use derive_more::From;
use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::identity::IdentityConfig;

pub use server::{AnalyticsConfig, ServerConfig, WordsConfig};
pub use stats::StatisticsConfig;

pub mod server;
pub mod stats;

/// Prefix of environment variables that override settings, e.g. `FINGERY_WORDS__COUNT=50`
const ENV_PREFIX: &str = "FINGERY_";

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerConfig,
    pub words: WordsConfig,
    pub analytics: AnalyticsConfig,
    pub identity: IdentityConfig,
    pub statistic: StatisticsConfig,
    pub engine: EngineConfig,
}

/// Settings handed to the analytics engine
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Number of time bins in the results chart
    pub bins: usize,
    pub burst_window_seconds: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            bins: cadence::DEFAULT_BIN_COUNT,
            burst_window_seconds: cadence::config::Configuration::default().burst_window_seconds,
        }
    }
}

impl EngineConfig {
    pub const fn analytics(&self) -> cadence::config::Configuration {
        cadence::config::Configuration {
            burst_window_seconds: self.burst_window_seconds,
        }
    }
}

#[derive(Debug, From, Error)]
pub enum ConfigError {
    #[error(
        "Failed to get configuration directory. Please specify the location using the `--config <path>` flag"
    )]
    NoDirectory,

    #[error("Failed to create directory: {0}")]
    CreateDirectory(std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(Box<figment::Error>),
}

#[derive(Debug)]
pub struct Config {
    pub settings: Settings,
    pub config_dir: PathBuf,
    /// Where logs and history live
    pub data_dir: PathBuf,
}

impl Config {
    pub fn get(override_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let dirs = ProjectDirs::from("com", "Fingery", "Fingery");

        // Check for toml file location
        let config_dir = override_path
            .clone()
            .or_else(|| dirs.as_ref().map(|dirs| dirs.config_dir().to_path_buf()))
            .ok_or(ConfigError::NoDirectory)?;

        // An explicit config directory keeps everything in one place
        let data_dir = match (&override_path, &dirs) {
            (None, Some(dirs)) => dirs.data_dir().to_path_buf(),
            _ => config_dir.clone(),
        };

        for dir in [&config_dir, &data_dir] {
            if !dir.exists() {
                std::fs::create_dir_all(dir)?;
            }
        }

        let settings = Self::load_settings(config_dir.join("settings.toml"))?;

        Ok(Self {
            settings,
            config_dir,
            data_dir,
        })
    }

    /// Layer defaults, the settings file (if any) and the environment
    fn load_settings(settings_toml: PathBuf) -> Result<Settings, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Settings::default()));

        if settings_toml.exists() {
            figment = figment.merge(Toml::file(settings_toml));
        }

        let settings = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(Box::new)?;

        Ok(settings)
    }

    pub fn history_dir(&self) -> PathBuf {
        self.settings
            .statistic
            .directory
            .clone()
            .unwrap_or_else(|| self.data_dir.join("history"))
    }

    pub fn log_file(&self) -> PathBuf {
        self.data_dir.join("fingery.log")
    }
}

#[cfg(test)]
mod tests {
    use figment::Jail;

    use super::*;

    #[test]
    fn test_defaults() {
        Jail::expect_with(|jail| {
            let config = Config::get(Some(jail.directory().to_path_buf())).map_err(|e| e.to_string())?;
            let settings = &config.settings;

            assert_eq!(settings.words.count, 25);
            assert!(settings.server.url.is_none());
            assert!(settings.identity.resolve().is_none());
            assert_eq!(settings.engine.bins, 10);
            assert_eq!(config.data_dir, jail.directory());
            assert_eq!(config.history_dir(), jail.directory().join("history"));
            Ok(())
        });
    }

    #[test]
    fn test_settings_file_and_env() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "settings.toml",
                r#"
                [server]
                url = "http://localhost:8000/api"
                timeout_seconds = 2

                [words]
                count = 40

                [engine]
                bins = 20
                "#,
            )?;
            jail.set_env("FINGERY_WORDS__COUNT", "12");
            jail.set_env("FINGERY_IDENTITY__ACCESS_TOKEN", "secret");
            jail.set_env("FINGERY_IDENTITY__DISPLAY_NAME", "Ada");

            let config = Config::get(Some(jail.directory().to_path_buf())).map_err(|e| e.to_string())?;
            let settings = config.settings;

            assert_eq!(settings.server.url.as_deref(), Some("http://localhost:8000/api"));
            assert_eq!(settings.server.timeout_seconds, 2);
            // The environment wins over the file
            assert_eq!(settings.words.count, 12);
            assert_eq!(settings.engine.bins, 20);
            assert_eq!(settings.engine.analytics().burst_window_seconds, 1.0);

            let identity = settings.identity.resolve().unwrap();
            assert_eq!(identity.display_name, "Ada");
            assert_eq!(identity.access_token, "secret");
            Ok(())
        });
    }

    #[test]
    fn test_invalid_settings() {
        Jail::expect_with(|jail| {
            jail.create_file("settings.toml", "[words]\ncount = \"many\"")?;

            let result = Config::get(Some(jail.directory().to_path_buf()));
            assert!(matches!(result, Err(ConfigError::Parse(_))));
            Ok(())
        });
    }
}
