use std::path::PathBuf;

use derive_more::From;
use thiserror::Error;

use crate::config::ConfigError;
use crate::report::HistoryError;

/// Anything that ends the program early
#[derive(Debug, From, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(ConfigError),

    #[error(transparent)]
    History(HistoryError),

    #[from(skip)]
    #[error("Failed to read session file {}: {error}", path.display())]
    ReadSession {
        path: PathBuf,
        error: std::io::Error,
    },

    #[error("Failed to parse session: {0}")]
    ParseSession(serde_json::Error),

    #[error("Failed to serialize settings: {0}")]
    SerializeSettings(toml::ser::Error),

    #[error("Failed to serialize output: {0}")]
    #[from(skip)]
    Output(serde_json::Error),

    #[error("Terminal error: {0}")]
    Terminal(std::io::Error),

    #[from(skip)]
    #[error("Failed to set up logging: {0}")]
    Logging(String),
}
