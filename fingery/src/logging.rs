use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::error::AppError;

/// Variable holding the log filter, e.g. `FINGERY_LOG=fingery=debug`
const LOG_ENV: &str = "FINGERY_LOG";

/// Send `tracing` events to `log_file`
///
/// The terminal belongs to the typing screen, so nothing is logged to it.
pub fn init(log_file: &Path) -> Result<(), AppError> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .map_err(|error| AppError::Logging(format!("{}: {error}", log_file.display())))?;

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|error| AppError::Logging(error.to_string()))
}
