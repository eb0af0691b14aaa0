use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StatisticsConfig {
    pub save_enabled: bool,
    pub history_limit: usize,
    pub directory: Option<PathBuf>,
}

impl Default for StatisticsConfig {
    fn default() -> Self {
        Self {
            save_enabled: true,
            history_limit: 50,
            directory: None,
        }
    }
}
