use serde::{Deserialize, Serialize};

/// The backend serving words and analytics
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL of the API, e.g. `http://localhost:8000/api`. Without one everything runs offline.
    pub url: Option<String>,
    pub timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout_seconds: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WordsConfig {
    /// Words per passage
    pub count: usize,
}

impl Default for WordsConfig {
    fn default() -> Self {
        Self { count: 25 }
    }
}

/// What signed-in users send to the server
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Let the server compute analytics
    pub remote: bool,
    /// Submit finished sessions to the server
    pub report: bool,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            remote: true,
            report: true,
        }
    }
}
