//! # Configuration Module - Analytics Behavior Settings
//!
//! This module provides configuration options for the analytics engine.
//! Configuration affects how instantaneous speeds are derived from the sample
//! trace, which in turn drives consistency, burst speed and the binned series.
//!
//! ## Usage
//!
//! ```rust
//! use cadence::config::Configuration;
//!
//! // Use default configuration
//! let config = Configuration::default();
//!
//! // Custom configuration
//! let config = Configuration {
//!     burst_window_seconds: 2.0, // Smooth speeds over two seconds
//! };
//! ```
//!
//! ## Trade-offs
//!
//! - **Burst window**: Shorter windows react to short spurts of speed and make
//!   burst values higher and consistency lower. Longer windows smooth the trace.

use serde::{Deserialize, Serialize};

/// Runtime configuration for cadence analytics
///
/// All settings have defaults suited to a short (25 word) typing test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// Length of the trailing window used for instantaneous WPM, in seconds
    ///
    /// Each sample's instantaneous speed is the number of characters gained
    /// since the last sample at least this far in the past.
    ///
    /// **Default**: 1.0 seconds
    /// **Range**: 0.25 - 5.0 seconds (recommended)
    pub burst_window_seconds: f64,
}

impl Default for Configuration {
    /// Create configuration with recommended default values
    ///
    /// # Default Values
    ///
    /// - `burst_window_seconds`: 1.0
    fn default() -> Self {
        Self {
            burst_window_seconds: 1.0,
        }
    }
}
