//! # Provider Module - Where Analytics Come From
//!
//! A finished session can be analyzed by a remote analytics service or right
//! here in-process. Both produce the same [`AnalyticsRecord`] shape, and
//! [`analyze`] guarantees that the caller always ends up with one: whatever
//! goes wrong with the remote side, the local calculator takes over
//! synchronously and the failure is handed back for display.
//!
//! The binned series is always aggregated locally from the record and the
//! session's own trace.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Millis;
use crate::buckets::{BinnedSeries, aggregate};
use crate::config::Configuration;
use crate::metrics::{AnalyticsRecord, compute_for_words};
use crate::recorder::InputTrace;

/// Everything needed to analyze a finished session
///
/// This is also the request body of the remote analytics service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub words: Vec<String>,
    pub input_text: String,
    pub start_timestamp_ms: Millis,
    pub end_timestamp_ms: Millis,
    #[serde(default)]
    pub sample_trace: InputTrace,
}

impl AnalysisRequest {
    /// The passage: words joined by single spaces
    pub fn target_text(&self) -> String {
        self.words.join(" ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// Network failure, timeout, unexpected status or malformed response
    #[error("Analytics service unavailable: {0}")]
    Unavailable(String),

    /// The service answered with an error detail
    #[error("Analytics service rejected the session: {0}")]
    Rejected(String),
}

/// Something that can turn a finished session into analytics
pub trait AnalyticsProvider {
    fn analyze(&self, request: &AnalysisRequest) -> Result<AnalyticsRecord, ProviderError>;
}

/// In-process analytics
#[derive(Debug, Default, Clone)]
pub struct LocalAnalytics {
    config: Configuration,
}

impl LocalAnalytics {
    pub const fn new(config: Configuration) -> Self {
        Self { config }
    }

    /// Compute the record. Never fails.
    pub fn compute(&self, request: &AnalysisRequest) -> AnalyticsRecord {
        compute_for_words(
            &request.words,
            &request.input_text,
            request.start_timestamp_ms,
            request.end_timestamp_ms,
            &request.sample_trace,
            &self.config,
        )
    }
}

impl AnalyticsProvider for LocalAnalytics {
    fn analyze(&self, request: &AnalysisRequest) -> Result<AnalyticsRecord, ProviderError> {
        Ok(self.compute(request))
    }
}

/// Which side produced the record of an [`Analysis`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    Remote,
    Local,
}

/// Final result of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub record: AnalyticsRecord,
    pub series: BinnedSeries,
    pub origin: Origin,
    /// Why the remote provider was not used, if it was asked
    #[serde(skip)]
    pub fallback: Option<ProviderError>,
}

impl Analysis {
    /// True if a remote provider was asked and failed
    pub const fn is_fallback(&self) -> bool {
        self.fallback.is_some()
    }
}

/// Analyze a finished session
///
/// Asks `remote` first if there is one and falls back to local computation on
/// any error. Call it again with the same request to retry; it has no side
/// effects beyond what `remote` does.
pub fn analyze(
    request: &AnalysisRequest,
    remote: Option<&dyn AnalyticsProvider>,
    num_bins: usize,
    config: &Configuration,
) -> Analysis {
    let (record, origin, fallback) = match remote.map(|provider| provider.analyze(request)) {
        Some(Ok(record)) => (record, Origin::Remote, None),
        Some(Err(error)) => (
            LocalAnalytics::new(config.clone()).compute(request),
            Origin::Local,
            Some(error),
        ),
        None => (
            LocalAnalytics::new(config.clone()).compute(request),
            Origin::Local,
            None,
        ),
    };

    let series = aggregate(&record, &request.sample_trace, num_bins, config);

    Analysis {
        record,
        series,
        origin,
        fallback,
    }
}
