//! Where finished sessions go after the results are known.
//!
//! Signed-in users get their session submitted to the service in the
//! background. Every user, guest or not, gets a local [`HistoryStore`] entry
//! when saving is enabled.

use std::thread::{self, JoinHandle};

use cadence::{Analysis, AnalysisRequest, AnalyticsRecord, BinnedSeries, InputTrace};
use serde::Serialize;
use tracing::{info, warn};

use crate::identity::Identity;

pub use history::{HistoryEntry, HistoryError, HistoryStore};

pub mod history;

/// Body of `POST {url}/detailed-stats`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReport {
    #[serde(flatten)]
    pub record: AnalyticsRecord,
    pub series: BinnedSeries,
    pub sample_trace: InputTrace,
    pub target_text: String,
    pub input_text: String,
    pub word_count: usize,
    /// Wall-clock duration in seconds
    pub test_duration: f64,
}

impl SessionReport {
    pub fn new(request: &AnalysisRequest, analysis: &Analysis) -> Self {
        Self {
            record: analysis.record.clone(),
            series: analysis.series.clone(),
            sample_trace: request.sample_trace.clone(),
            target_text: request.target_text(),
            input_text: request.input_text.clone(),
            word_count: request.words.len(),
            test_duration: analysis.record.time_taken_seconds,
        }
    }
}

/// Reporting sink of signed-in users
#[derive(Debug, Clone)]
pub struct Reporter {
    url: String,
    timeout_seconds: u64,
    identity: Identity,
}

impl Reporter {
    pub fn new(base_url: &str, timeout_seconds: u64, identity: Identity) -> Self {
        Self {
            url: format!("{}/detailed-stats", base_url.trim_end_matches('/')),
            timeout_seconds,
            identity,
        }
    }

    /// Submit in the background
    ///
    /// The outcome is only logged. The handle may be dropped.
    pub fn submit(&self, report: SessionReport) -> JoinHandle<()> {
        let reporter = self.clone();
        thread::spawn(move || match reporter.send(&report) {
            Ok(()) => info!(user = %reporter.identity.display_name, "session reported"),
            Err(error) => warn!(%error, url = %reporter.url, "failed to report session"),
        })
    }

    fn send(&self, report: &SessionReport) -> Result<(), minreq::Error> {
        let response = minreq::post(&self.url)
            .with_timeout(self.timeout_seconds)
            .with_header("Authorization", self.identity.authorization())
            .with_json(report)?
            .send()?;

        if (200..300).contains(&response.status_code) {
            Ok(())
        } else {
            Err(minreq::Error::Other("reporting endpoint answered with an error status"))
        }
    }
}
