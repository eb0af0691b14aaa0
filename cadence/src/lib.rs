//! # Cadence - Typing Session Analytics
//!
//! Cadence turns the raw keystroke trace of a typing-speed test into the
//! numbers a typing trainer shows afterwards: words per minute, raw speed,
//! accuracy, consistency, burst speed, per-character errors and a binned
//! time series for charting.
//!
//! ## Pipeline
//!
#![doc = simple_mermaid::mermaid!("../diagrams/pipeline.mmd")]
//!
//! ## Usage
//!
//! ```rust
//! use cadence::{Event, Session, provider};
//! use cadence::config::Configuration;
//!
//! let session = Session::new(["cat", "dog"]).unwrap();
//! let session = session
//!     .apply(Event::input("cat", 0))
//!     .apply(Event::input("cat dog", 6_000));
//!
//! let request = session.completion().unwrap();
//! let analysis = provider::analyze(&request, None, 10, &Configuration::default());
//!
//! assert_eq!(analysis.record.wpm, 20);
//! assert_eq!(analysis.record.accuracy, 100);
//! assert_eq!(analysis.series.len(), 10);
//! ```

pub mod buckets;
pub mod clock;
pub mod config;
pub mod math;
pub mod metrics;
pub mod provider;
pub mod recorder;
pub mod session;

pub use buckets::{Bin, BinnedSeries, DEFAULT_BIN_COUNT, aggregate};
pub use clock::{Clock, ManualClock, SystemClock};
pub use metrics::{AnalyticsRecord, CharError, compute, compute_for_words, compute_with_trace};
pub use provider::{
    Analysis, AnalysisRequest, AnalyticsProvider, LocalAnalytics, Origin, ProviderError,
};
pub use recorder::{InputTrace, Recorder, Sample, is_complete};
pub use session::{CharState, Event, Session};

const AVERAGE_WORD_LENGTH: usize = 5;

/// Milliseconds since the UNIX epoch
pub type Millis = u64;

// Types for more general type-safety
type Seconds = f64;
type Minutes = f64;

// Get the minutes elapsed between two millisecond timestamps.
//
// Clock skew can put `end` before `start`, so this is signed.
pub(crate) fn minutes_between(start: Millis, end: Millis) -> Minutes {
    (end as f64 - start as f64) / 60_000.0
}

// Length of a text in characters (not bytes)
pub(crate) fn char_len(text: &str) -> usize {
    text.chars().count()
}
