//! # Recorder Module - Keystroke Trace Capture
//!
//! The recorder is the bookkeeping half of a typing session. Every time the
//! input changes (typing *or* deleting) it appends one [`Sample`] to the
//! session's [`InputTrace`]. The trace is the only record of *when* things
//! happened, so everything time-based downstream (instantaneous speed,
//! consistency, burst, binned charts) is derived from it.
//!
//! ## Invariants
//!
//! - `elapsed_seconds` and `timestamp_ms` never decrease along the trace, even
//!   when the clock jumps backwards.
//! - `input_length` follows the input and may go down after a deletion.
//! - The trace only grows. [`Recorder::clear`] is the only way to shrink it.

use serde::{Deserialize, Serialize};

use crate::metrics::Comparison;
use crate::{Millis, Seconds, char_len};

/// One observation of the input field
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sample {
    /// Seconds since the first keystroke
    pub elapsed_seconds: Seconds,
    /// Characters in the input after the change
    pub input_length: usize,
    /// Wall clock time of the change
    pub timestamp_ms: Millis,
    /// Characters of the input that did not match the target at this point,
    /// including characters typed past its end
    #[serde(default)]
    pub incorrect_chars: usize,
}

impl Sample {
    /// Accuracy of the input at the time of this sample
    ///
    /// `None` if the input was empty.
    pub fn accuracy(&self) -> Option<f64> {
        if self.input_length == 0 {
            return None;
        }

        let correct = self.input_length.saturating_sub(self.incorrect_chars);
        Some(correct as f64 / self.input_length as f64 * 100.0)
    }
}

/// Append-only sequence of samples for one session
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InputTrace(Vec<Sample>);

impl InputTrace {
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    pub fn last(&self) -> Option<&Sample> {
        self.0.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sample> {
        self.0.iter()
    }

    pub const fn len(&self) -> usize {
        self.0.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[Sample] {
        &self.0
    }

    /// Seconds covered by the trace (0 for an empty trace)
    pub fn total_seconds(&self) -> Seconds {
        self.last().map_or(0.0, |sample| sample.elapsed_seconds)
    }

    fn push(&mut self, sample: Sample) {
        self.0.push(sample);
    }
}

impl From<Vec<Sample>> for InputTrace {
    fn from(samples: Vec<Sample>) -> Self {
        Self(samples)
    }
}

impl<'a> IntoIterator for &'a InputTrace {
    type Item = &'a Sample;
    type IntoIter = std::slice::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Returns true once the input is at least as long as the target
pub fn is_complete(input: &str, target: &str) -> bool {
    char_len(input) >= char_len(target)
}

/// Captures the timing of a single session
///
/// # Examples
///
/// ```rust
/// use cadence::Recorder;
///
/// let mut recorder = Recorder::new();
/// recorder.start(10_000);
/// recorder.record_sample("cat", "c", 10_000);
/// recorder.record_sample("cat", "cx", 10_500);
///
/// let last = recorder.trace().last().unwrap();
/// assert_eq!(last.elapsed_seconds, 0.5);
/// assert_eq!(last.input_length, 2);
/// assert_eq!(last.incorrect_chars, 1);
/// ```
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Recorder {
    started_at: Option<Millis>,
    trace: InputTrace,
}

impl Recorder {
    pub const fn new() -> Self {
        Self {
            started_at: None,
            trace: InputTrace::new(),
        }
    }

    /// Fix the start of the session
    ///
    /// Only the first call has an effect.
    pub const fn start(&mut self, now_ms: Millis) {
        if self.started_at.is_none() {
            self.started_at = Some(now_ms);
        }
    }

    pub const fn started_at(&self) -> Option<Millis> {
        self.started_at
    }

    pub const fn has_started(&self) -> bool {
        self.started_at.is_some()
    }

    pub const fn trace(&self) -> &InputTrace {
        &self.trace
    }

    /// Append a sample for the current content of the input
    ///
    /// Must be called after every mutation of the input, deletions included.
    /// Samples recorded before [`Recorder::start`] have an elapsed time of 0.
    pub fn record_sample(&mut self, target: &str, input: &str, now_ms: Millis) {
        let start = self.started_at.unwrap_or(now_ms);
        let mut elapsed_seconds = now_ms.saturating_sub(start) as f64 / 1000.0;
        let mut timestamp_ms = now_ms;

        // Keep the trace monotonic if the clock steps backwards
        if let Some(last) = self.trace.last() {
            elapsed_seconds = elapsed_seconds.max(last.elapsed_seconds);
            timestamp_ms = timestamp_ms.max(last.timestamp_ms);
        }

        self.trace.push(Sample {
            elapsed_seconds,
            input_length: char_len(input),
            timestamp_ms,
            incorrect_chars: Comparison::new(target, input).incorrect_chars,
        });
    }

    /// Forget the session: start time and trace
    pub fn clear(&mut self) {
        self.started_at = None;
        self.trace = InputTrace::new();
    }

    /// Hand over the trace
    pub fn into_trace(self) -> InputTrace {
        self.trace
    }
}
