//! # Metrics Module - Session Analytics Calculation
//!
//! Pure functions that turn a finished session into an [`AnalyticsRecord`].
//! Given the same arguments they always produce the same record: no clock is
//! read here, every timestamp is passed in.
//!
//! ## Units
//!
//! - **wpm** counts passage words. A passage of 25 words completed in one
//!   minute is 25 WPM, whatever the length of the words.
//! - **raw wpm** counts typed characters and divides by 5, the conventional
//!   word length, so it is independent of the passage.
//!
//! ## Degenerate input
//!
//! Nothing here fails. Zero or negative elapsed time floors both speeds at 0,
//! an empty comparison has 0% accuracy, and a trace too sparse for
//! instantaneous speeds falls back to 100% consistency with a burst equal to
//! the WPM.

use serde::{Deserialize, Serialize};

use crate::config::Configuration;
use crate::math::{Accuracy, Consistency, Wpm, round_metric};
use crate::recorder::{InputTrace, Sample};
use crate::{Millis, char_len, minutes_between};

/// A single mistyped character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharError {
    /// Index in the target text
    pub position: usize,
    /// Character of the target text
    pub expected: char,
    /// Character that was typed instead
    pub typed: char,
}

/// Complete analytics of one finished session
///
/// Recomputed wholesale from its inputs, never patched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsRecord {
    /// Passage words per minute
    pub wpm: u32,
    /// Typed characters per minute, divided by 5
    pub raw_wpm: u32,
    /// Percentage of compared characters that were correct (0 - 100)
    pub accuracy: u32,
    pub correct_chars: usize,
    /// Mismatches plus characters typed past the end of the target
    pub incorrect_chars: usize,
    pub total_chars_compared: usize,
    pub time_taken_seconds: f64,
    /// Steadiness of the typing speed (0 - 100)
    pub consistency: u32,
    /// Peak speed over a short window
    pub burst_wpm: u32,
    /// Mismatches in target order. Overruns have no entry.
    pub char_errors: Vec<CharError>,
}

/// Character-by-character comparison of an input against its target
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Comparison {
    pub correct_chars: usize,
    pub incorrect_chars: usize,
    pub errors: Vec<CharError>,
}

impl Comparison {
    pub fn new(target: &str, input: &str) -> Self {
        let mut comparison = Self::default();
        let mut target_chars = target.chars();
        let mut overrun = 0;

        for (position, typed) in input.chars().enumerate() {
            match target_chars.next() {
                Some(expected) if expected == typed => comparison.correct_chars += 1,
                Some(expected) => {
                    comparison.incorrect_chars += 1;
                    comparison.errors.push(CharError {
                        position,
                        expected,
                        typed,
                    });
                }
                None => overrun += 1,
            }
        }

        // Characters past the end of the target are wrong, but have no position
        comparison.incorrect_chars += overrun;
        comparison
    }

    pub const fn total(&self) -> usize {
        self.correct_chars + self.incorrect_chars
    }
}

/// Compute analytics without a sample trace
///
/// Consistency and burst use the lenient fallback (100% and the WPM).
///
/// ```rust
/// let record = cadence::compute("cat", "cbt", 0, 60_000);
///
/// assert_eq!(record.correct_chars, 2);
/// assert_eq!(record.incorrect_chars, 1);
/// assert_eq!(record.accuracy, 67);
/// assert_eq!(record.wpm, 1);
/// ```
pub fn compute(target: &str, input: &str, start_ms: Millis, end_ms: Millis) -> AnalyticsRecord {
    compute_with_trace(
        target,
        input,
        start_ms,
        end_ms,
        &InputTrace::new(),
        &Configuration::default(),
    )
}

/// Compute analytics for a finished session
///
/// * `target` - The passage, words joined by single spaces
/// * `input` - Final content of the input
/// * `start_ms` / `end_ms` - First keystroke and completion
/// * `trace` - Samples recorded during the session
/// * `config` - Window used for instantaneous speeds
///
/// Every whitespace-separated token of `target` counts as a word. Use
/// [`compute_for_words`] when the passage's word list is at hand.
pub fn compute_with_trace(
    target: &str,
    input: &str,
    start_ms: Millis,
    end_ms: Millis,
    trace: &InputTrace,
    config: &Configuration,
) -> AnalyticsRecord {
    calculate(
        target,
        target.split_whitespace().count(),
        input,
        (start_ms, end_ms),
        trace,
        config,
    )
}

/// Compute analytics for a passage given as its list of words
///
/// Each entry of `words` is one word for the WPM, even if it contains spaces.
///
/// ```rust
/// use cadence::{InputTrace, compute_for_words};
/// use cadence::config::Configuration;
///
/// let words = ["ice cream".to_string(), "dog".to_string()];
/// let record = compute_for_words(
///     &words,
///     "ice cream dog",
///     0,
///     60_000,
///     &InputTrace::new(),
///     &Configuration::default(),
/// );
///
/// assert_eq!(record.wpm, 2);
/// ```
pub fn compute_for_words(
    words: &[String],
    input: &str,
    start_ms: Millis,
    end_ms: Millis,
    trace: &InputTrace,
    config: &Configuration,
) -> AnalyticsRecord {
    calculate(
        &words.join(" "),
        words.len(),
        input,
        (start_ms, end_ms),
        trace,
        config,
    )
}

pub(crate) fn calculate(
    target: &str,
    word_count: usize,
    input: &str,
    (start_ms, end_ms): (Millis, Millis),
    trace: &InputTrace,
    config: &Configuration,
) -> AnalyticsRecord {
    let comparison = Comparison::new(target, input);
    let total = comparison.total();

    let speed = Wpm::calculate(word_count, char_len(input), minutes_between(start_ms, end_ms));
    let wpm = round_metric(speed.passage);

    let speeds = settled_wpm(trace.as_slice(), config);

    let (consistency, burst_wpm) = if speeds.len() < 2 {
        (100, wpm)
    } else {
        let peak = speeds.iter().copied().fold(0.0, f64::max);
        (
            round_metric(Consistency::calculate(&speeds).percent),
            round_metric(peak),
        )
    };

    AnalyticsRecord {
        wpm,
        raw_wpm: round_metric(speed.raw),
        accuracy: round_metric(Accuracy::calculate(comparison.correct_chars, total).0),
        correct_chars: comparison.correct_chars,
        incorrect_chars: comparison.incorrect_chars,
        total_chars_compared: total,
        time_taken_seconds: end_ms.saturating_sub(start_ms) as f64 / 1000.0,
        consistency,
        burst_wpm,
        char_errors: comparison.errors,
    }
}

/// Instantaneous WPM of every sample
///
/// A sample's speed is the net number of characters gained since the latest
/// earlier point at least one window back, normalized to 5-character words.
/// The session start (0 seconds, 0 characters) is the implicit first point and
/// anchors every sample less than one window in. A sample at 0 seconds has a
/// speed of 0.
pub fn instantaneous_wpm(samples: &[Sample], config: &Configuration) -> Vec<f64> {
    let window = window_seconds(config);
    let point = |index: usize| -> (f64, usize) {
        match index {
            0 => (0.0, 0),
            _ => {
                let sample = &samples[index - 1];
                (sample.elapsed_seconds, sample.input_length)
            }
        }
    };

    // `anchor` walks forward through the points, staying at the latest point
    // one window behind the current sample
    let mut anchor = 0;

    samples
        .iter()
        .enumerate()
        .map(|(index, sample)| {
            let current = index + 1;
            let cutoff = sample.elapsed_seconds - window;

            while anchor + 1 < current && point(anchor + 1).0 <= cutoff {
                anchor += 1;
            }

            let (anchor_seconds, anchor_length) = point(anchor);
            Wpm::instantaneous(
                sample.input_length as i64 - anchor_length as i64,
                sample.elapsed_seconds - anchor_seconds,
            )
        })
        .collect()
}

/// Speeds of the samples at least one full window into the session
///
/// Consistency and burst only look at these, so the first keystrokes of a
/// session do not count as a standstill or a spurt.
fn settled_wpm(samples: &[Sample], config: &Configuration) -> Vec<f64> {
    let window = window_seconds(config);

    samples
        .iter()
        .zip(instantaneous_wpm(samples, config))
        .filter(|(sample, _)| sample.elapsed_seconds >= window)
        .map(|(_, speed)| speed)
        .collect()
}

fn window_seconds(config: &Configuration) -> f64 {
    config.burst_window_seconds.max(0.0)
}
