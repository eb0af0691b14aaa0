//! # Buckets Module - Time-Binned Performance Series
//!
//! Charts want a fixed number of evenly spaced points, while the trace has one
//! sample per keystroke at irregular times. [`aggregate`] splits the session
//! into `num_bins` equally wide intervals and summarizes every interval:
//!
//! - the mean instantaneous WPM and accuracy of the samples inside it, and
//! - the character errors whose keystroke happened inside it.
//!
//! ## Absence vs. zero
//!
//! A bin without samples reports `None` (serialized as `null`) rather than 0,
//! so a chart can tell a gap in the data from a measured standstill. Every
//! sample has a speed, so a bin with samples always has an average WPM.
//!
//! ## Error placement
//!
//! An error at `position` is placed by the sample where the input grew to
//! `position + 1` characters. When several keystrokes arrive between two
//! samples that sample does not exist and the error is left out of the
//! series. It is still part of the [`AnalyticsRecord`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::Configuration;
use crate::metrics::{AnalyticsRecord, CharError, instantaneous_wpm};
use crate::recorder::InputTrace;
use crate::{Seconds, math::Consistency};

/// Number of bins charts get unless they ask otherwise
pub const DEFAULT_BIN_COUNT: usize = 10;

/// Summary of one time interval of the session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bin {
    pub start_seconds: Seconds,
    pub end_seconds: Seconds,
    /// Mean instantaneous WPM of the samples in this bin
    pub avg_wpm: Option<f64>,
    /// Mean accuracy of the samples in this bin
    pub avg_accuracy: Option<f64>,
    pub errors_in_bin: Vec<CharError>,
}

impl Bin {
    const fn empty(start_seconds: Seconds, end_seconds: Seconds) -> Self {
        Self {
            start_seconds,
            end_seconds,
            avg_wpm: None,
            avg_accuracy: None,
            errors_in_bin: Vec::new(),
        }
    }
}

/// Fixed-length series of bins, ordered by time
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BinnedSeries(Vec<Bin>);

impl BinnedSeries {
    pub fn iter(&self) -> std::slice::Iter<'_, Bin> {
        self.0.iter()
    }
}

impl std::ops::Deref for BinnedSeries {
    type Target = [Bin];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<'a> IntoIterator for &'a BinnedSeries {
    type Item = &'a Bin;
    type IntoIter = std::slice::Iter<'a, Bin>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Running mean for one metric of one bin
#[derive(Default, Clone)]
struct Mean(Vec<f64>);

impl Mean {
    fn add(&mut self, value: Option<f64>) {
        if let Some(value) = value {
            self.0.push(value);
        }
    }

    fn get(&self) -> Option<f64> {
        (!self.0.is_empty()).then(|| Consistency::calculate_mean(&self.0))
    }
}

/// Split a finished session into `num_bins` time bins
///
/// ```rust
/// use cadence::{InputTrace, aggregate, compute};
/// use cadence::config::Configuration;
///
/// let record = compute("cat", "cat", 0, 1_000);
/// let series = aggregate(&record, &InputTrace::new(), 10, &Configuration::default());
///
/// assert_eq!(series.len(), 10);
/// assert!(series.iter().all(|bin| bin.avg_wpm.is_none()));
/// ```
pub fn aggregate(
    record: &AnalyticsRecord,
    trace: &InputTrace,
    num_bins: usize,
    config: &Configuration,
) -> BinnedSeries {
    if num_bins == 0 {
        return BinnedSeries::default();
    }

    let total = trace.total_seconds();
    if total <= 0.0 || total.is_nan() {
        return BinnedSeries(vec![Bin::empty(0.0, 0.0); num_bins]);
    }

    let bin_size = total / num_bins as f64;
    let bin_index = |elapsed: Seconds| -> usize {
        // Samples at exactly `total` land in the last bin
        ((elapsed / bin_size).floor().max(0.0) as usize).min(num_bins - 1)
    };

    let mut wpm = vec![Mean::default(); num_bins];
    let mut accuracy = vec![Mean::default(); num_bins];
    let speeds = instantaneous_wpm(trace.as_slice(), config);

    for (sample, speed) in trace.iter().zip(speeds) {
        let index = bin_index(sample.elapsed_seconds);
        wpm[index].add(Some(speed));
        accuracy[index].add(sample.accuracy());
    }

    let mut bins: Vec<Bin> = (0..num_bins)
        .map(|index| {
            let end = if index == num_bins - 1 {
                total
            } else {
                (index + 1) as f64 * bin_size
            };
            Bin {
                avg_wpm: wpm[index].get(),
                avg_accuracy: accuracy[index].get(),
                ..Bin::empty(index as f64 * bin_size, end)
            }
        })
        .collect();

    let keystrokes = keystroke_times(trace);
    for error in &record.char_errors {
        if let Some(&elapsed) = keystrokes.get(&(error.position + 1)) {
            bins[bin_index(elapsed)].errors_in_bin.push(*error);
        }
    }

    BinnedSeries(bins)
}

/// Elapsed time of the latest keystroke that grew the input to each length
fn keystroke_times(trace: &InputTrace) -> HashMap<usize, Seconds> {
    let mut times = HashMap::new();
    let mut previous_length = 0;

    for sample in trace {
        if sample.input_length > previous_length {
            times.insert(sample.input_length, sample.elapsed_seconds);
        }
        previous_length = sample.input_length;
    }

    times
}
