use crate::{AVERAGE_WORD_LENGTH, Minutes, Seconds};

/// Words Per Minute
///
/// Both speeds are floored at zero when no positive amount of time has passed,
/// so a same-millisecond completion or a skewed clock never yields infinity or
/// NaN.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Wpm {
    /// The passage WPM counts every word of the target passage as one word, no matter its
    /// length. It describes how fast the passage was completed.
    pub passage: f64,
    /// The raw WPM normalizes typed characters by the 5-characters-per-word convention,
    /// independent of the passage.
    pub raw: f64,
}

impl Wpm {
    /// Calculate Words Per Minute
    ///
    /// * `word_count` - How many words the target passage has
    /// * `characters` - How many characters are in the input
    /// * `minutes` - How many minutes have gone by
    ///
    pub fn calculate(word_count: usize, characters: usize, minutes: Minutes) -> Self {
        if minutes <= 0.0 || minutes.is_nan() {
            return Self {
                passage: 0.0,
                raw: 0.0,
            };
        }

        Self {
            passage: word_count as f64 / minutes,
            raw: (characters as f64 / AVERAGE_WORD_LENGTH as f64) / minutes,
        }
    }

    /// Calculate the speed of a short stretch of typing
    ///
    /// * `characters_gained` - Net characters added during the stretch (negative when deleting)
    /// * `seconds` - Length of the stretch
    ///
    /// An empty stretch has a speed of 0. Net deletion counts as standing still.
    pub fn instantaneous(characters_gained: i64, seconds: Seconds) -> f64 {
        if seconds <= 0.0 || seconds.is_nan() {
            return 0.0;
        }

        let words = characters_gained.max(0) as f64 / AVERAGE_WORD_LENGTH as f64;
        words / (seconds / 60.0)
    }
}

/// Typing accuracy
///
/// Accuracy describes the percentage of correctly typed characters, between 0.0 - 100.0.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Accuracy(pub f64);

impl Accuracy {
    /// Calculate typing Accuracy
    ///
    /// * `correct` - How many compared characters matched the target
    /// * `total` - How many characters were compared, including overruns
    ///
    /// An empty comparison has an accuracy of 0.
    pub fn calculate(correct: usize, total: usize) -> Self {
        if total == 0 {
            return Self(0.0);
        }

        Self((correct.min(total) as f64 / total as f64) * 100.0)
    }
}

/// Typing consistency
///
/// Consistency describes the stability of typing speed over time, based on the
/// coefficient of variation of a series of speed measurements.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Consistency {
    /// Population standard deviation of the speeds
    pub deviation: f64,
    /// Consistency as percentage (0.0 - 100.0). Higher is steadier.
    pub percent: f64,
}

impl Consistency {
    /// Calculate typing consistency
    ///
    /// * `speeds` - Speed measurements over time
    pub fn calculate(speeds: &[f64]) -> Self {
        let deviation = Self::calculate_std_dev(speeds);

        Self {
            deviation,
            percent: Self::cv_to_percentage(deviation, Self::calculate_mean(speeds)),
        }
    }

    fn calculate_std_dev(values: &[f64]) -> f64 {
        if values.len() <= 1 {
            return 0.0;
        }

        // Welford's online algorithm for numerically stable variance calculation
        let mut mean = 0.0;
        let mut m2 = 0.0; // Sum of squares of deviations from mean

        for (i, &value) in values.iter().enumerate() {
            let delta = value - mean;
            mean += delta / (i + 1) as f64;
            let delta2 = value - mean;
            m2 += delta * delta2;
        }

        // Population standard deviation
        let variance = m2 / values.len() as f64;
        variance.sqrt()
    }

    pub(crate) fn calculate_mean(values: &[f64]) -> f64 {
        if values.is_empty() {
            0.0
        } else {
            values.iter().sum::<f64>() / values.len() as f64
        }
    }

    fn cv_to_percentage(std_dev: f64, mean: f64) -> f64 {
        if mean == 0.0 {
            return 100.0; // Standing still is perfectly steady
        }
        let cv = std_dev / mean; // Coefficient of variation
        let consistency_percent = (1.0 - cv.min(1.0)) * 100.0;
        consistency_percent.max(0.0)
    }
}

/// Round a non-negative metric to a whole number, mapping anything non-finite or negative to 0
pub(crate) fn round_metric(value: f64) -> u32 {
    if value.is_finite() && value > 0.0 {
        value.round() as u32
    } else {
        0
    }
}
