//! # Session Module - Typing Session State
//!
//! A [`Session`] is one attempt at one passage. It is a plain value: every
//! input change is an [`Event`], and [`Session::apply`] consumes the current
//! state and returns the next one. Nothing else mutates it, so replaying the
//! same events always produces the same session.
//!
//! ## Session Lifecycle
//!
#![doc = simple_mermaid::mermaid!("../diagrams/session_lifecycle.mmd")]
//!
//! ## Usage Examples
//!
//! ```rust
//! use cadence::{Event, Session};
//!
//! let session = Session::new(["hello", "world"]).unwrap();
//! assert_eq!(session.target_text(), "hello world");
//!
//! let session = session.apply(Event::input("h", 1_000));
//! assert_eq!(session.started_at(), Some(1_000));
//! assert!(!session.is_finished());
//!
//! let session = session.apply(Event::input("hello world", 5_000));
//! assert!(session.is_finished());
//! assert_eq!(session.ended_at(), Some(5_000));
//! ```
//!
//! A new passage means a new `Session`; the old one and its trace are simply
//! dropped.

use crate::metrics::{AnalyticsRecord, calculate};
use crate::provider::AnalysisRequest;
use crate::recorder::{InputTrace, Recorder, is_complete};
use crate::{Millis, char_len, config::Configuration};

/// Something that happened to the input field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The input changed. `text` is its full content afterwards.
    Input { text: String, at_ms: Millis },
}

impl Event {
    pub fn input(text: impl Into<String>, at_ms: Millis) -> Self {
        Self::Input {
            text: text.into(),
            at_ms,
        }
    }
}

/// Highlighting state of one target character
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharState {
    Correct,
    Incorrect,
    /// Not reached by the input yet
    Untyped,
}

/// One typing attempt at a fixed passage
///
/// # Examples
///
/// ```rust
/// use cadence::{CharState, Event, Session};
///
/// let session = Session::new(["cat"]).unwrap().apply(Event::input("cb", 0));
///
/// assert_eq!(
///     session.char_states(),
///     vec![CharState::Correct, CharState::Incorrect, CharState::Untyped]
/// );
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    words: Vec<String>,
    /// Words joined with single spaces
    target: String,
    input: String,
    recorder: Recorder,
    ended_at: Option<Millis>,
}

impl Session {
    /// Create a session for a passage
    ///
    /// Returns `None` if the passage is empty.
    pub fn new<I, S>(words: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let words: Vec<String> = words.into_iter().map(Into::into).collect();
        let target = words.join(" ");

        if target.is_empty() {
            return None;
        }

        Some(Self {
            words,
            target,
            input: String::new(),
            recorder: Recorder::new(),
            ended_at: None,
        })
    }

    /// Apply an event and return the resulting session
    ///
    /// - The first non-empty input starts the clock.
    /// - Every input after that, deletions included, appends a sample.
    /// - Reaching the length of the target finishes the session.
    /// - A finished session ignores further input.
    pub fn apply(mut self, event: Event) -> Self {
        if self.is_finished() {
            return self;
        }

        match event {
            Event::Input { text, at_ms } => {
                if !self.recorder.has_started() {
                    if text.is_empty() {
                        return self;
                    }
                    self.recorder.start(at_ms);
                }

                self.recorder.record_sample(&self.target, &text, at_ms);
                self.input = text;

                if is_complete(&self.input, &self.target) {
                    self.ended_at = self
                        .recorder
                        .trace()
                        .last()
                        .map(|sample| sample.timestamp_ms);
                }
            }
        }

        self
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub const fn word_count(&self) -> usize {
        self.words.len()
    }

    pub fn target_text(&self) -> &str {
        &self.target
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub const fn trace(&self) -> &InputTrace {
        self.recorder.trace()
    }

    /// Time of the first keystroke
    pub const fn started_at(&self) -> Option<Millis> {
        self.recorder.started_at()
    }

    /// Time the session was finished
    pub const fn ended_at(&self) -> Option<Millis> {
        self.ended_at
    }

    pub const fn has_started(&self) -> bool {
        self.recorder.has_started()
    }

    pub const fn is_finished(&self) -> bool {
        self.ended_at.is_some()
    }

    /// Share of the passage typed so far, between 0.0 and 100.0
    pub fn completion_percentage(&self) -> f64 {
        let target_len = char_len(&self.target);
        let input_len = char_len(&self.input).min(target_len);

        (input_len as f64 / target_len as f64) * 100.0
    }

    /// Highlighting state for every character of the target
    pub fn char_states(&self) -> Vec<CharState> {
        let mut typed = self.input.chars();

        self.target
            .chars()
            .map(|expected| match typed.next() {
                Some(char) if char == expected => CharState::Correct,
                Some(_) => CharState::Incorrect,
                None => CharState::Untyped,
            })
            .collect()
    }

    /// Analytics of the session so far, as if it ended at `now_ms`
    ///
    /// Returns `None` before the first keystroke.
    pub fn snapshot(&self, now_ms: Millis, config: &Configuration) -> Option<AnalyticsRecord> {
        let start = self.started_at()?;
        let end = self.ended_at.unwrap_or(now_ms);

        Some(calculate(
            &self.target,
            self.word_count(),
            &self.input,
            (start, end),
            self.trace(),
            config,
        ))
    }

    /// Hand-off for analysis
    ///
    /// Only available once the session is finished.
    pub fn completion(&self) -> Option<AnalysisRequest> {
        Some(AnalysisRequest {
            words: self.words.clone(),
            input_text: self.input.clone(),
            start_timestamp_ms: self.started_at()?,
            end_timestamp_ms: self.ended_at?,
            sample_trace: self.trace().clone(),
        })
    }
}
