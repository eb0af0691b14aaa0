//! Time sources.
//!
//! Nothing in cadence reads the wall clock on its own. Callers hand a [`Clock`]
//! to whatever produces timestamps, so tests and trace replays run without
//! real delays.

use std::cell::Cell;

use web_time::SystemTime;

use crate::Millis;

/// A source of millisecond timestamps
pub trait Clock {
    /// Current time in milliseconds since the UNIX epoch
    fn now_ms(&self) -> Millis;
}

/// The real wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> Millis {
        // A clock set before 1970 reads as the epoch
        SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as Millis)
            .unwrap_or_default()
    }
}

/// A clock that only moves when told to
///
/// ```rust
/// use cadence::{Clock, ManualClock};
///
/// let clock = ManualClock::new(1_000);
/// clock.advance(250);
/// assert_eq!(clock.now_ms(), 1_250);
/// ```
#[derive(Debug, Default, Clone)]
pub struct ManualClock {
    now: Cell<Millis>,
}

impl ManualClock {
    pub const fn new(start: Millis) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    /// Jump to an absolute time
    pub fn set(&self, now: Millis) {
        self.now.set(now);
    }

    /// Move forward by `millis`
    pub fn advance(&self, millis: Millis) {
        self.now.set(self.now.get().saturating_add(millis));
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> Millis {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> Millis {
        (**self).now_ms()
    }
}
