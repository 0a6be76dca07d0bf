//! Wall-clock abstraction.
//!
//! The session engine never accumulates elapsed time by counting ticks --
//! ticks drift whenever the host process is suspended, throttled, or a
//! background tab is frozen. Elapsed time is recomputed from absolute
//! timestamps on every read, so the engine only needs a source of "now".
//!
//! Hosts inject a [`Clock`] (normally [`SystemClock`]) and pass its
//! reading into the session operations; tests use [`ManualClock`] to make
//! every computation deterministic without waiting.

use std::cell::Cell;

use chrono::{DateTime, Duration, Utc};

/// Source of the current instant.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Reads the operating system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A settable clock for tests and deterministic hosts.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Cell<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        self.now.set(now);
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

/// Whole seconds elapsed between `started_at` and `now`, minus the time
/// spent paused. Saturates at zero if the clock ran backwards or the
/// paused total exceeds the wall span.
pub fn elapsed_seconds(started_at: DateTime<Utc>, paused_secs: u64, now: DateTime<Utc>) -> u64 {
    let wall = (now - started_at).num_seconds().max(0) as u64;
    wall.saturating_sub(paused_secs)
}
