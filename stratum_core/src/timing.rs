// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-frame timing: the frame stamp and the wall-clock capability.
//!
//! [`BarCompositor`](crate::compositor::BarCompositor) captures exactly one
//! [`FrameStamp`] per `refresh` call and passes it to every renderer call
//! made during that frame. Renderers derive their visual state as *pure
//! functions* of the stamp plus their own last-committed state, so polling
//! [`check_refresh`](crate::icon::IconRenderer::check_refresh) any number of
//! times observes the same answer and mutates nothing.
//!
//! The wall clock is injectable via [`WallClock`] so that time-dependent
//! renderers (and the compositor's dirty logic) can be driven by a
//! [`ManualClock`] in tests and simulations instead of sleeping across real
//! minute boundaries.

use core::cell::Cell;
use std::rc::Rc;

use chrono::{DateTime, Local};

/// A per-frame snapshot captured once per
/// [`refresh`](crate::compositor::BarCompositor::refresh).
///
/// `index` increments by one on every refresh and acts as the monotonic
/// virtual clock for simulated renderers (e.g. the cycling signal meter);
/// `wall` is the wall-clock time the frame represents.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameStamp {
    /// Monotonically increasing frame counter (one tick per refresh).
    pub index: u64,
    /// Wall-clock time captured at the start of the refresh.
    pub wall: DateTime<Local>,
}

impl FrameStamp {
    /// Creates a stamp from a frame counter and a wall-clock reading.
    #[must_use]
    pub const fn new(index: u64, wall: DateTime<Local>) -> Self {
        Self { index, wall }
    }

    /// Whole minutes since the Unix epoch for this stamp's wall time.
    ///
    /// Minute granularity is the refresh boundary for clock-style icons:
    /// two stamps within the same minute compare equal here.
    #[must_use]
    pub fn unix_minutes(&self) -> i64 {
        self.wall.timestamp().div_euclid(60)
    }
}

/// Source of wall-clock readings for the compositor.
///
/// The compositor owns exactly one clock and reads it once per refresh.
/// Production code uses [`SystemClock`]; tests and simulations inject a
/// [`ManualClock`].
pub trait WallClock {
    /// Returns the current wall-clock time.
    fn now(&self) -> DateTime<Local>;
}

/// The real system clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl WallClock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// A hand-driven clock for tests and simulated frame loops.
///
/// Clones share the same underlying time, so a test can keep one handle and
/// hand another to the compositor, then advance time between frames:
///
/// ```
/// use stratum_core::timing::{ManualClock, WallClock};
///
/// let clock = ManualClock::new(1_000_000);
/// let handle = clock.clone();
/// handle.advance(61);
/// assert_eq!(clock.now().timestamp(), 1_000_061);
/// ```
///
/// Internally shared through `Rc`, which makes this type deliberately
/// `!Send`: the compositor and everything it owns belong to a single
/// frame-processing thread.
#[derive(Clone, Debug)]
pub struct ManualClock {
    epoch_seconds: Rc<Cell<i64>>,
}

impl ManualClock {
    /// Creates a clock frozen at the given seconds since the Unix epoch.
    #[must_use]
    pub fn new(epoch_seconds: i64) -> Self {
        Self {
            epoch_seconds: Rc::new(Cell::new(epoch_seconds)),
        }
    }

    /// Jumps the clock to an absolute time.
    pub fn set(&self, epoch_seconds: i64) {
        self.epoch_seconds.set(epoch_seconds);
    }

    /// Advances the clock by the given number of seconds.
    pub fn advance(&self, seconds: i64) {
        self.epoch_seconds.set(self.epoch_seconds.get() + seconds);
    }
}

impl WallClock for ManualClock {
    fn now(&self) -> DateTime<Local> {
        DateTime::from_timestamp(self.epoch_seconds.get(), 0)
            .unwrap_or_default()
            .with_timezone(&Local)
    }
}
