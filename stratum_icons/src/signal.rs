// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simulated signal-strength meter.
//!
//! The meter has no radio behind it; it cycles through its levels on the
//! compositor's frame counter, advancing one tenth of a level per frame.
//! The discrete level is a pure function of the
//! [`FrameStamp`](stratum_core::timing::FrameStamp) — `check_refresh`
//! compares it against the level last committed by `draw` and mutates
//! nothing, so the meter's state cannot be skewed by how often either
//! method is polled.

use stratum_core::icon::{IconCanvas, IconRenderer};
use stratum_core::palette::Palette;
use stratum_core::timing::FrameStamp;

/// Level advance per frame: ten frames move the meter one level.
const LEVEL_STEP: f64 = 0.1;

/// Painted width of one meter bar, in pixels.
const BAR_WIDTH: u32 = 2;

/// A cycling 0..`max_level` signal-strength bar meter.
#[derive(Clone, Debug)]
pub struct SignalIcon {
    icon_width: u32,
    max_level: u32,
    committed: Option<u32>,
}

impl SignalIcon {
    /// Creates a meter of the given total width with `max_level` bars.
    ///
    /// # Panics
    ///
    /// Panics if `max_level` is zero.
    #[must_use]
    pub fn new(icon_width: u32, max_level: u32) -> Self {
        assert!(max_level > 0, "signal meter needs at least one level");
        Self {
            icon_width,
            max_level,
            committed: None,
        }
    }

    /// The discrete level this icon would show for `stamp`:
    /// `floor(0.1 · index) mod max_level`. Pure; commits nothing.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "non-negative, and reduced mod max_level before the final cast"
    )]
    pub fn peek_level(&self, stamp: FrameStamp) -> u32 {
        let ticks = (LEVEL_STEP * stamp.index as f64).floor() as u64;
        (ticks % u64::from(self.max_level)) as u32
    }
}

impl IconRenderer for SignalIcon {
    fn check_refresh(&self, stamp: FrameStamp) -> bool {
        self.committed != Some(self.peek_level(stamp))
    }

    fn draw(&mut self, canvas: &mut IconCanvas<'_>, palette: &Palette, stamp: FrameStamp) -> u32 {
        let level = self.peek_level(stamp);
        let height = canvas.height();
        let slot = self.icon_width / self.max_level;

        // max_level bars of increasing height, left to right; bars below the
        // current level light up in fg, the rest stay shaded.
        for i in 0..self.max_level {
            let x = 1 + i * slot;
            let top = (height.saturating_sub(4) / self.max_level)
                .saturating_mul(self.max_level - i)
                .saturating_sub(1);
            let color = if i < level { palette.fg } else { palette.fg_shading };
            canvas.fill_rect(x, top, BAR_WIDTH, height.saturating_sub(top), color);
        }

        self.committed = Some(level);
        self.icon_width
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Local};
    use image::{Rgba, RgbaImage};

    use super::*;

    fn stamp(index: u64) -> FrameStamp {
        let wall = DateTime::from_timestamp(0, 0).unwrap().with_timezone(&Local);
        FrameStamp::new(index, wall)
    }

    #[test]
    fn level_is_floor_of_tenth_steps_mod_max() {
        let icon = SignalIcon::new(16, 4);
        // floor(0.1 * N) mod 4
        assert_eq!(icon.peek_level(stamp(0)), 0);
        assert_eq!(icon.peek_level(stamp(9)), 0);
        assert_eq!(icon.peek_level(stamp(10)), 1);
        assert_eq!(icon.peek_level(stamp(35)), 3);
        assert_eq!(icon.peek_level(stamp(40)), 0); // floor(4.0) mod 4
        assert_eq!(icon.peek_level(stamp(45)), 0); // floor(4.5) mod 4
        assert_eq!(icon.peek_level(stamp(50)), 1);
    }

    #[test]
    fn check_refresh_is_pure_and_tracks_commits() {
        let mut icon = SignalIcon::new(16, 4);
        // Nothing committed yet: stale, and repeat polls agree.
        assert!(icon.check_refresh(stamp(0)));
        assert!(icon.check_refresh(stamp(0)));

        let mut strip = RgbaImage::new(16, 12);
        let mut canvas = IconCanvas::new(&mut strip, 0, 0, 16, 12);
        icon.draw(&mut canvas, &Palette::LIGHT_STRIP, stamp(0));

        // Committed level 0 holds for frames 0..=9, flips at 10.
        assert!(!icon.check_refresh(stamp(0)));
        assert!(!icon.check_refresh(stamp(9)));
        assert!(icon.check_refresh(stamp(10)));
    }

    #[test]
    fn draw_reports_the_configured_width_regardless_of_level() {
        let mut icon = SignalIcon::new(16, 4);
        let mut strip = RgbaImage::new(40, 12);
        let mut canvas = IconCanvas::new(&mut strip, 0, 0, 40, 12);
        assert_eq!(icon.draw(&mut canvas, &Palette::LIGHT_STRIP, stamp(0)), 16);
        assert_eq!(icon.draw(&mut canvas, &Palette::LIGHT_STRIP, stamp(25)), 16);
    }

    #[test]
    fn bars_split_into_active_and_shaded_at_the_level() {
        let palette = Palette::LIGHT_STRIP;
        let mut icon = SignalIcon::new(16, 4);
        let bg = Rgba([0, 0, 0, 0]);
        let mut strip = RgbaImage::from_pixel(16, 12, bg);
        let mut canvas = IconCanvas::new(&mut strip, 0, 0, 16, 12);

        // Frame 25 → level 2: bars 0 and 1 active, 2 and 3 shaded.
        icon.draw(&mut canvas, &palette, stamp(25));

        // Bars sit at x = 1 + 4i; tops at (12-4)/4 * (4-i) - 1 = 7, 5, 3, 1.
        assert_eq!(*strip.get_pixel(1, 7), palette.fg);
        assert_eq!(*strip.get_pixel(5, 5), palette.fg);
        assert_eq!(*strip.get_pixel(9, 3), palette.fg_shading);
        assert_eq!(*strip.get_pixel(13, 1), palette.fg_shading);
        // All bars reach the bottom row; above its top a bar leaves the
        // background alone.
        assert_eq!(*strip.get_pixel(1, 11), palette.fg);
        assert_eq!(*strip.get_pixel(1, 6), bg);
    }

    #[test]
    fn level_wraps_after_a_full_cycle() {
        let mut icon = SignalIcon::new(16, 4);
        let mut strip = RgbaImage::new(16, 12);
        let mut canvas = IconCanvas::new(&mut strip, 0, 0, 16, 12);
        icon.draw(&mut canvas, &Palette::LIGHT_STRIP, stamp(39)); // level 3
        assert!(icon.check_refresh(stamp(40)), "wrap to 0 is a change");
    }
}
