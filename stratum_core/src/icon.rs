// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The pluggable icon contract and the clipped canvas icons draw into.
//!
//! The compositor is polymorphic over an ordered list of [`IconRenderer`]s.
//! Registration order is layout order: during a rebuild each renderer is
//! handed an [`IconCanvas`] starting at the current layout cursor and
//! spanning to the strip's right edge, and the width it reports consuming
//! advances the cursor for the next one.
//!
//! # Frame loop pseudocode
//!
//! A compositor rebuild drives the contract like this:
//!
//! ```rust,ignore
//! let stamp = FrameStamp::new(frame_index, clock.now());
//!
//! // Dirty check: pure, repeatable, no commitment.
//! let stale = renderers.iter().any(|r| r.check_refresh(stamp));
//!
//! // Rebuild: each renderer draws and commits its state exactly once.
//! for renderer in &mut renderers {
//!     let mut canvas = IconCanvas::new(&mut strip, cursor, band_y, .., ..);
//!     cursor += renderer.draw(&mut canvas, &palette, stamp) + gap;
//! }
//! ```
//!
//! Because `check_refresh` takes `&self` and derives its answer from the
//! [`FrameStamp`](crate::timing::FrameStamp), polling it repeatedly cannot
//! skew renderer state; only `draw` commits.

use core::fmt;

use image::{Rgba, RgbaImage};

use crate::palette::Palette;
use crate::timing::FrameStamp;

/// A pluggable unit that renders one icon and reports its own staleness.
///
/// Implementations own whatever private state they need (a committed signal
/// level, a committed minute) but must follow the contract:
///
/// - `check_refresh` is a *pure* predicate over the stamp and the
///   last-committed state. It must not mutate.
/// - `draw` renders using only the three palette colors, commits the state
///   it rendered, and returns the horizontal width it consumed so the
///   compositor can advance the layout cursor.
/// - A renderer that fails internally must log, leave its slot blank, and
///   return 0 — never panic. One icon's failure must not cost the frame.
pub trait IconRenderer {
    /// Returns `true` if this icon's visual content has changed since the
    /// state last committed by [`draw`](Self::draw).
    fn check_refresh(&self, stamp: FrameStamp) -> bool;

    /// Renders into `canvas` and returns the horizontal pixel width used.
    fn draw(&mut self, canvas: &mut IconCanvas<'_>, palette: &Palette, stamp: FrameStamp) -> u32;
}

/// A clipped drawing surface over a sub-rectangle of the strip.
///
/// Every write is silently clipped to the region, so a renderer cannot
/// draw outside the canvas it was handed regardless of the coordinates it
/// produces. Coordinates are local: `(0, 0)` is the region's top-left.
pub struct IconCanvas<'a> {
    target: &'a mut RgbaImage,
    x0: u32,
    y0: u32,
    width: u32,
    height: u32,
}

impl<'a> IconCanvas<'a> {
    /// Creates a canvas over the given rectangle of `target`.
    ///
    /// The rectangle is clamped to the target's bounds; a rectangle that
    /// falls entirely outside yields an empty (zero-size) canvas whose
    /// writes are all no-ops.
    #[must_use]
    pub fn new(target: &'a mut RgbaImage, x: u32, y: u32, width: u32, height: u32) -> Self {
        let x0 = x.min(target.width());
        let y0 = y.min(target.height());
        let width = width.min(target.width() - x0);
        let height = height.min(target.height() - y0);
        Self {
            target,
            x0,
            y0,
            width,
            height,
        }
    }

    /// Region width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Region height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Returns `true` if the region has no drawable pixels.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Writes one pixel at local coordinates, clipped to the region.
    pub fn put_pixel(&mut self, x: u32, y: u32, color: Rgba<u8>) {
        if x < self.width && y < self.height {
            self.target.put_pixel(self.x0 + x, self.y0 + y, color);
        }
    }

    /// Fills the whole region with one color.
    pub fn fill(&mut self, color: Rgba<u8>) {
        self.fill_rect(0, 0, self.width, self.height, color);
    }

    /// Fills a rectangle given in local coordinates, clipped to the region.
    pub fn fill_rect(&mut self, x: u32, y: u32, width: u32, height: u32, color: Rgba<u8>) {
        let x_end = x.saturating_add(width).min(self.width);
        let y_end = y.saturating_add(height).min(self.height);
        for py in y.min(self.height)..y_end {
            for px in x.min(self.width)..x_end {
                self.target.put_pixel(self.x0 + px, self.y0 + py, color);
            }
        }
    }

    /// Copies `src` into the region with its top-left at local `(x, y)`,
    /// clipping whatever does not fit.
    pub fn copy_from(&mut self, src: &RgbaImage, x: u32, y: u32) {
        let copy_w = src.width().min(self.width.saturating_sub(x));
        let copy_h = src.height().min(self.height.saturating_sub(y));
        for sy in 0..copy_h {
            for sx in 0..copy_w {
                self.target
                    .put_pixel(self.x0 + x + sx, self.y0 + y + sy, *src.get_pixel(sx, sy));
            }
        }
    }
}

impl fmt::Debug for IconCanvas<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "IconCanvas({}x{} at {},{})",
            self.width, self.height, self.x0, self.y0
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

    #[test]
    fn writes_are_offset_by_the_region_origin() {
        let mut img = RgbaImage::from_pixel(10, 10, BLACK);
        let mut canvas = IconCanvas::new(&mut img, 3, 2, 5, 4);
        canvas.put_pixel(0, 0, RED);
        assert_eq!(*img.get_pixel(3, 2), RED);
    }

    #[test]
    fn writes_outside_the_region_are_clipped() {
        let mut img = RgbaImage::from_pixel(10, 10, BLACK);
        let mut canvas = IconCanvas::new(&mut img, 3, 2, 5, 4);
        canvas.put_pixel(5, 0, RED); // x == width → out
        canvas.put_pixel(0, 4, RED); // y == height → out
        canvas.fill_rect(4, 3, 100, 100, RED); // clipped to the region
        assert!(img.pixels().filter(|px| **px == RED).count() == 1);
        assert_eq!(*img.get_pixel(7, 5), RED);
    }

    #[test]
    fn region_is_clamped_to_the_target() {
        let mut img = RgbaImage::from_pixel(10, 10, BLACK);
        let canvas = IconCanvas::new(&mut img, 8, 8, 100, 100);
        assert_eq!((canvas.width(), canvas.height()), (2, 2));

        let mut img = RgbaImage::from_pixel(10, 10, BLACK);
        let mut canvas = IconCanvas::new(&mut img, 20, 20, 5, 5);
        assert!(canvas.is_empty());
        canvas.fill(RED); // no-op on an empty region
        assert!(img.pixels().all(|px| *px == BLACK));
    }

    #[test]
    fn copy_from_clips_the_source() {
        let mut img = RgbaImage::from_pixel(10, 10, BLACK);
        let src = RgbaImage::from_pixel(6, 6, RED);
        let mut canvas = IconCanvas::new(&mut img, 2, 2, 4, 4);
        canvas.copy_from(&src, 1, 1);
        // 3x3 of the 6x6 source fits after the (1,1) offset.
        assert_eq!(img.pixels().filter(|px| **px == RED).count(), 9);
        assert_eq!(*img.get_pixel(3, 3), RED);
        assert_eq!(*img.get_pixel(5, 5), RED);
        assert_eq!(*img.get_pixel(6, 6), BLACK);
    }
}
