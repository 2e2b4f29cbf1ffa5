// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The strip compositor: dirty aggregation, rebuild, and concatenation.
//!
//! [`BarCompositor`] owns the cached theme, the cached composed strip, and
//! the ordered renderer list. Work is split into two operations with very
//! different costs:
//!
//! - [`refresh`](BarCompositor::refresh) decides whether anything on the
//!   strip would look different this frame and rebuilds the cached strip
//!   only then. Calling it every frame is expected and cheap when clean.
//! - [`draw`](BarCompositor::draw) concatenates the cached strip above the
//!   frame unconditionally. It never rebuilds.
//!
//! The rebuild runs when any of these dirty signals fire:
//!
//! 1. the freshly classified theme differs from the cached one,
//! 2. no strip has been built yet,
//! 3. the cached strip's width no longer matches the frame's width, or
//! 4. any registered renderer reports stale content for this frame's stamp.
//!
//! Signal 3 makes a frame-size change structurally invalidating on its own;
//! the theme/renderer signals alone would not catch it.

use image::{DynamicImage, GenericImageView as _, RgbaImage, imageops};
use tracing::{debug, trace, warn};

use crate::icon::{IconCanvas, IconRenderer};
use crate::palette::Palette;
use crate::theme::Theme;
use crate::timing::{FrameStamp, SystemClock, WallClock};

/// Outer and inter-icon spacing for the strip layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StripPadding {
    /// Padding between the strip edges and the icon band, in pixels.
    /// Applied vertically on both sides and horizontally before the first
    /// icon.
    pub outer: u32,
    /// Horizontal gap between consecutive icons, in pixels.
    pub gap: u32,
}

impl StripPadding {
    /// Creates a padding pair.
    #[must_use]
    pub const fn new(outer: u32, gap: u32) -> Self {
        Self { outer, gap }
    }
}

/// Composites a theme-adaptive status strip onto caller-owned frames.
///
/// One instance belongs to exactly one frame-processing thread; internal
/// caches are mutated without synchronization. The caller runs
/// `refresh(frame)` then `draw(frame)` once per frame, in that order.
pub struct BarCompositor {
    strip_height: u32,
    padding: StripPadding,
    renderers: Vec<Box<dyn IconRenderer>>,
    clock: Box<dyn WallClock>,

    theme: Theme,
    strip: Option<RgbaImage>,
    frame_index: u64,
    rebuilds: u64,
}

impl BarCompositor {
    /// Creates a compositor over the given renderers, in layout order,
    /// reading the system clock.
    ///
    /// # Panics
    ///
    /// Panics if `strip_height` is zero.
    #[must_use]
    pub fn new(
        strip_height: u32,
        padding: StripPadding,
        renderers: Vec<Box<dyn IconRenderer>>,
    ) -> Self {
        Self::with_clock(strip_height, padding, renderers, Box::new(SystemClock))
    }

    /// Creates a compositor with an injected wall clock (tests, simulated
    /// loops).
    ///
    /// # Panics
    ///
    /// Panics if `strip_height` is zero.
    #[must_use]
    pub fn with_clock(
        strip_height: u32,
        padding: StripPadding,
        renderers: Vec<Box<dyn IconRenderer>>,
        clock: Box<dyn WallClock>,
    ) -> Self {
        assert!(strip_height > 0, "strip height must not be zero");
        Self {
            strip_height,
            padding,
            renderers,
            clock,
            theme: Theme::default(),
            strip: None,
            frame_index: 0,
            rebuilds: 0,
        }
    }

    /// The configured strip height in pixels.
    #[must_use]
    pub const fn strip_height(&self) -> u32 {
        self.strip_height
    }

    /// The currently cached ambient classification.
    #[must_use]
    pub const fn theme(&self) -> Theme {
        self.theme
    }

    /// Read-only view of the cached composed strip, if one has been built.
    #[must_use]
    pub const fn strip(&self) -> Option<&RgbaImage> {
        self.strip.as_ref()
    }

    /// Number of strip rebuilds performed so far.
    ///
    /// Two consecutive [`refresh`](Self::refresh) calls with no change in
    /// frame content or renderer state leave this counter unchanged.
    #[must_use]
    pub const fn rebuilds(&self) -> u64 {
        self.rebuilds
    }

    /// Conditionally rebuilds the cached strip for this frame.
    ///
    /// Normalizes `frame` to RGBA8 in place, classifies the ambient theme
    /// of the strip region, and rebuilds the cached strip if any dirty
    /// signal fires (see the module docs). Returns `true` if a rebuild
    /// happened. When nothing changed this is an idempotent no-op, safe and
    /// cheap to call every frame.
    pub fn refresh(&mut self, frame: &mut DynamicImage) -> bool {
        let frame = ensure_rgba8(frame);
        let stamp = FrameStamp::new(self.frame_index, self.clock.now());
        self.frame_index += 1;

        let region_height = self.strip_height.min(frame.height());
        let theme = Theme::classify(&*frame.view(0, 0, frame.width(), region_height));
        let theme_changed = theme != self.theme;
        if theme_changed {
            debug!(old = ?self.theme, new = ?theme, "ambient theme flipped");
            self.theme = theme;
        }

        let width_stale = self
            .strip
            .as_ref()
            .is_some_and(|strip| strip.width() != frame.width());
        let stale = theme_changed
            || self.strip.is_none()
            || width_stale
            || self.renderers.iter().any(|r| r.check_refresh(stamp));
        if !stale {
            trace!(frame = stamp.index, "strip clean, skipping rebuild");
            return false;
        }

        self.rebuild(frame.width(), stamp);
        true
    }

    /// Rebuilds the cached strip at the given width.
    fn rebuild(&mut self, width: u32, stamp: FrameStamp) {
        let palette = Palette::for_theme(self.theme);
        let mut strip = RgbaImage::from_pixel(width, self.strip_height, palette.bg);

        let band_y = self.padding.outer.min(self.strip_height);
        let band_height = self
            .strip_height
            .saturating_sub(self.padding.outer.saturating_mul(2));
        let mut cursor = self.padding.outer;
        for renderer in &mut self.renderers {
            let mut canvas = IconCanvas::new(
                &mut strip,
                cursor,
                band_y,
                width.saturating_sub(cursor),
                band_height,
            );
            let used = renderer.draw(&mut canvas, &palette, stamp);
            cursor = cursor.saturating_add(used).saturating_add(self.padding.gap);
        }

        // Replace the previous strip wholesale; one live buffer at a time.
        self.strip = Some(strip);
        self.rebuilds += 1;
        debug!(
            frame = stamp.index,
            width,
            rebuilds = self.rebuilds,
            theme = ?self.theme,
            "strip rebuilt"
        );
    }

    /// Concatenates the cached strip above `frame`, in place.
    ///
    /// Normalizes `frame` to RGBA8 exactly like [`refresh`](Self::refresh),
    /// then replaces it with a frame taller by the strip height whose top
    /// rows are the cached strip. If no strip has been built yet, or the
    /// cached strip's width does not match the frame, the frame is left
    /// unchanged (beyond normalization): a dropped overlay is preferable to
    /// interrupting the video pipeline.
    pub fn draw(&self, frame: &mut DynamicImage) {
        let rgba = ensure_rgba8(frame);
        let Some(strip) = self.strip.as_ref() else {
            debug!("draw called before any successful refresh; frame unchanged");
            return;
        };
        if strip.width() != rgba.width() {
            warn!(
                strip_width = strip.width(),
                frame_width = rgba.width(),
                "cached strip does not fit this frame; skipping overlay"
            );
            return;
        }

        let mut out = RgbaImage::new(rgba.width(), rgba.height() + strip.height());
        imageops::replace(&mut out, strip, 0, 0);
        imageops::replace(&mut out, rgba, 0, i64::from(strip.height()));
        *frame = DynamicImage::ImageRgba8(out);
    }
}

impl core::fmt::Debug for BarCompositor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BarCompositor")
            .field("strip_height", &self.strip_height)
            .field("padding", &self.padding)
            .field("renderers", &self.renderers.len())
            .field("theme", &self.theme)
            .field("frame_index", &self.frame_index)
            .field("rebuilds", &self.rebuilds)
            .finish_non_exhaustive()
    }
}

/// Normalizes a frame to the 8-bit 4-channel representation every operation
/// depends on, converting in place only when needed.
fn ensure_rgba8(frame: &mut DynamicImage) -> &mut RgbaImage {
    if !matches!(frame, DynamicImage::ImageRgba8(_)) {
        *frame = DynamicImage::ImageRgba8(frame.to_rgba8());
    }
    match frame {
        DynamicImage::ImageRgba8(rgba) => rgba,
        _ => unreachable!("frame was normalized to RGBA8 above"),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use image::{GenericImageView as _, Rgba};

    use super::*;
    use crate::timing::ManualClock;

    const DARK_PIXEL: Rgba<u8> = Rgba([10, 10, 10, 255]);
    const LIGHT_PIXEL: Rgba<u8> = Rgba([240, 240, 240, 255]);

    /// Renderer stub with an externally driven dirty flag. Draws a marker
    /// pixel at its region's origin so layout tests can locate it.
    struct StubIcon {
        dirty: Rc<Cell<bool>>,
        width: u32,
        marker: Rgba<u8>,
    }

    impl StubIcon {
        fn new(width: u32, marker: Rgba<u8>) -> (Self, Rc<Cell<bool>>) {
            let dirty = Rc::new(Cell::new(false));
            let stub = Self {
                dirty: dirty.clone(),
                width,
                marker,
            };
            (stub, dirty)
        }
    }

    impl IconRenderer for StubIcon {
        fn check_refresh(&self, _stamp: FrameStamp) -> bool {
            self.dirty.get()
        }

        fn draw(
            &mut self,
            canvas: &mut IconCanvas<'_>,
            _palette: &Palette,
            _stamp: FrameStamp,
        ) -> u32 {
            canvas.put_pixel(0, 0, self.marker);
            self.width
        }
    }

    fn solid_frame(width: u32, height: u32, px: Rgba<u8>) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, px))
    }

    fn compositor_with(
        renderers: Vec<Box<dyn IconRenderer>>,
        padding: StripPadding,
    ) -> BarCompositor {
        BarCompositor::with_clock(20, padding, renderers, Box::new(ManualClock::new(0)))
    }

    #[test]
    fn refresh_is_idempotent_when_nothing_changed() {
        let (stub, _dirty) = StubIcon::new(16, Rgba([1, 2, 3, 255]));
        let mut compositor = compositor_with(vec![Box::new(stub)], StripPadding::new(4, 8));

        let mut frame = solid_frame(64, 48, LIGHT_PIXEL);
        assert!(compositor.refresh(&mut frame), "first refresh builds");
        assert_eq!(compositor.rebuilds(), 1);

        assert!(!compositor.refresh(&mut frame), "clean refresh is a no-op");
        assert!(!compositor.refresh(&mut frame));
        assert_eq!(compositor.rebuilds(), 1);
    }

    #[test]
    fn renderer_staleness_triggers_a_rebuild() {
        let (stub, dirty) = StubIcon::new(16, Rgba([1, 2, 3, 255]));
        let mut compositor = compositor_with(vec![Box::new(stub)], StripPadding::new(4, 8));

        let mut frame = solid_frame(64, 48, LIGHT_PIXEL);
        compositor.refresh(&mut frame);
        dirty.set(true);
        assert!(compositor.refresh(&mut frame));
        assert_eq!(compositor.rebuilds(), 2);
    }

    #[test]
    fn theme_flip_triggers_a_rebuild_and_repaints_the_background() {
        let mut compositor = compositor_with(Vec::new(), StripPadding::new(4, 8));

        let mut light = solid_frame(64, 48, LIGHT_PIXEL);
        compositor.refresh(&mut light);
        assert_eq!(compositor.theme(), Theme::Light);
        let dark_strip_bg = Palette::DARK_STRIP.bg;
        assert_eq!(*compositor.strip().unwrap().get_pixel(0, 0), dark_strip_bg);

        let mut dark = solid_frame(64, 48, DARK_PIXEL);
        assert!(compositor.refresh(&mut dark), "theme flip rebuilds");
        assert_eq!(compositor.theme(), Theme::Dark);
        let light_strip_bg = Palette::LIGHT_STRIP.bg;
        assert_eq!(*compositor.strip().unwrap().get_pixel(0, 0), light_strip_bg);
        assert_eq!(compositor.rebuilds(), 2);
    }

    #[test]
    fn frame_width_change_invalidates_the_cached_strip() {
        let mut compositor = compositor_with(Vec::new(), StripPadding::new(4, 8));

        let mut frame = solid_frame(64, 48, LIGHT_PIXEL);
        compositor.refresh(&mut frame);
        assert_eq!(compositor.strip().unwrap().width(), 64);

        // Same theme, no renderers: only the width check can fire here.
        let mut wider = solid_frame(128, 48, LIGHT_PIXEL);
        assert!(compositor.refresh(&mut wider));
        assert_eq!(compositor.strip().unwrap().width(), 128);
        assert_eq!(compositor.rebuilds(), 2);
    }

    #[test]
    fn draw_before_any_refresh_leaves_the_frame_unchanged() {
        let compositor = compositor_with(Vec::new(), StripPadding::new(4, 8));
        let mut frame = solid_frame(64, 48, LIGHT_PIXEL);
        compositor.draw(&mut frame);
        assert_eq!((frame.width(), frame.height()), (64, 48));
    }

    #[test]
    fn draw_skips_the_overlay_on_width_mismatch() {
        let mut compositor = compositor_with(Vec::new(), StripPadding::new(4, 8));
        let mut frame = solid_frame(64, 48, LIGHT_PIXEL);
        compositor.refresh(&mut frame);

        let mut other = solid_frame(32, 48, LIGHT_PIXEL);
        compositor.draw(&mut other);
        assert_eq!((other.width(), other.height()), (32, 48));
    }

    #[test]
    fn draw_concatenates_the_strip_above_the_frame() {
        let mut compositor = compositor_with(Vec::new(), StripPadding::new(4, 8));
        let mut frame = solid_frame(64, 48, LIGHT_PIXEL);
        compositor.refresh(&mut frame);
        compositor.draw(&mut frame);

        assert_eq!((frame.width(), frame.height()), (64, 68));
        let out = frame.as_rgba8().expect("draw keeps frames RGBA8");
        let strip = compositor.strip().unwrap();
        // Top rows equal the cached strip...
        for y in 0..20 {
            for x in [0, 31, 63] {
                assert_eq!(out.get_pixel(x, y), strip.get_pixel(x, y));
            }
        }
        // ...and the original frame sits right below.
        for y in [20, 40, 67] {
            assert_eq!(*out.get_pixel(0, y), LIGHT_PIXEL);
        }
    }

    #[test]
    fn layout_places_icons_at_cumulative_offsets() {
        let marker_a = Rgba([201, 0, 0, 255]);
        let marker_b = Rgba([0, 202, 0, 255]);
        let marker_c = Rgba([0, 0, 203, 255]);
        let (a, _) = StubIcon::new(16, marker_a);
        let (b, _) = StubIcon::new(10, marker_b);
        let (c, _) = StubIcon::new(7, marker_c);
        let padding = StripPadding::new(4, 8);
        let mut compositor =
            compositor_with(vec![Box::new(a), Box::new(b), Box::new(c)], padding);

        let mut frame = solid_frame(128, 48, LIGHT_PIXEL);
        compositor.refresh(&mut frame);
        let strip = compositor.strip().unwrap();

        // Region k starts at outer + Σ(w_i + gap) for i < k; markers sit at
        // each region's origin, one band-padding down.
        assert_eq!(*strip.get_pixel(4, 4), marker_a);
        assert_eq!(*strip.get_pixel(4 + 16 + 8, 4), marker_b);
        assert_eq!(*strip.get_pixel(4 + 16 + 8 + 10 + 8, 4), marker_c);
    }

    #[test]
    fn zero_width_renderer_leaves_a_gap_only() {
        let marker_a = Rgba([201, 0, 0, 255]);
        let marker_b = Rgba([0, 202, 0, 255]);
        let (a, _) = StubIcon::new(0, marker_a);
        let (b, _) = StubIcon::new(10, marker_b);
        let mut compositor =
            compositor_with(vec![Box::new(a), Box::new(b)], StripPadding::new(4, 8));

        let mut frame = solid_frame(64, 48, LIGHT_PIXEL);
        compositor.refresh(&mut frame);
        let strip = compositor.strip().unwrap();

        // The degraded icon consumed nothing; the next starts one gap later.
        assert_eq!(*strip.get_pixel(4 + 8, 4), marker_b);
    }

    #[test]
    fn refresh_normalizes_the_caller_frame_to_rgba8() {
        let mut compositor = compositor_with(Vec::new(), StripPadding::new(4, 8));
        let gray = image::GrayImage::from_pixel(64, 48, image::Luma([250]));
        let mut frame = DynamicImage::ImageLuma8(gray);
        compositor.refresh(&mut frame);
        assert!(frame.as_rgba8().is_some());
        assert_eq!(compositor.theme(), Theme::Light);
    }
}
