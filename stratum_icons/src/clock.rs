// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Wall-clock icon rendering `HH:MM` text.
//!
//! The icon refreshes at minute granularity: `check_refresh` compares the
//! stamp's whole-minute value against the minute last committed by a
//! *successful* draw. Rendering rasterizes the time string off-screen on
//! the strip background and blits the result into the canvas.
//!
//! Failure never leaves this module: an unreadable or invalid font file is
//! logged, the slot stays blank for this rebuild, zero width is returned so
//! the layout cursor does not advance past a ghost icon, and the committed
//! minute is left untouched so the next rebuild retries.

use std::fs;
use std::path::PathBuf;

use ab_glyph::{Font as _, FontVec, GlyphId, PxScale, ScaleFont as _, point};
use image::{Rgba, RgbaImage};
use thiserror::Error;
use tracing::warn;

use stratum_core::icon::{IconCanvas, IconRenderer};
use stratum_core::palette::Palette;
use stratum_core::timing::FrameStamp;

/// Where the clock face lives unless the caller overrides it.
const DEFAULT_FONT_PATH: &str = "conf/font/Nunito-Bold.ttf";

/// Blank pixels appended after the text, counted in the consumed width.
const TRAILING_MARGIN: u32 = 2;

#[derive(Debug, Error)]
enum FontError {
    #[error("font file unreadable: {0}")]
    Read(#[from] std::io::Error),
    #[error("font data invalid: {0}")]
    Parse(#[from] ab_glyph::InvalidFont),
}

/// The current time as rasterized text, refreshing once per minute.
pub struct ClockIcon {
    dpi: f32,
    font_size_pt: f32,
    font_path: PathBuf,
    /// Parsed font, cached after the first successful load.
    font: Option<FontVec>,
    committed_minute: Option<i64>,
}

impl ClockIcon {
    /// Creates a clock icon rendering at the given resolution and point
    /// size, loading its font from the default path.
    #[must_use]
    pub fn new(dpi: f32, font_size_pt: f32) -> Self {
        Self {
            dpi,
            font_size_pt,
            font_path: PathBuf::from(DEFAULT_FONT_PATH),
            font: None,
            committed_minute: None,
        }
    }

    /// Overrides the font file location.
    #[must_use]
    pub fn with_font_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.font_path = path.into();
        self
    }

    /// Loads and caches the font on first use.
    fn font(&mut self) -> Result<&FontVec, FontError> {
        if self.font.is_none() {
            let bytes = fs::read(&self.font_path)?;
            self.font = Some(FontVec::try_from_vec(bytes)?);
        }
        match self.font.as_ref() {
            Some(font) => Ok(font),
            None => unreachable!("font cached above"),
        }
    }

    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "measured text metrics are small non-negative pixel counts"
    )]
    fn render(
        &mut self,
        canvas: &mut IconCanvas<'_>,
        palette: &Palette,
        stamp: FrameStamp,
    ) -> Result<u32, FontError> {
        let px_size = PxScale::from(self.font_size_pt * self.dpi / 72.0);
        let fg = palette.fg;
        let bg = palette.bg;
        let text = stamp.wall.format("%H:%M").to_string();

        let font = self.font()?;
        let scaled = font.as_scaled(px_size);

        // Measure the kerned run first; the off-screen buffer is exactly as
        // wide as the text plus the trailing margin.
        let mut advance = 0.0_f32;
        let mut prev: Option<GlyphId> = None;
        for ch in text.chars() {
            let id = font.glyph_id(ch);
            if let Some(prev) = prev {
                advance += scaled.kern(prev, id);
            }
            advance += scaled.h_advance(id);
            prev = Some(id);
        }
        let width = advance.ceil() as u32 + TRAILING_MARGIN;
        let height = (px_size.y.floor() as u32).max(1);

        let mut text_img = RgbaImage::from_pixel(width, height, bg);
        let baseline = scaled.ascent();
        let mut caret = 0.0_f32;
        let mut prev: Option<GlyphId> = None;
        for ch in text.chars() {
            let id = font.glyph_id(ch);
            if let Some(prev) = prev {
                caret += scaled.kern(prev, id);
            }
            let glyph = id.with_scale_and_position(px_size, point(caret, baseline));
            caret += scaled.h_advance(id);
            prev = Some(id);

            let Some(outline) = font.outline_glyph(glyph) else {
                continue; // whitespace and such have no outline
            };
            let bounds = outline.px_bounds();
            outline.draw(|gx, gy, coverage| {
                let px = bounds.min.x as i32 + gx as i32;
                let py = bounds.min.y as i32 + gy as i32;
                if (0..width as i32).contains(&px) && (0..height as i32).contains(&py) {
                    let dst = text_img.get_pixel_mut(px as u32, py as u32);
                    *dst = blend(fg, *dst, coverage);
                }
            });
        }

        canvas.copy_from(&text_img, 0, 0);
        Ok(width)
    }
}

impl IconRenderer for ClockIcon {
    fn check_refresh(&self, stamp: FrameStamp) -> bool {
        self.committed_minute != Some(stamp.unix_minutes())
    }

    fn draw(&mut self, canvas: &mut IconCanvas<'_>, palette: &Palette, stamp: FrameStamp) -> u32 {
        match self.render(canvas, palette, stamp) {
            Ok(width) => {
                self.committed_minute = Some(stamp.unix_minutes());
                width
            }
            Err(err) => {
                warn!(
                    font = %self.font_path.display(),
                    error = %err,
                    "clock icon degraded to an empty slot"
                );
                0
            }
        }
    }
}

impl core::fmt::Debug for ClockIcon {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ClockIcon")
            .field("dpi", &self.dpi)
            .field("font_size_pt", &self.font_size_pt)
            .field("font_path", &self.font_path)
            .field("font_loaded", &self.font.is_some())
            .field("committed_minute", &self.committed_minute)
            .finish()
    }
}

/// Mixes `fg` over `bg` by glyph coverage.
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "clamped coverage keeps every channel mix within u8 range"
)]
fn blend(fg: Rgba<u8>, bg: Rgba<u8>, coverage: f32) -> Rgba<u8> {
    let c = coverage.clamp(0.0, 1.0);
    let mix = |f: u8, b: u8| (f32::from(f) * c + f32::from(b) * (1.0 - c)).round() as u8;
    Rgba([
        mix(fg.0[0], bg.0[0]),
        mix(fg.0[1], bg.0[1]),
        mix(fg.0[2], bg.0[2]),
        mix(fg.0[3], bg.0[3]),
    ])
}
