// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simulated capture loop that exercises the full strip pipeline.
//!
//! Runs a fixed number of synthetic frames through
//! [`BarCompositor::refresh`]/[`BarCompositor::draw`] — no camera needed.
//! The scene brightens halfway through so the ambient theme flips mid-run,
//! and PNG snapshots land in `target/strip_demo/` for eyeballing.
//!
//! Pass a TrueType font path as the first argument to get a live clock in
//! the strip; without one the clock icon degrades to a blank slot (which is
//! itself worth eyeballing). `RUST_LOG=debug` shows the rebuild decisions.

use std::error::Error;
use std::fs;
use std::path::Path;

use image::{DynamicImage, Rgba, RgbaImage};
use tracing_subscriber::EnvFilter;

use stratum_core::compositor::{BarCompositor, StripPadding};
use stratum_core::icon::IconRenderer;
use stratum_icons::{ClockIcon, SignalIcon};

const FRAME_COUNT: u64 = 90;
const FRAME_WIDTH: u32 = 640;
const FRAME_HEIGHT: u32 = 480;
const STRIP_HEIGHT: u32 = 20;
/// Frame at which the synthetic scene switches from night to day.
const DAYBREAK_FRAME: u64 = 45;
const SNAPSHOT_EVERY: u64 = 15;
const OUT_DIR: &str = "target/strip_demo";

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // -- renderers ---------------------------------------------------------
    let mut clock = ClockIcon::new(72.0, 12.5);
    if let Some(font_path) = std::env::args().nth(1) {
        clock = clock.with_font_path(font_path);
    }
    let renderers: Vec<Box<dyn IconRenderer>> =
        vec![Box::new(SignalIcon::new(16, 4)), Box::new(clock)];

    // -- compositor --------------------------------------------------------
    let mut compositor = BarCompositor::new(STRIP_HEIGHT, StripPadding::new(4, 8), renderers);

    // -- simulated loop ----------------------------------------------------
    fs::create_dir_all(OUT_DIR)?;
    for frame_index in 0..FRAME_COUNT {
        let mut frame = synthetic_frame(frame_index);

        // 1. Decide + rebuild (only when something changed).
        compositor.refresh(&mut frame);

        // 2. Composite the cached strip onto this frame.
        compositor.draw(&mut frame);

        if frame_index % SNAPSHOT_EVERY == 0 {
            let path = Path::new(OUT_DIR).join(format!("frame_{frame_index:03}.png"));
            frame.save(&path)?;
            tracing::info!(path = %path.display(), "snapshot written");
        }
    }

    println!(
        "{FRAME_COUNT} frames composited, {} strip rebuilds, final theme {:?}",
        compositor.rebuilds(),
        compositor.theme(),
    );
    Ok(())
}

/// A gradient scene: dark before [`DAYBREAK_FRAME`], bright after, with a
/// little per-frame drift so the output is visibly a sequence.
#[expect(
    clippy::cast_possible_truncation,
    reason = "shade is clamped to 255 and the drift modulus fits in u32"
)]
fn synthetic_frame(frame_index: u64) -> DynamicImage {
    let base: u32 = if frame_index < DAYBREAK_FRAME { 16 } else { 200 };
    let drift = (frame_index % 32) as u32;
    let img = RgbaImage::from_fn(FRAME_WIDTH, FRAME_HEIGHT, |x, y| {
        let shade = (base + (x + y + drift) / 24).min(255) as u8;
        Rgba([shade, shade, shade, 255])
    });
    DynamicImage::ImageRgba8(img)
}
