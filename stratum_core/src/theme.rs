// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ambient-brightness classification of the strip region.
//!
//! The compositor classifies the top rows of every incoming frame — the
//! region the strip will cover — so the strip can adapt its colors to what
//! is behind it. Classification is cheap and deterministic, so it runs every
//! frame; only the *cached* value on the compositor flips, and only when a
//! freshly computed classification differs from it. That inequality is the
//! primary dirty signal for strip rebuilds.
//!
//! The classifier reduces each pixel to a BT.601 luma value, binarizes at
//! the fixed midpoint, and counts the fraction of pixels on the dark side.
//! A region that is more than half dark classifies as [`Theme::Dark`].

use image::{GenericImageView, Rgba};

/// Luma midpoint used for binarization. Pixels strictly below this count as
/// dark.
const LUMA_MIDPOINT: u32 = 128;

/// Ambient-brightness classification of the strip region.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Theme {
    /// Half or more of the region's pixels are at or above the midpoint.
    #[default]
    Light,
    /// More than half of the region's pixels are below the midpoint.
    Dark,
}

impl Theme {
    /// Classifies a region by its dark-pixel fraction.
    ///
    /// Returns [`Theme::Dark`] exactly when the fraction of pixels whose
    /// luma falls strictly below the midpoint exceeds 0.5; a fraction of
    /// exactly 0.5 or below classifies as [`Theme::Light`]. An empty region
    /// classifies as [`Theme::Light`].
    #[must_use]
    pub fn classify(region: &impl GenericImageView<Pixel = Rgba<u8>>) -> Self {
        let total = u64::from(region.width()) * u64::from(region.height());
        if total == 0 {
            return Self::Light;
        }
        let dark = region
            .pixels()
            .filter(|(_, _, px)| luma(px) < LUMA_MIDPOINT)
            .count() as u64;
        // Strict majority, compared in integers: dark / total > 1/2.
        if dark > total / 2 {
            Self::Dark
        } else {
            Self::Light
        }
    }
}

/// BT.601 luma approximation in integer arithmetic.
fn luma(px: &Rgba<u8>) -> u32 {
    let [r, g, b, _] = px.0;
    (299 * u32::from(r) + 587 * u32::from(g) + 114 * u32::from(b)) / 1000
}
