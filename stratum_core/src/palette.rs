// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Strip colors derived from the ambient theme.
//!
//! A [`Palette`] is a fixed three-color lookup with no lifecycle of its own:
//! the compositor picks one per rebuild from the theme cached at that
//! moment, and renderers receive it by reference. Icons never hard-code
//! colors.
//!
//! The mapping *contrasts* the ambient classification — a mostly dark scene
//! gets a light strip and vice versa — so the strip stays legible over
//! whatever the camera sees.

use image::Rgba;

use crate::theme::Theme;

/// The three colors every renderer draws with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    /// Primary foreground (text, active meter bars).
    pub fg: Rgba<u8>,
    /// De-emphasized foreground (inactive meter bars).
    pub fg_shading: Rgba<u8>,
    /// Strip background fill.
    pub bg: Rgba<u8>,
}

impl Palette {
    /// Light strip, used over dark scenes: near-black ink on pale gray.
    pub const LIGHT_STRIP: Self = Self {
        fg: Rgba([60, 63, 65, 255]),
        fg_shading: Rgba([200, 200, 200, 255]),
        bg: Rgba([236, 236, 236, 255]),
    };

    /// Dark strip, used over light scenes: white ink on slate gray.
    pub const DARK_STRIP: Self = Self {
        fg: Rgba([255, 255, 255, 255]),
        fg_shading: Rgba([130, 130, 130, 255]),
        bg: Rgba([60, 63, 65, 255]),
    };

    /// Looks up the palette for an ambient classification.
    #[must_use]
    pub const fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self::LIGHT_STRIP,
            Theme::Light => Self::DARK_STRIP,
        }
    }
}
