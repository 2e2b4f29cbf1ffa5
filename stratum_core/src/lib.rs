// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Theme detection, icon contract, and strip compositing for stratum.
//!
//! `stratum_core` provides the stateful rendering pipeline that overlays a
//! theme-adaptive status strip onto a stream of video frames. The strip is
//! recomputed only when its content would visually change; it is composited
//! onto every frame regardless.
//!
//! # Architecture
//!
//! The crate is organized around a frame loop driven by the caller (a
//! capture/streaming application) that hands in one mutable frame at a time:
//!
//! ```text
//!   caller-owned frame
//!        │
//!        ▼
//!   BarCompositor::refresh ──► Theme classify ──► dirty check ──► rebuild
//!        │                                                          │
//!        ▼                                                          ▼
//!   BarCompositor::draw ◄───────── cached ComposedStrip ◄───────────┘
//!        │
//!        ▼
//!   frame + strip (taller by strip_height), back to the caller
//! ```
//!
//! **[`theme`]** — Ambient-brightness classification of the strip region.
//! The cached classification flips only when a freshly computed one differs,
//! and that inequality is the primary dirty signal.
//!
//! **[`palette`]** — The three strip colors derived from the theme by fixed
//! lookup. The palette contrasts the ambient classification: a dark scene
//! gets a light strip.
//!
//! **[`timing`]** — The per-frame [`FrameStamp`](timing::FrameStamp) and the
//! injectable [`WallClock`](timing::WallClock) capability. Renderers derive
//! their visual state as pure functions of the stamp.
//!
//! **[`icon`]** — The [`IconRenderer`](icon::IconRenderer) contract that
//! pluggable icons implement, and the clipped
//! [`IconCanvas`](icon::IconCanvas) they draw into.
//!
//! **[`compositor`]** — The [`BarCompositor`](compositor::BarCompositor)
//! owning the theme cache, the dirty aggregation across renderers, the
//! cached strip image, and the final frame concatenation.
//!
//! Frames are `image::DynamicImage` buffers; every operation first
//! normalizes them to 8-bit RGBA in place. The shipped renderer
//! implementations (signal meter, wall clock) live in `stratum_icons`.

pub mod compositor;
pub mod icon;
pub mod palette;
pub mod theme;
pub mod timing;
