// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shipped icon renderers for stratum.
//!
//! This crate provides the two
//! [`IconRenderer`](stratum_core::icon::IconRenderer) implementations the
//! status strip ships with:
//!
//! - [`SignalIcon`] — a simulated signal-strength meter cycling through its
//!   levels on the compositor's frame counter
//! - [`ClockIcon`] — the current wall-clock time as rasterized `HH:MM`
//!   text, refreshing once per minute
//!
//! Both follow the contract's degrade-and-continue rule: a renderer that
//! cannot produce its icon (a missing font, say) logs, leaves its slot
//! blank, and lets the rest of the strip carry on.

mod clock;
mod signal;

pub use clock::ClockIcon;
pub use signal::SignalIcon;
