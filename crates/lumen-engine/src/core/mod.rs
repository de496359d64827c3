//! Core engine-facing contracts.
//!
//! This module defines the stable interface between the host (window runtime,
//! tests, headless drivers) and the per-frame work: the application contract
//! and the frame loop that drives it.

mod app;
mod frame_loop;

pub use app::{App, LoopControl};
pub use frame_loop::{FrameLoop, LoopState, TickCallback, TickOutcome};
