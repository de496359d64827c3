//! Time subsystem.
//!
//! Provides stable, testable frame timing utilities without coupling to the runtime.
//! Intended usage:
//! - the frame loop owns one `TickSource`
//! - `FrameClock` in windowed runs, `FixedStep` in tests and headless runs

mod frame_clock;
mod ticker;

pub use frame_clock::{FrameClock, FrameTime};
pub use ticker::{FixedStep, TickSource};
