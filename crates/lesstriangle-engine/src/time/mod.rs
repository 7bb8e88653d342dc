//! Time subsystem.
//!
//! Provides stable, testable frame timing utilities without coupling to the runtime.
//! Intended usage:
//! - one `FrameClock` per render loop
//! - call `tick()` once per presented frame to obtain `FrameTime`
//! - feed `FrameTime::elapsed` to the `u_time` uniform

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
