//! Uniform values and per-frame binding.
//!
//! Convention:
//! - uniforms are resolved by name against the linked program
//! - a name the program does not declare is a silent no-op
//! - the uniform contract with shader resources is `resolution` (`vec2<i32>`),
//!   `u_time` (`f32`) and `day_time` (`i32`, 0 or 1)

mod binder;
mod table;
mod value;

pub use binder::{scaled_resolution, FrameState, FrameUniformBinder, UniformTarget, DAY_TIME, RESOLUTION, U_TIME};
pub use table::{SetOutcome, UniformTable};
pub use value::UniformValue;
