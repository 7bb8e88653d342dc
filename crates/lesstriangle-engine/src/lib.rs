//! LessTriangle engine crate.
//!
//! This crate owns the platform + GPU runtime pieces and the shader program
//! pipeline (load, compile, link, bind) used by the demo binary.

pub mod device;
pub mod window;
pub mod time;
pub mod core;

pub mod logging;
pub mod shader;
pub mod uniform;
pub mod geometry;
pub mod render;
