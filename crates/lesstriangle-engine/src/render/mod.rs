//! GPU rendering subsystem.
//!
//! Renderers issue GPU commands via wgpu and own their GPU resources
//! (pipelines, buffers, bind groups). Pipelines are built lazily for the
//! current surface format and rebuilt when it changes.

mod ctx;
mod program;

pub use ctx::{RenderCtx, RenderTarget};
pub use program::ProgramRenderer;
