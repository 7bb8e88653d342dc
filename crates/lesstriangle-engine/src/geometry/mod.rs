//! Static geometry.
//!
//! The only geometry in the pipeline is one full-screen quad in normalized
//! device coordinates; all shading happens in the fragment stages.

mod quad;

pub use quad::{GeometryBuffer, QuadVertex, FULLSCREEN_QUAD, QUAD_VERTEX_COUNT};
