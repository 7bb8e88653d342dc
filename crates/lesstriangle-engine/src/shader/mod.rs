//! Shader program pipeline.
//!
//! Stages flow through four steps:
//! - `source`: read a named text resource into a [`StageSource`]
//! - `compile`: compile every stage of one program into [`ShaderStage`]s
//! - `link`: attach one vertex stage and N fragment stages, link into a [`ShaderProgram`]
//! - `assemble`: drive the three steps above under a [`FailurePolicy`]
//!
//! Compilation and linking run on the CPU through `naga`, the shader compiler
//! `wgpu` itself uses, so outcomes are known before any GPU object exists.

mod assemble;
mod compile;
mod error;
mod link;
mod reflect;
mod source;
mod unit;

pub use assemble::{FailurePolicy, ProgramAssembler, ProgramManifest};
pub use compile::{compile_stages, CompileOutcome, ShaderStage, MAX_DIAGNOSTIC_LEN};
pub use error::ShaderError;
pub use link::{link, LinkOutcome, LinkedModule, ShaderProgram};
pub use reflect::{UniformScalar, UniformSlot, UniformType};
pub use source::{load_source, StageKind, StageSource};
