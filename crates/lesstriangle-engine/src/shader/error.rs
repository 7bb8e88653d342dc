use std::io;
use std::path::PathBuf;

/// Errors produced while assembling a shader program.
///
/// Only `ResourceUnavailable` is produced unconditionally; `Compile` and `Link`
/// are raised by [`ProgramAssembler`](super::ProgramAssembler) when the
/// failure policy asks to abort instead of continuing.
#[derive(Debug, thiserror::Error)]
pub enum ShaderError {
    #[error("failed to read shader resource `{}`", path.display())]
    ResourceUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{name} shader compile error: {log}")]
    Compile { name: String, log: String },

    #[error("shader program link error: {log}")]
    Link { log: String },
}
