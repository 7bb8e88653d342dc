use std::fmt;
use std::path::Path;

use super::ShaderError;

/// Pipeline role of a stage.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum StageKind {
    Vertex,
    Fragment,
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StageKind::Vertex => "vertex",
            StageKind::Fragment => "fragment",
        })
    }
}

/// Source text of one stage, tagged with the resource it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct StageSource {
    pub kind: StageKind,

    /// Resource identifier; used to name the stage in diagnostics.
    pub name: String,

    pub text: String,
}

impl StageSource {
    pub fn new(kind: StageKind, name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            text: text.into(),
        }
    }
}

/// Reads the whole resource at `path` as UTF-8 text.
///
/// Single-shot: no caching, no retry, no partial content on failure.
pub fn load_source(kind: StageKind, path: &Path) -> Result<StageSource, ShaderError> {
    let text = std::fs::read_to_string(path).map_err(|source| ShaderError::ResourceUnavailable {
        path: path.to_path_buf(),
        source,
    })?;

    log::debug!("loaded {kind} stage `{}` ({} bytes)", path.display(), text.len());

    Ok(StageSource::new(kind, path.display().to_string(), text))
}
