use std::path::PathBuf;

use super::{compile_stages, link, load_source, ShaderError, ShaderProgram, StageKind, StageSource};

/// What to do when a stage fails to compile or the program fails to link.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum FailurePolicy {
    /// Log the diagnostic and keep going with whatever state resulted.
    ///
    /// A program that failed to link renders nothing.
    #[default]
    ContinueOnError,

    /// Stop at the first failed compile or link.
    AbortOnError,
}

/// Ordered list of the resources that make up one program.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramManifest {
    pub vertex: PathBuf,

    /// Fragment stage resources in attach order.
    pub fragments: Vec<PathBuf>,
}

impl ProgramManifest {
    pub fn new(vertex: impl Into<PathBuf>, fragments: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self {
            vertex: vertex.into(),
            fragments: fragments.into_iter().map(Into::into).collect(),
        }
    }

    /// Loads every resource, vertex first. Stops at the first unreadable one.
    pub fn load_sources(&self) -> Result<(StageSource, Vec<StageSource>), ShaderError> {
        let vertex = load_source(StageKind::Vertex, &self.vertex)?;
        let fragments = self
            .fragments
            .iter()
            .map(|path| load_source(StageKind::Fragment, path))
            .collect::<Result<Vec<_>, _>>()?;
        Ok((vertex, fragments))
    }
}

/// Drives load → compile → link for one program.
#[derive(Debug, Clone, Default)]
pub struct ProgramAssembler {
    policy: FailurePolicy,
}

impl ProgramAssembler {
    pub fn new(policy: FailurePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Loads, compiles and links the resources named by `manifest`.
    ///
    /// An unreadable resource is always an error. Compile and link failures
    /// are errors only under [`FailurePolicy::AbortOnError`].
    pub fn assemble(&self, manifest: &ProgramManifest) -> Result<ShaderProgram, ShaderError> {
        let (vertex, fragments) = manifest.load_sources()?;
        self.assemble_sources(vertex, fragments)
    }

    /// Compiles and links already-loaded sources.
    pub fn assemble_sources(
        &self,
        vertex: StageSource,
        fragments: Vec<StageSource>,
    ) -> Result<ShaderProgram, ShaderError> {
        let mut sources = Vec::with_capacity(fragments.len() + 1);
        sources.push(vertex);
        sources.extend(fragments);

        let mut stages = compile_stages(&sources);
        let fragments = stages.split_off(1);
        let vertex = stages.remove(0);

        for stage in std::iter::once(&vertex).chain(&fragments) {
            if stage.compiled() {
                continue;
            }
            log::error!("{} shader compile error: {}", stage.name(), stage.diagnostic_log());
            if self.policy == FailurePolicy::AbortOnError {
                return Err(ShaderError::Compile {
                    name: stage.name().to_string(),
                    log: stage.diagnostic_log().to_string(),
                });
            }
        }

        let program = link(vertex, fragments);

        match program.linked_module() {
            Some(module) => {
                log::info!(
                    "linked shader program: {} stage(s), {} uniform(s)",
                    program.stages().len(),
                    module.uniforms().len()
                );
            }
            None => {
                log::error!("shader program link error: {}", program.link_log());
                if self.policy == FailurePolicy::AbortOnError {
                    return Err(ShaderError::Link {
                        log: program.link_log().to_string(),
                    });
                }
            }
        }

        Ok(program)
    }
}
