use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{ensure, Context, Result};
use serde::Deserialize;
use winit::dpi::LogicalSize;

use lesstriangle_engine::shader::{FailurePolicy, ProgramManifest};
use lesstriangle_engine::window::{RedrawMode, RuntimeConfig};

use crate::cli::Cli;

/// Directory holding the built-in stage list when no manifest is given.
pub const DEFAULT_SHADER_DIR: &str = "shaders";

pub const WINDOW_TITLE: &str = "LessTriangle";

/// Ordered stage list of the program, as written in a TOML manifest.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    pub vertex: PathBuf,

    /// Fragment stages in attach order.
    pub fragments: Vec<PathBuf>,
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            vertex: PathBuf::from("main_vert.wgsl"),
            fragments: ["main_frag.wgsl", "sphere.wgsl", "cube.wgsl", "lighting_model.wgsl"]
                .into_iter()
                .map(PathBuf::from)
                .collect(),
        }
    }
}

impl Manifest {
    pub fn parse(text: &str) -> Result<Self> {
        let manifest: Manifest = toml::from_str(text).context("invalid shader manifest")?;
        ensure!(!manifest.fragments.is_empty(), "shader manifest lists no fragment stages");
        Ok(manifest)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read shader manifest '{}'", path.display()))?;
        Self::parse(&text).with_context(|| format!("in '{}'", path.display()))
    }

    /// Resolves every stage path against `base`.
    pub fn resolve(&self, base: &Path) -> ProgramManifest {
        ProgramManifest::new(base.join(&self.vertex), self.fragments.iter().map(|f| base.join(f)))
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum RenderMode {
    /// Continuous redraw; `u_time` advances.
    Dynamic,
    /// Redraw on demand; `u_time` stays 0.
    Static,
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RenderMode::Dynamic => "dynamic",
            RenderMode::Static => "static",
        })
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Lighting {
    Day,
    Night,
}

impl Lighting {
    pub fn is_night(self) -> bool {
        self == Lighting::Night
    }
}

impl fmt::Display for Lighting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Lighting::Day => "day",
            Lighting::Night => "night",
        })
    }
}

/// Startup configuration, resolved once from the command line.
#[derive(Debug, Clone)]
pub struct DemoConfig {
    pub render_mode: RenderMode,
    pub lighting: Lighting,
    pub policy: FailurePolicy,
    pub program: ProgramManifest,
    pub window_size: (u32, u32),
    pub divisor: u32,
}

impl DemoConfig {
    /// Reads the manifest named by `cli`, or uses the built-in stage list
    /// under [`DEFAULT_SHADER_DIR`].
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let program = match &cli.manifest {
            Some(path) => {
                let base = path.parent().unwrap_or_else(|| Path::new(""));
                Manifest::load(path)?.resolve(base)
            }
            None => Manifest::default().resolve(Path::new(DEFAULT_SHADER_DIR)),
        };

        Ok(Self {
            render_mode: if cli.dynamic { RenderMode::Dynamic } else { RenderMode::Static },
            lighting: if cli.day { Lighting::Day } else { Lighting::Night },
            policy: if cli.strict { FailurePolicy::AbortOnError } else { FailurePolicy::ContinueOnError },
            program,
            window_size: (cli.width, cli.height),
            divisor: cli.divisor,
        })
    }

    pub fn runtime_config(&self) -> RuntimeConfig {
        let (w, h) = self.window_size;
        RuntimeConfig {
            title: WINDOW_TITLE.to_string(),
            initial_size: LogicalSize::new(f64::from(w), f64::from(h)),
            redraw: match self.render_mode {
                RenderMode::Dynamic => RedrawMode::Continuous,
                RenderMode::Static => RedrawMode::OnDemand,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use lesstriangle_engine::shader::ProgramAssembler;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("lesstriangle").chain(args.iter().copied())).unwrap()
    }

    // ── manifest ──────────────────────────────────────────────────────────

    #[test]
    fn manifest_keeps_fragment_order() {
        let m = Manifest::parse("vertex = \"v.wgsl\"\nfragments = [\"b.wgsl\", \"a.wgsl\"]\n").unwrap();
        assert_eq!(m.vertex, PathBuf::from("v.wgsl"));
        assert_eq!(m.fragments, [PathBuf::from("b.wgsl"), PathBuf::from("a.wgsl")]);
    }

    #[test]
    fn manifest_requires_fragments() {
        let err = Manifest::parse("vertex = \"v.wgsl\"\nfragments = []\n").unwrap_err();
        assert!(err.to_string().contains("no fragment"));
    }

    #[test]
    fn manifest_rejects_unknown_keys() {
        assert!(Manifest::parse("vertex = \"v.wgsl\"\nfragments = [\"f.wgsl\"]\ncompute = \"c.wgsl\"\n").is_err());
    }

    #[test]
    fn paths_resolve_against_manifest_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.toml");
        fs::write(&path, "vertex = \"v.wgsl\"\nfragments = [\"f.wgsl\"]\n").unwrap();

        let config = DemoConfig::from_cli(&cli(&["-m", path.to_str().unwrap()])).unwrap();
        assert_eq!(config.program.vertex, dir.path().join("v.wgsl"));
        assert_eq!(config.program.fragments, [dir.path().join("f.wgsl")]);
    }

    #[test]
    fn missing_manifest_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        assert!(DemoConfig::from_cli(&cli(&["-m", path.to_str().unwrap()])).is_err());
    }

    // ── cli resolution ────────────────────────────────────────────────────

    #[test]
    fn no_arguments_is_static_night() {
        let config = DemoConfig::from_cli(&cli(&[])).unwrap();
        assert_eq!(config.render_mode, RenderMode::Static);
        assert_eq!(config.lighting, Lighting::Night);
        assert_eq!(config.policy, FailurePolicy::ContinueOnError);
        assert_eq!(config.program.vertex, Path::new(DEFAULT_SHADER_DIR).join("main_vert.wgsl"));
        assert_eq!(config.program.fragments.len(), 4);
        assert_eq!(config.runtime_config().redraw, RedrawMode::OnDemand);
        assert_eq!(config.runtime_config().title, "LessTriangle");
    }

    #[test]
    fn flags_select_modes() {
        let config = DemoConfig::from_cli(&cli(&["-d", "--day", "--strict"])).unwrap();
        assert_eq!(config.render_mode, RenderMode::Dynamic);
        assert_eq!(config.lighting, Lighting::Day);
        assert_eq!(config.policy, FailurePolicy::AbortOnError);
        assert_eq!(config.runtime_config().redraw, RedrawMode::Continuous);
    }

    #[test]
    fn mode_lines_render_lowercase() {
        assert_eq!(RenderMode::Dynamic.to_string(), "dynamic");
        assert_eq!(Lighting::Night.to_string(), "night");
    }

    // ── shipped resources ─────────────────────────────────────────────────

    #[test]
    fn shipped_scene_links() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join(DEFAULT_SHADER_DIR);
        let manifest = Manifest::load(&dir.join("scene.toml")).unwrap();
        assert_eq!(manifest, Manifest::default());

        let program = ProgramAssembler::new(FailurePolicy::AbortOnError)
            .assemble(&manifest.resolve(&dir))
            .unwrap();
        let module = program.linked_module().unwrap();
        for name in ["resolution", "u_time", "day_time"] {
            assert!(module.uniform(name).is_some(), "missing uniform {name}");
        }
    }
}
