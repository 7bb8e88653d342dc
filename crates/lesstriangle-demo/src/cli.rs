use std::path::PathBuf;

use clap::Parser;

/// Full-screen raymarch demo driven by a chain of WGSL fragment stages.
#[derive(Debug, Clone, Parser)]
#[command(name = "lesstriangle", version, about)]
pub struct Cli {
    /// Redraw continuously and animate `u_time` (default: draw on demand).
    #[arg(short, long)]
    pub dynamic: bool,

    /// Night lighting (the default).
    #[arg(short, long, conflicts_with = "day")]
    pub night: bool,

    /// Day lighting.
    #[arg(long)]
    pub day: bool,

    /// Exit on the first shader compile or link failure.
    #[arg(long)]
    pub strict: bool,

    /// TOML shader manifest; paths inside are relative to its directory.
    #[arg(short, long, value_name = "PATH")]
    pub manifest: Option<PathBuf>,

    /// Window width in logical pixels.
    #[arg(long, default_value_t = 1024, value_parser = clap::value_parser!(u32).range(1..))]
    pub width: u32,

    /// Window height in logical pixels.
    #[arg(long, default_value_t = 768, value_parser = clap::value_parser!(u32).range(1..))]
    pub height: u32,

    /// Divides the framebuffer size reported through the `resolution` uniform.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub divisor: u32,

    /// Log filter in `env_logger` syntax; overrides `RUST_LOG`.
    #[arg(long, value_name = "FILTER")]
    pub log: Option<String>,
}
