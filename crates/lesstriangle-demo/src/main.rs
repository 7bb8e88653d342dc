mod app;
mod cli;
mod config;
mod exit;

use std::process::ExitCode;

use clap::Parser;

use lesstriangle_engine::device::GpuInit;
use lesstriangle_engine::logging::{init_logging, LoggingConfig};
use lesstriangle_engine::shader::{ProgramAssembler, ShaderProgram};
use lesstriangle_engine::window::Runtime;

use crate::app::ShaderDemo;
use crate::cli::Cli;
use crate::config::DemoConfig;
use crate::exit::Fatal;

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(LoggingConfig {
        env_filter: cli.log.clone(),
        ..LoggingConfig::default()
    });

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(fatal) => fatal.report(),
    }
}

fn run(cli: &Cli) -> Result<(), Fatal> {
    let (config, program) = prepare(cli)?;
    let demo = ShaderDemo::new(&program, &config);

    Runtime::run(config.runtime_config(), GpuInit::default(), demo)?;
    Ok(())
}

/// Resolves the configuration and assembles the program. No window is opened here.
fn prepare(cli: &Cli) -> Result<(DemoConfig, ShaderProgram), Fatal> {
    let config = DemoConfig::from_cli(cli).map_err(|e| Fatal::config(&e))?;

    println!("render mode: {}", config.render_mode);
    println!("lighting: {}", config.lighting);

    let program = ProgramAssembler::new(config.policy).assemble(&config.program)?;
    Ok((config, program))
}
