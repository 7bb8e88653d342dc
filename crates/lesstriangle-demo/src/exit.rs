use std::error::Error as StdError;
use std::process::ExitCode;

use lesstriangle_engine::shader::ShaderError;
use lesstriangle_engine::window::RuntimeError;

/// Resource or configuration failure, reported before any window exists.
pub const EXIT_CONFIG: u8 = 1;
/// Event loop, window, GPU, or surface failure (`-1` as a process status).
pub const EXIT_RUNTIME: u8 = 255;

/// A failure that ends the process, with the status it exits with.
#[derive(Debug)]
pub struct Fatal {
    code: u8,
    message: String,
}

impl Fatal {
    pub fn config(err: &anyhow::Error) -> Self {
        Self {
            code: EXIT_CONFIG,
            message: format!("{err:#}"),
        }
    }

    pub fn code(&self) -> u8 {
        self.code
    }

    /// The error followed by every cause, `: `-separated.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Prints the diagnostic to stderr and returns the process status.
    ///
    /// Written directly, so a log filter of `off` cannot hide it.
    pub fn report(&self) -> ExitCode {
        eprintln!("error: {}", self.message);
        ExitCode::from(self.code)
    }
}

impl From<ShaderError> for Fatal {
    fn from(err: ShaderError) -> Self {
        Self {
            code: EXIT_CONFIG,
            message: chain(&err),
        }
    }
}

impl From<RuntimeError> for Fatal {
    fn from(err: RuntimeError) -> Self {
        Self {
            code: EXIT_RUNTIME,
            message: chain(&err),
        }
    }
}

fn chain(err: &(dyn StdError + 'static)) -> String {
    anyhow::Chain::new(err)
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(": ")
}
