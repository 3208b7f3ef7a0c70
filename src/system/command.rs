use std::process::{Command, Output, Stdio};

use color_eyre::Result;
use color_eyre::eyre::{WrapErr, eyre};

/// Runs an external program with no arguments and returns its stdout.
pub trait CommandRunner {
    fn run(&self, program: &str) -> Result<String>;
}

/// Spawns real processes. Blocks until the child exits; there is no timeout.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemCommand;

impl CommandRunner for SystemCommand {
    fn run(&self, program: &str) -> Result<String> {
        let output = Command::new(program)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .wrap_err_with(|| format!("failed to spawn `{program}`"))?;
        stdout_text(program, output)
    }
}

fn stdout_text(program: &str, output: Output) -> Result<String> {
    if !output.status.success() {
        return Err(eyre!("`{program}` exited with {}", output.status));
    }

    String::from_utf8(output.stdout)
        .wrap_err_with(|| format!("`{program}` printed non-UTF-8 output"))
}
