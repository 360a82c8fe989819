//! Runs external commands through the system shell.
//!
//! Every scan, probe and install step in this crate is a shell command line.
//! They all go through a [`CommandRunner`] so the orchestration code can be
//! exercised without the real tools installed.
use anyhow::{anyhow, Result};
use log::debug;
use std::process::Command;

/// Executes a shell command line and returns its trimmed standard output.
///
/// A nonzero exit status is an error carrying the command and whatever the
/// command wrote to standard error.
pub trait CommandRunner: Send + Sync {
    fn run(&self, command: &str) -> Result<String>;
}

/// Runs commands with `sh -c` (or `cmd.exe /c` on Windows).
#[derive(Debug, Default, Clone, Copy)]
pub struct ShellRunner;

impl CommandRunner for ShellRunner {
    fn run(&self, command: &str) -> Result<String> {
        execute_command(command)
    }
}

/// Synchronously runs `command`, capturing stdout and stderr.
///
/// There is no timeout: a command that never exits blocks the caller forever.
pub fn execute_command(command: &str) -> Result<String> {
    debug!("Running command {command}");
    let (shell, arg) = if cfg!(unix) {
        ("sh", "-c")
    } else {
        ("cmd.exe", "/c")
    };

    let output = match Command::new(shell).args([arg, command]).output() {
        Ok(output) => output,
        Err(error) => {
            debug!("Command error {}", error);
            return Err(anyhow!("Error running command '{command}': {error}"));
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        match output.status.code() {
            Some(code) => debug!("Command exited with code {code}"),
            None => debug!("Command terminated by signal"),
        }
        return Err(anyhow!(
            "Error running command '{command}': {}",
            stderr.trim()
        ));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_owned())
}
