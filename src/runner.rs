//! Repeated timing of external commands
//!
//! Each run of the command is timed with [`Accumulator::measure`], so a run
//! that fails to spawn is still recorded before the error is returned.
//! Session state can be carried between invocations as a JSON file; the
//! reload is lossy since only derived statistics are stored.

use crate::{Accumulator, CodecError, Nanos};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur while timing a command
#[derive(Error, Debug)]
pub enum RunError {
    #[error("No command given")]
    EmptyCommand,

    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("Failed to read state file {path}: {source}")]
    StateRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid state file {path}: {source}")]
    StateDecode { path: PathBuf, source: CodecError },

    #[error("Failed to write state file {path}: {source}")]
    StateWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to encode statistics: {0}")]
    Encode(#[from] CodecError),
}

/// Outcome of a timing session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Timed runs
    pub runs: u32,
    /// Runs that exited with a non-zero status
    pub failures: u32,
    /// Duration of the last run
    pub last: Nanos,
}

/// An external command to be timed
#[derive(Debug, Clone)]
pub struct CommandRunner {
    program: String,
    args: Vec<String>,
}

impl CommandRunner {
    /// Create a runner from a program followed by its arguments
    pub fn new(command: &[String]) -> Result<Self, RunError> {
        let (program, args) = command.split_first().ok_or(RunError::EmptyCommand)?;
        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }

    /// Program name
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Run the command once to completion, discarding its stdout
    pub fn run_once(&self) -> Result<ExitStatus, RunError> {
        Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .status()
            .map_err(|source| RunError::Spawn {
                program: self.program.clone(),
                source,
            })
    }

    /// Run the command `count` times without timing it
    pub fn warmup(&self, count: u32) -> Result<(), RunError> {
        for i in 0..count {
            let status = self.run_once()?;
            debug!(run = i + 1, %status, "warmup run finished");
        }
        Ok(())
    }

    /// Run the command `iterations` times, folding each duration into `acc`
    pub fn time_into(&self, acc: &mut Accumulator, iterations: u32) -> Result<RunSummary, RunError> {
        let mut summary = RunSummary {
            runs: 0,
            failures: 0,
            last: Nanos::ZERO,
        };

        for i in 0..iterations {
            let (status, elapsed) = acc.measure(|| self.run_once());
            summary.runs += 1;
            summary.last = elapsed;
            let status = status?;

            if status.success() {
                debug!(run = i + 1, elapsed = %elapsed, "run finished");
            } else {
                summary.failures += 1;
                warn!(run = i + 1, elapsed = %elapsed, %status, program = %self.program, "command failed");
            }
        }

        info!(
            program = %self.program,
            runs = summary.runs,
            failures = summary.failures,
            mean = %acc.mean(),
            "timing complete"
        );
        Ok(summary)
    }
}

/// Load session statistics from `path`
///
/// A missing file starts an empty session. Backs the command's `--state`
/// option; the accumulator itself never persists anything.
pub fn load_state(path: &Path) -> Result<Accumulator, RunError> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!(path = %path.display(), "No state file found, starting empty session");
            return Ok(Accumulator::new());
        }
        Err(source) => {
            return Err(RunError::StateRead {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let acc = Accumulator::from_json(&text).map_err(|source| RunError::StateDecode {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), samples = acc.samples(), "Loaded session state");
    Ok(acc)
}

/// Write session statistics to `path`, creating parent directories if needed
pub fn save_state(path: &Path, acc: &Accumulator) -> Result<(), RunError> {
    let json = acc.to_json_pretty()?;
    let write = || -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
    };
    write().map_err(|source| RunError::StateWrite {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), samples = acc.samples(), "Session state saved");
    Ok(())
}
