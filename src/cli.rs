//! Command line interface of the `timeit` binary

use crate::config::{ConfigError, TimeitConfig};
use crate::ExportFlags;
use clap::Parser;
use std::path::PathBuf;

/// Time a command repeatedly and print running statistics as JSON
#[derive(Parser, Debug)]
#[command(name = "timeit", version, about)]
pub struct Cli {
    /// Number of timed runs (default: from config)
    #[arg(short = 'n', long)]
    pub iterations: Option<u32>,

    /// Untimed runs before measuring (default: from config)
    #[arg(short, long)]
    pub warmup: Option<u32>,

    /// Derived statistics to print: variance, sample_variance, std_dev, sample_std_dev
    #[arg(short, long, value_delimiter = ',')]
    pub fields: Vec<String>,

    /// JSON file accumulating statistics across invocations
    ///
    /// A convenience of this command, built on the JSON export: the file
    /// holds derived statistics only, so each reload is lossy.
    #[arg(short, long)]
    pub state: Option<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Config file (default: <config_dir>/timeit/config.json)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Command to time, followed by its arguments
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

/// Effective settings after merging the command line over the config
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub iterations: u32,
    pub warmup: u32,
    pub flags: ExportFlags,
    pub pretty: bool,
}

impl Cli {
    /// Merge command line options over `config`
    pub fn resolve(&self, config: &TimeitConfig) -> Result<Settings, ConfigError> {
        let flags = if self.fields.is_empty() {
            config.export_flags()?
        } else {
            ExportFlags::from_names(&self.fields)?
        };

        Ok(Settings {
            iterations: self.iterations.unwrap_or(config.iterations),
            warmup: self.warmup.unwrap_or(config.warmup),
            flags,
            pretty: self.pretty || config.pretty,
        })
    }
}
