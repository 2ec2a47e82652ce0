//! CLI argument parsing using clap derive API
//!
//! This module defines the process-level flags using clap's derive macros.
//! It performs no I/O; [`Cli::apply_overrides`] only edits an already loaded
//! configuration. The console command
//! grammar itself (`scan <url>`, `set <option> <value>`, ...) lives in
//! [`crate::console`].

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use adminscan_core::config::AdminscanConfig;

/// AdminScan -- interactive admin panel finder console.
///
/// Without `--exec` an interactive prompt is started. Type `help` at the
/// prompt for the list of console commands.
#[derive(Parser, Debug)]
#[command(name = "adminscan", version, about, long_about = None)]
pub struct Cli {
    /// Path to the adminscan.toml configuration file (defaults apply if missing).
    #[arg(short, long, default_value = "adminscan.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Override the scan backend endpoint.
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Output format.
    #[arg(long, default_value = "text")]
    pub output: OutputFormat,

    /// Skip the startup banner.
    #[arg(long)]
    pub no_intro: bool,

    /// Run console command lines non-interactively, in order, then exit.
    ///
    /// Each scan is awaited before the next line runs.
    #[arg(short = 'e', long = "exec", value_name = "LINE")]
    pub exec: Vec<String>,
}

impl Cli {
    /// Apply flag values on top of file and environment settings.
    ///
    /// Call before [`AdminscanConfig::validate`] so a flag can replace an
    /// invalid value from a lower layer.
    pub fn apply_overrides(&self, config: &mut AdminscanConfig) {
        if let Some(level) = &self.log_level {
            config.general.log_level = level.clone();
        }
        if let Some(endpoint) = &self.endpoint {
            config.backend.endpoint = endpoint.clone();
        }
        if self.no_intro {
            config.console.show_intro = false;
        }
    }
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Colored terminal output with a live progress bar.
    Text,
    /// One JSON object per rendered line.
    Json,
}
