//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use postscale_config::OutputMode;
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "postscale", version, about = "Read weights from a USB postal scale")]
pub struct Cli {
    /// Path to config TOML; built-in defaults are used when omitted
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Emit results, errors and logs as JSON lines
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); overrides [logging].level
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

/// Output stage selectable on the command line.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum ModeArg {
    /// Packet bytes as received
    Raw,
    /// Decoded report fields
    Parsed,
    /// Weight in grams
    Grams,
}

impl From<ModeArg> for OutputMode {
    fn from(m: ModeArg) -> Self {
        match m {
            ModeArg::Raw => OutputMode::Raw,
            ModeArg::Parsed => OutputMode::Parsed,
            ModeArg::Grams => OutputMode::Grams,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Poll the scale and print one line per reading
    Read {
        /// What to print for each reading (takes precedence over config)
        #[arg(long, value_enum, value_name = "MODE")]
        mode: Option<ModeArg>,
        /// Milliseconds between the starts of consecutive reads
        #[arg(long, value_name = "MS")]
        interval_ms: Option<u64>,
        /// Stop after this many reads instead of polling until Ctrl-C
        #[arg(long, value_name = "N")]
        count: Option<u64>,
    },
    /// Open the scale, report its endpoint and release it again
    SelfCheck,
}
