//! Clap argument types and description resolution.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use pregate::aggregator::GateReport;
use pregate::constants;

/// Presubmit gate runner.
#[derive(Parser, Debug)]
#[command(name = constants::APP_NAME, version = constants::VERSION)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Evaluate the configured checks against the local change.
    Check(Box<CheckArgs>),

    /// Print version and build information.
    Version,
}

/// Arguments for the `check` subcommand.
#[derive(Parser, Debug)]
pub struct CheckArgs {
    // --- Repo location ---
    /// Path to the repository or working directory (default: current directory).
    #[arg(long, default_value = ".")]
    pub path: PathBuf,

    /// Branch or commit the change is diffed against.
    #[arg(long, default_value = "HEAD")]
    pub base: String,

    // --- Mode ---
    /// Run in commit mode: findings gate the change instead of only
    /// being advisory.
    #[arg(long, default_value_t = false)]
    pub commit: bool,

    /// To-be-reviewed: relax the owners sign-off requirement.
    #[arg(long, default_value_t = false)]
    pub tbr: bool,

    // --- Change description ---
    /// Change description text (default: the HEAD commit message).
    #[arg(long, conflicts_with = "message_file")]
    pub message: Option<String>,

    /// Read the change description from a file.
    #[arg(long)]
    pub message_file: Option<PathBuf>,

    // --- Review metadata ---
    /// Review issue number on the code-review host.
    #[arg(long)]
    pub issue: Option<u64>,

    /// Patchset number within the issue.
    #[arg(long)]
    pub patchset: Option<u64>,

    /// Identity of the change owner (for self-approval exclusion).
    #[arg(long)]
    pub owner: Option<String>,

    /// Code-review host base URL.
    #[arg(long, env = constants::ENV_REVIEW_HOST, default_value = "")]
    pub host: String,

    // --- Output ---
    /// Output format.
    #[arg(long, default_value = "terminal")]
    pub format: OutputFormat,
}

/// Output format options.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    Terminal,
    Json,
}

impl OutputFormat {
    /// Render the report using the renderer for this format.
    pub fn render(&self, report: &GateReport) -> String {
        use pregate::output::OutputRenderer;
        match self {
            OutputFormat::Terminal => pregate::output::terminal::TerminalRenderer.render(report),
            OutputFormat::Json => pregate::output::json::JsonRenderer.render(report),
        }
    }
}
