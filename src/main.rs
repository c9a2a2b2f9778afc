//! pregate — presubmit gating CLI.
//!
//! Entry point and error handling boundary. Uses `anyhow` for
//! ergonomic error propagation and user-facing messages.

mod cli;

use pregate::aggregator;
use pregate::checks;
use pregate::config;
use pregate::constants;
use pregate::env;
use pregate::host;
use pregate::models;
use pregate::status;

use std::path::Path;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;

use cli::args::{CheckArgs, Cli, Command};
use config::Config;
use env::Env;
use host::ChangeSpec;
use models::GateDecision;
use status::{HttpFetcher, StatusFetcher};

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Check(args) => run_check(*args).await,
        Command::Version => run_version(),
    }
}

/// Print detailed version and build information.
fn run_version() -> Result<()> {
    use colored::Colorize;

    println!(
        "{} {}",
        constants::APP_NAME.bold(),
        constants::VERSION.green().bold()
    );
    println!("{}     {}", "target:".dimmed(), constants::TARGET);
    Ok(())
}

/// Evaluate the configured checks against the local change.
async fn run_check(args: CheckArgs) -> Result<()> {
    // Resolve repo root from --path (default: cwd)
    let base_dir = std::fs::canonicalize(&args.path)
        .with_context(|| format!("--path directory not found: {}", args.path.display()))?;
    let repo_root = host::git::find_repo_root(&base_dir)
        .await
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    let repo_root = Path::new(&repo_root);

    // Load config with layering
    let config =
        Config::load(Some(repo_root), &Env::real()).context("failed to load configuration")?;

    let description = resolve_description(&args, repo_root).await?;

    let spec = ChangeSpec {
        description,
        base_ref: args.base.clone(),
        issue: args.issue,
        patchset: args.patchset,
        committing: args.commit,
        tbr: args.tbr,
        owner: args.owner.clone(),
        host_url: args.host.clone(),
    };
    let ctx = host::build_change_context(repo_root, spec)
        .await
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    // Assemble and run the check list
    let fetcher: Arc<dyn StatusFetcher> = Arc::new(
        HttpFetcher::new(Duration::from_secs(config.http.timeout_secs))
            .context("failed to set up the HTTP client")?,
    );
    let check_list = checks::registry::assemble(&config, args.commit, fetcher)
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    let report = aggregator::run_checks(check_list, Arc::new(ctx)).await;

    // Render and print output
    let rendered = args.format.render(&report);
    print!("{rendered}");

    if report.decision == GateDecision::Block {
        bail!("gate blocked the change");
    }

    Ok(())
}

/// Resolve the change description: explicit flags win, otherwise the
/// HEAD commit message stands in.
async fn resolve_description(args: &CheckArgs, repo_root: &Path) -> Result<String> {
    if let Some(ref message) = args.message {
        return Ok(message.clone());
    }
    if let Some(ref path) = args.message_file {
        if path.as_os_str() == "-" {
            let mut buf = String::new();
            tokio::io::AsyncReadExt::read_to_string(&mut tokio::io::stdin(), &mut buf)
                .await
                .context("failed to read description from stdin")?;
            return Ok(buf);
        }
        return tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()));
    }
    host::git::head_commit_message(repo_root)
        .await
        .map_err(|e| anyhow::anyhow!("{e}"))
}
