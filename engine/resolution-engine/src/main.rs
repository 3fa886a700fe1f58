//! Projection evaluation worker
//!
//! Runs one resolution batch for a user and exits. Meant to be driven by an
//! external timer (cron, systemd timer).

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use resolution_engine::{initialize_logging, load_config, ProjectionService};

#[derive(Parser)]
#[command(name = "evaluate-projections")]
#[command(about = "Resolve pending projections against upstream box scores")]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// User whose pending projections are evaluated (default from config)
    #[arg(long)]
    user: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref()).context("Failed to load configuration")?;
    initialize_logging(&config.logging)?;

    info!("Starting evaluate-projections v{}", env!("CARGO_PKG_VERSION"));

    let user = cli.user.unwrap_or_else(|| config.evaluation.default_user.clone());
    let service = ProjectionService::from_config(&config)
        .await
        .context("Failed to initialize projection service")?;

    let report = service
        .evaluate_pending(&user)
        .await
        .with_context(|| format!("Failed to evaluate projections for {user}"))?;

    let metrics = service.metrics().snapshot();
    info!(
        user = %user,
        evaluated = report.evaluated(),
        resolved = report.resolved_count(),
        unresolved = report.unresolved_count(),
        games_skipped = report.games_skipped(),
        sink_failures = metrics.sink_failures,
        "Evaluation run complete"
    );

    Ok(())
}
