//! Projection Admin CLI
//!
//! Operator interface over the projection service:
//! - add / remove / list: manage a user's projections
//! - players / metrics: what can be projected for a sport and date
//! - evaluate: run one resolution batch now

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use uuid::Uuid;

use projection_model::{MetricCatalog, NewProjection, Projection, Sport};
use resolution_engine::{initialize_logging, load_config, Outcome, ProjectionService};

#[derive(Parser)]
#[command(name = "projection-admin")]
#[command(about = "Admin CLI for player stat projections")]
#[command(version = "0.1.0")]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a projection
    Add {
        #[arg(long)]
        sport: Sport,

        #[arg(long)]
        player: String,

        /// Metric name, e.g. "hits" or "PRA"
        #[arg(long)]
        metric: String,

        #[arg(long)]
        target: f64,

        /// Game date (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,

        #[arg(long)]
        user: Option<String>,
    },

    /// Remove a projection by id
    Remove {
        #[arg(long)]
        id: Uuid,

        #[arg(long)]
        user: Option<String>,
    },

    /// List projections, newest date first
    List {
        #[arg(long)]
        user: Option<String>,
    },

    /// Players who appeared in a live or final game on a date
    Players {
        #[arg(long)]
        sport: Sport,

        #[arg(long)]
        date: NaiveDate,
    },

    /// Metrics that can be projected for a sport
    Metrics {
        #[arg(long)]
        sport: Sport,
    },

    /// Resolve pending projections now
    Evaluate {
        #[arg(long)]
        user: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref()).context("Failed to load configuration")?;
    initialize_logging(&config.logging)?;
    let default_user = config.evaluation.default_user.clone();

    // Needs no provider or store
    if let Commands::Metrics { sport } = &cli.command {
        print_metrics(*sport);
        return Ok(());
    }

    let service = ProjectionService::from_config(&config)
        .await
        .context("Failed to initialize projection service")?;

    match cli.command {
        Commands::Add { sport, player, metric, target, date, user } => {
            let user_id = user.unwrap_or(default_user);
            let new = NewProjection { user_id, sport, player, metric, target, date };
            match service.add(new).await {
                Ok(projection) => {
                    println!("{} {}", "✅ Added projection".green().bold(), projection.id);
                    print_projections(&[projection]);
                }
                Err(e) => println!("{}", format!("❌ {e}").red()),
            }
        }
        Commands::Remove { id, user } => {
            let user_id = user.unwrap_or(default_user);
            if service.remove(&user_id, id).await? {
                println!("{}", format!("🗑  Removed projection {id}").green());
            } else {
                println!("{}", format!("❌ No projection {id} for {user_id}").red());
            }
        }
        Commands::List { user } => {
            let user_id = user.unwrap_or(default_user);
            let projections = service.list(&user_id).await?;
            if projections.is_empty() {
                println!("{}", format!("No projections for {user_id}").yellow());
            } else {
                print_projections(&projections);
            }
        }
        Commands::Players { sport, date } => {
            let players = service.eligible_players(sport, date).await;
            if players.is_empty() {
                println!("{}", format!("No {sport} players found for {date}").yellow());
            } else {
                println!("{}", format!("{} {sport} players on {date}", players.len()).cyan().bold());
                for player in players {
                    println!("  {player}");
                }
            }
        }
        Commands::Evaluate { user } => {
            let user_id = user.unwrap_or(default_user);
            let report = service.evaluate_pending(&user_id).await?;

            println!("{}", format!("📊 Evaluated {} projections", report.evaluated()).cyan().bold());
            for (id, outcome) in &report.outcomes {
                println!("  {id}  {}", outcome_label(outcome));
            }
            println!(
                "  resolved: {}  unresolved: {}  games skipped: {}",
                report.resolved_count().to_string().green(),
                report.unresolved_count().to_string().yellow(),
                report.games_skipped().to_string().red()
            );
        }
        Commands::Metrics { .. } => {}
    }

    Ok(())
}

fn print_metrics(sport: Sport) {
    println!("{}", format!("{sport} metrics").cyan().bold());
    for name in MetricCatalog::new().names(sport) {
        println!("  {name}");
    }
}

fn print_projections(projections: &[Projection]) {
    println!(
        "{:<36}  {:<4}  {:<22}  {:<13}  {:>7}  {:>7}  {:<10}  {}",
        "ID", "SPRT", "PLAYER", "METRIC", "TARGET", "ACTUAL", "DATE", "STATUS"
    );
    for projection in projections {
        let actual = projection.actual.map(|actual| actual.to_string()).unwrap_or_else(|| "-".to_string());
        println!(
            "{:<36}  {:<4}  {:<22}  {:<13}  {:>7}  {:>7}  {:<10}  {}",
            projection.id.to_string(),
            projection.sport.code(),
            projection.player,
            projection.metric,
            projection.target,
            actual,
            projection.date.to_string(),
            colorize_status(projection)
        );
    }
}

fn status_label(projection: &Projection) -> &'static str {
    match projection.met {
        Some(true) => "MET",
        Some(false) => "MISSED",
        None => "PENDING",
    }
}

fn colorize_status(projection: &Projection) -> ColoredString {
    let label = status_label(projection);
    match projection.met {
        Some(true) => label.green().bold(),
        Some(false) => label.red().bold(),
        None => label.yellow(),
    }
}

fn outcome_label(outcome: &Outcome) -> ColoredString {
    match outcome {
        Outcome::Resolved { resolution, game_id } => {
            let verdict = if resolution.met { "met" } else { "missed" };
            format!("resolved: {} ({verdict}, game {game_id})", resolution.actual).green()
        }
        Outcome::AlreadyResolved => "already resolved".normal(),
        Outcome::UnknownMetric => "unknown metric".red(),
        Outcome::NoProvider => "no provider".red(),
        Outcome::ProviderUnavailable => "provider unavailable".red(),
        Outcome::NotFound => "player not found".yellow(),
    }
}
