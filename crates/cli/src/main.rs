//! Corestore CLI - schema migrations and administration of the core store

mod app;
mod config;
mod logging;
mod output;

use anyhow::{bail, Context, Result};
use app::App;
use clap::{Parser, Subcommand};
use colored::Colorize;
use config::StorageConfig;
use corestore_core::application::Snapshot;
use logging::LogFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "corestore")]
#[command(about = "Corestore schema and entity administration", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    storage: StorageConfig,

    /// Log output format
    #[arg(
        long,
        env = "CORESTORE_LOG_FORMAT",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    log_format: LogFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply all pending schema migrations
    Migrate,

    /// Show the recorded and latest schema versions
    Status,

    /// Undo the most recent schema migration
    Revert {
        /// Confirm the revert
        #[arg(long)]
        yes: bool,
    },

    /// Insert the six canonical cores if the store is empty
    Seed,

    /// Delete every entity and re-seed the canonical cores
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },

    /// List all cores
    List,

    /// Show the highest cores by current level
    Top {
        /// Number of cores to show
        #[arg(short = 'n', long, default_value = "3")]
        count: u32,
    },

    /// List cores with the given trend (rising, stable, declining)
    Trend { trend: String },

    /// Set a core's level from a percentage
    SetLevel {
        /// Core name, e.g. "Growth Mindset"
        name: String,

        /// Percentage, 0 to 100
        value: f64,

        /// rising, stable or declining
        trend: String,
    },

    /// Print every entity as JSON
    Export,

    /// Load a JSON export in one atomic unit
    Import { file: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_format)?;

    let app = App::open(&cli.storage).await?;

    match cli.command {
        Commands::Migrate => {
            let version = app
                .engine
                .run_pending()
                .await
                .context("Schema migration failed")?;
            println!(
                "{}",
                format!("✓ Schema is at v{}", version).green().bold()
            );
        }

        Commands::Status => {
            let status = app.engine.status().await?;

            println!("{}", "Schema Status".cyan().bold());
            println!();
            println!("  {} v{}", "Recorded:".bold(), status.current);
            println!("  {} v{}", "Latest:".bold(), status.latest);
            if status.is_current() {
                println!("  {} {}", "State:".bold(), "UP TO DATE".green());
            } else {
                println!("  {} {}", "State:".bold(), "PENDING".yellow());
                println!();
                println!("{}", output::pending_table(&status));
            }
        }

        Commands::Revert { yes } => {
            if !yes {
                bail!("Reverting changes the schema; re-run with --yes to confirm");
            }
            let version = app.engine.revert_latest().await?;
            println!(
                "{}",
                format!("✓ Reverted schema to v{}", version).green().bold()
            );
        }

        Commands::Seed => {
            let repository = app.ready().await?;
            if repository.seed_defaults().await? {
                println!("{}", "✓ Seeded the canonical cores".green().bold());
            } else {
                println!("{}", "○ Cores already present, nothing seeded".yellow());
            }
        }

        Commands::Reset { yes } => {
            if !yes {
                bail!("Reset deletes every entity; re-run with --yes to confirm");
            }
            app.ready().await?.reset_all().await?;
            println!("{}", "✓ Store reset to the canonical cores".green().bold());
        }

        Commands::List => {
            let cores = app.ready().await?.get_all().await?;
            print_cores(&cores);
        }

        Commands::Top { count } => {
            let cores = app.ready().await?.get_top_by_level(count).await?;
            print_cores(&cores);
        }

        Commands::Trend { trend } => {
            let cores = app.ready().await?.get_by_trend(&trend).await?;
            print_cores(&cores);
        }

        Commands::SetLevel { name, value, trend } => {
            let repository = app.ready().await?;
            let core = repository
                .get_by_name(&name)
                .await?
                .with_context(|| format!("No stored core named {}", name))?;
            repository.update_percentage(&core.id, value, &trend).await?;
            println!(
                "{}",
                format!("✓ {} set to {:.0}% ({})", core.name, value, trend.to_lowercase())
                    .green()
                    .bold()
            );
        }

        Commands::Export => {
            let snapshot = app.ready().await?.export_snapshot().await?;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }

        Commands::Import { file } => {
            let raw = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let snapshot: Snapshot =
                serde_json::from_str(&raw).context("Invalid export file")?;
            let imported = app.ready().await?.import_snapshot(snapshot).await?;
            println!(
                "{}",
                format!("✓ Imported {} entities", imported).green().bold()
            );
        }
    }

    Ok(())
}

fn print_cores(cores: &[corestore_core::domain::Core]) {
    if cores.is_empty() {
        println!("{}", "No cores found".yellow());
        return;
    }
    println!("{}", output::core_table(cores));
}
