// Pipeline entry point, invoked by the external scheduler (cron/Airflow).
// Exits non-zero on any stage failure so the scheduler can retry the run.

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use standings_core::config::{Config, DbConfig};
use standings_core::{ingest, pipeline, Scraper};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "pipeline")]
#[command(about = "League standings scrape-and-ingest pipeline")]
struct Cli {
    /// Logical run date (YYYY-MM-DD); templates the snapshot filename and
    /// the destination table name. Defaults to today.
    #[arg(long)]
    date: Option<NaiveDate>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape the standings page into the dated snapshot file
    Scrape,

    /// Append the dated snapshot file into the dated table
    Ingest,

    /// Scrape then ingest, strictly in sequence
    Run,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,standings_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;

    let date = cli.date.unwrap_or_else(|| Local::now().date_naive());
    let snapshot_path = config.output_dir.join(pipeline::snapshot_file_name(date));
    let table = pipeline::table_name(date);
    tracing::info!(%date, url = %config.source_url, "starting pipeline");

    match cli.command {
        Commands::Scrape => {
            let scraper = Scraper::new()?;
            let rows = pipeline::run_scrape(&scraper, &config.source_url, &snapshot_path).await?;
            tracing::info!(rows, path = %snapshot_path.display(), "scrape complete");
        }
        Commands::Ingest => {
            // Credentials are only required once we actually talk to the db
            let db = DbConfig::from_env().context("Failed to load database credentials")?;
            let pool = ingest::connect(&db).await?;
            let rows = pipeline::run_ingest(&pool, &snapshot_path, &table).await?;
            tracing::info!(rows, table = %table, "ingest complete");
        }
        Commands::Run => {
            let db = DbConfig::from_env().context("Failed to load database credentials")?;
            let summary = pipeline::run(&config, &db, date).await?;
            tracing::info!(
                rows_scraped = summary.rows_scraped,
                rows_loaded = summary.rows_loaded,
                table = %summary.table,
                "run complete"
            );
        }
    }

    Ok(())
}
