//! Run orchestration: logical-date name templating and the two callables
//! the external scheduler drives, strictly in sequence.
//!
//! The logical date is the scheduled run's reference date, not the
//! wall-clock execution time; it templates both the snapshot filename and
//! the destination table name, so two runs for the same date write the
//! same file and append to the same table.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use sqlx::PgPool;
use tracing::info;

use crate::config::{Config, DbConfig};
use crate::error::PipelineError;
use crate::ingest;
use crate::scrape::Scraper;

/// Snapshot filename for a logical date, e.g. `output_20240210.csv`.
pub fn snapshot_file_name(date: NaiveDate) -> String {
    format!("output_{}.csv", date.format("%Y%m%d"))
}

/// Destination table for a logical date, e.g. `league_table_20240210`.
pub fn table_name(date: NaiveDate) -> String {
    format!("league_table_{}", date.format("%Y%m%d"))
}

/// Outcome of one completed run.
#[derive(Debug)]
pub struct RunSummary {
    pub rows_scraped: usize,
    pub rows_loaded: u64,
    pub snapshot_path: PathBuf,
    pub table: String,
}

/// Scrape task: fetch the page, extract the standings, write the snapshot
/// file. First of the two scheduler-driven callables.
pub async fn run_scrape(
    scraper: &Scraper,
    url: &str,
    path: &Path,
) -> Result<usize, PipelineError> {
    let snapshot = scraper.scrape(url).await?;
    snapshot.write(path)?;
    info!(path = %path.display(), rows = snapshot.row_count(), "snapshot written");
    Ok(snapshot.row_count())
}

/// Ingest task: append the snapshot file into the dated table. Second of
/// the two scheduler-driven callables.
pub async fn run_ingest(
    pool: &PgPool,
    path: &Path,
    table: &str,
) -> Result<u64, PipelineError> {
    Ok(ingest::load(pool, path, table).await?)
}

/// Full run for one logical date: scrape strictly before ingest. Any stage
/// failure aborts the run and propagates, leaving retry to the scheduler.
pub async fn run(
    config: &Config,
    db: &DbConfig,
    date: NaiveDate,
) -> Result<RunSummary, PipelineError> {
    let snapshot_path = config.output_dir.join(snapshot_file_name(date));
    let table = table_name(date);

    let scraper = Scraper::new()?;
    let rows_scraped = run_scrape(&scraper, &config.source_url, &snapshot_path).await?;

    let pool = ingest::connect(db).await?;
    let rows_loaded = run_ingest(&pool, &snapshot_path, &table).await?;

    Ok(RunSummary {
        rows_scraped,
        rows_loaded,
        snapshot_path,
        table,
    })
}
