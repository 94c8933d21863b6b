//! League standings ETL pipeline.
//!
//! Two components run in strict sequence per scheduled run:
//!
//! 1. [`scrape`] — fetches the standings page, locates the table, derives
//!    the column schema from the scraped header, extracts each row with
//!    typed values, and writes a CSV snapshot.
//! 2. [`ingest`] — appends the snapshot's rows into a Postgres table named
//!    from the run's logical date, creating it on first write.
//!
//! The cron/retry scheduler lives outside this crate; it invokes the
//! callables in [`pipeline`] (or the `pipeline` binary's subcommands) and
//! retries a whole failed run. Ingestion is append-only: re-running a
//! logical date duplicates that date's rows.

pub mod config;
pub mod error;
pub mod ingest;
pub mod pipeline;
pub mod scrape;
pub mod snapshot;

pub use config::{Config, DbConfig};
pub use error::{IngestError, PipelineError, ScrapeError, SnapshotError};
pub use scrape::Scraper;
pub use snapshot::{ColumnSchema, Snapshot, StandingsRow, StatValue};
