//! Typed errors for the standings pipeline.
//!
//! Uses `thiserror` for library errors (not `anyhow`); each stage returns a
//! `Result` and failures propagate to the run boundary, where the external
//! scheduler decides retry vs. abort.

use thiserror::Error;

/// Errors raised while scraping the standings page.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// HTTP client could not be constructed
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),

    /// HTTP request could not complete (timeout, DNS, connection refused)
    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Markup did not contain the expected table structure
    #[error("parse error: {0}")]
    Parse(String),

    /// A body row's cell/token layout did not match the expected roles
    #[error("row {index}: {reason}")]
    RowShape { index: usize, reason: String },
}

/// Errors raised while writing or reading a snapshot file.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Delimited read/write failed
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// File could not be created or read
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot file had no header row or the wrong column count
    #[error("malformed snapshot: {0}")]
    Malformed(String),
}

/// Errors raised while appending a snapshot into the database.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Database unreachable, auth rejected, or unknown database
    #[error("database connection failed: {0}")]
    Connection(#[source] sqlx::Error),

    /// Table creation or row append failed
    #[error("write to {table} failed: {source}")]
    Write {
        table: String,
        #[source]
        source: sqlx::Error,
    },

    /// Snapshot file could not be read back
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

/// Umbrella error for a full pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Scrape(#[from] ScrapeError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error(transparent)]
    Ingest(#[from] IngestError),
}

/// Result type alias for scrape operations.
pub type ScrapeResult<T> = std::result::Result<T, ScrapeError>;

/// Result type alias for snapshot io.
pub type SnapshotResult<T> = std::result::Result<T, SnapshotError>;

/// Result type alias for ingest operations.
pub type IngestResult<T> = std::result::Result<T, IngestError>;
