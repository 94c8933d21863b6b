//! In-memory snapshot model and its delimited-file representation.
//!
//! A snapshot is one run's complete set of standings rows, in table order
//! (1st place first). It is written as UTF-8 CSV with a header row and no
//! index column, and read back by the loader with the same value coercion
//! the extractor applied.

use std::fmt;
use std::path::Path;

use crate::error::{SnapshotError, SnapshotResult};

/// Number of columns a normalized standings schema always has.
pub const COLUMN_COUNT: usize = 11;

/// Header names dropped during schema normalization (site navigation
/// columns, not standings data).
pub const DROPPED_HEADERS: [&str; 3] = ["form", "next", "more"];

/// Synthetic column inserted at index 1, right after the position column.
pub const PREVIOUS_POSITION: &str = "previous_position";

/// A single cell value: integer when the source token looks numeric
/// (including a leading sign, e.g. a goal difference of "-5"),
/// otherwise kept as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatValue {
    Int(i64),
    Text(String),
}

impl StatValue {
    /// Coerce a whitespace-trimmed token into a typed value.
    pub fn coerce(token: &str) -> Self {
        let digits = match token.as_bytes() {
            [b'+' | b'-', rest @ ..] if !rest.is_empty() => rest,
            bytes => bytes,
        };
        if !digits.is_empty() && digits.iter().all(u8::is_ascii_digit) {
            if let Ok(n) = token.parse::<i64>() {
                return StatValue::Int(n);
            }
        }
        StatValue::Text(token.to_string())
    }

    pub fn is_int(&self) -> bool {
        matches!(self, StatValue::Int(_))
    }
}

impl fmt::Display for StatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatValue::Int(n) => write!(f, "{}", n),
            StatValue::Text(s) => f.write_str(s),
        }
    }
}

/// Ordered column names derived at runtime from the scraped header.
///
/// Order and count are load-bearing: row values are aligned with the
/// schema by position, so construction rejects anything other than
/// exactly [`COLUMN_COUNT`] names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSchema {
    names: Vec<String>,
}

impl ColumnSchema {
    pub fn from_names(names: Vec<String>) -> SnapshotResult<Self> {
        if names.len() != COLUMN_COUNT {
            return Err(SnapshotError::Malformed(format!(
                "expected {} columns, got {}: {:?}",
                COLUMN_COUNT,
                names.len(),
                names
            )));
        }
        Ok(Self { names })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// One standings entry: exactly one value per schema column, in schema
/// order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandingsRow {
    values: Vec<StatValue>,
}

impl StandingsRow {
    pub fn new(values: Vec<StatValue>) -> Self {
        debug_assert_eq!(values.len(), COLUMN_COUNT);
        Self { values }
    }

    pub fn values(&self) -> &[StatValue] {
        &self.values
    }
}

/// One run's complete extraction result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub schema: ColumnSchema,
    pub rows: Vec<StandingsRow>,
}

impl Snapshot {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Serialize to a delimited file: header first, one line per row.
    pub fn write(&self, path: &Path) -> SnapshotResult<()> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(self.schema.names())?;
        for row in &self.rows {
            writer.write_record(row.values().iter().map(|v| v.to_string()))?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Read a snapshot file back, re-coercing each token the same way the
    /// extractor did.
    pub fn read(path: &Path) -> SnapshotResult<Self> {
        let mut reader = csv::Reader::from_path(path)?;
        let schema = ColumnSchema::from_names(
            reader.headers()?.iter().map(str::to_string).collect(),
        )?;

        let mut rows = Vec::new();
        for (index, record) in reader.records().enumerate() {
            let record = record?;
            if record.len() != schema.len() {
                return Err(SnapshotError::Malformed(format!(
                    "row {} has {} fields, schema has {}",
                    index,
                    record.len(),
                    schema.len()
                )));
            }
            rows.push(StandingsRow::new(
                record.iter().map(StatValue::coerce).collect(),
            ));
        }

        Ok(Self { schema, rows })
    }
}
