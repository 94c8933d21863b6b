//! Loader: appends a snapshot file's rows into a dated Postgres table.
//!
//! The destination table is created on first write with column types
//! inferred from the snapshot values. Appends only: re-loading the same
//! snapshot into the same table duplicates every row.

use std::path::Path;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{debug, info};

use crate::config::DbConfig;
use crate::error::{IngestError, IngestResult};
use crate::snapshot::{ColumnSchema, Snapshot, StatValue};

/// SQL type chosen for a snapshot column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    BigInt,
    Text,
}

impl ColumnType {
    fn sql(self) -> &'static str {
        match self {
            ColumnType::BigInt => "BIGINT",
            ColumnType::Text => "TEXT",
        }
    }
}

/// Open a connection pool from environment-provided credentials.
pub async fn connect(db: &DbConfig) -> IngestResult<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&db.connection_url())
        .await
        .map_err(IngestError::Connection)?;
    info!(host = %db.host, database = %db.name, "connected to database");
    Ok(pool)
}

/// Pick a SQL type per column: `BIGINT` when every row holds an integer
/// there, `TEXT` otherwise (including the no-rows case).
fn infer_column_types(snapshot: &Snapshot) -> Vec<ColumnType> {
    (0..snapshot.schema.len())
        .map(|column| {
            let all_int = !snapshot.rows.is_empty()
                && snapshot
                    .rows
                    .iter()
                    .all(|row| row.values()[column].is_int());
            if all_int {
                ColumnType::BigInt
            } else {
                ColumnType::Text
            }
        })
        .collect()
}

/// Quote a runtime-supplied identifier. Table and column names come from
/// date templates and scraped headers, so they cannot be bound as
/// parameters.
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn create_table_sql(table: &str, schema: &ColumnSchema, types: &[ColumnType]) -> String {
    let columns: Vec<String> = schema
        .names()
        .iter()
        .zip(types)
        .map(|(name, ty)| format!("{} {}", quote_ident(name), ty.sql()))
        .collect();
    format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        quote_ident(table),
        columns.join(", ")
    )
}

fn insert_sql(table: &str, schema: &ColumnSchema) -> String {
    let columns: Vec<String> = schema.names().iter().map(|n| quote_ident(n)).collect();
    let placeholders: Vec<String> = (1..=schema.len()).map(|i| format!("${}", i)).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_ident(table),
        columns.join(", "),
        placeholders.join(", ")
    )
}

/// Read the snapshot file and append every row to `table`, creating the
/// table first if it does not exist. Returns the number of rows appended.
pub async fn load(pool: &PgPool, path: &Path, table: &str) -> IngestResult<u64> {
    let snapshot = Snapshot::read(path)?;
    let types = infer_column_types(&snapshot);
    debug!(path = %path.display(), rows = snapshot.row_count(), "snapshot read");

    sqlx::query(&create_table_sql(table, &snapshot.schema, &types))
        .execute(pool)
        .await
        .map_err(|source| IngestError::Write {
            table: table.to_string(),
            source,
        })?;

    let insert = insert_sql(table, &snapshot.schema);
    let mut appended = 0u64;
    for row in &snapshot.rows {
        let mut query = sqlx::query(&insert);
        for (value, ty) in row.values().iter().zip(&types) {
            query = match (value, ty) {
                (StatValue::Int(n), ColumnType::BigInt) => query.bind(*n),
                (StatValue::Int(n), ColumnType::Text) => query.bind(n.to_string()),
                (StatValue::Text(s), _) => query.bind(s.clone()),
            };
        }
        query
            .execute(pool)
            .await
            .map_err(|source| IngestError::Write {
                table: table.to_string(),
                source,
            })?;
        appended += 1;
    }

    info!(table = %table, rows = appended, "snapshot appended");
    Ok(appended)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::StandingsRow;

    fn schema() -> ColumnSchema {
        ColumnSchema::from_names(
            [
                "position",
                "previous_position",
                "club",
                "played",
                "won",
                "drawn",
                "lost",
                "gf",
                "ga",
                "gd",
                "points",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        )
        .unwrap()
    }

    fn snapshot_with_rows(rows: Vec<StandingsRow>) -> Snapshot {
        Snapshot {
            schema: schema(),
            rows,
        }
    }

    fn int_row(club_column: StatValue) -> StandingsRow {
        let mut values = vec![StatValue::Int(1), StatValue::Int(2), club_column];
        values.extend((0..8).map(|i| StatValue::Int(i)));
        StandingsRow::new(values)
    }

    #[test]
    fn column_types_follow_values() {
        let snapshot =
            snapshot_with_rows(vec![int_row(StatValue::Text("Arsenal".to_string()))]);
        let types = infer_column_types(&snapshot);
        assert_eq!(types[0], ColumnType::BigInt);
        assert_eq!(types[2], ColumnType::Text);
        assert_eq!(types[10], ColumnType::BigInt);
    }

    #[test]
    fn mixed_column_falls_back_to_text() {
        let snapshot = snapshot_with_rows(vec![
            int_row(StatValue::Text("Arsenal".to_string())),
            int_row(StatValue::Int(7)),
        ]);
        let types = infer_column_types(&snapshot);
        assert_eq!(types[2], ColumnType::Text);
    }

    #[test]
    fn empty_snapshot_defaults_to_text() {
        let snapshot = snapshot_with_rows(vec![]);
        assert!(infer_column_types(&snapshot)
            .iter()
            .all(|t| *t == ColumnType::Text));
    }

    #[test]
    fn identifiers_are_quoted() {
        assert_eq!(quote_ident("league_table_20240210"), "\"league_table_20240210\"");
        assert_eq!(quote_ident("odd\"name"), "\"odd\"\"name\"");
    }

    #[test]
    fn create_table_lists_every_column() {
        let snapshot =
            snapshot_with_rows(vec![int_row(StatValue::Text("Arsenal".to_string()))]);
        let types = infer_column_types(&snapshot);
        let sql = create_table_sql("league_table_20240210", &snapshot.schema, &types);
        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS \"league_table_20240210\" ("));
        assert!(sql.contains("\"position\" BIGINT"));
        assert!(sql.contains("\"club\" TEXT"));
        assert!(sql.contains("\"points\" BIGINT"));
    }

    #[test]
    fn insert_uses_positional_placeholders() {
        let sql = insert_sql("league_table_20240210", &schema());
        assert!(sql.ends_with("($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)"));
        assert!(sql.contains("\"previous_position\""));
    }
}
