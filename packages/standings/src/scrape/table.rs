//! Standings table parsing: header derivation and row extraction.
//!
//! Column names come from the scraped header text, so the schema is derived
//! at runtime; cell contents are mapped into columns through a fixed set of
//! cell roles validated up front, and any layout mismatch fails with a
//! descriptive error rather than an index panic.

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::error::{ScrapeError, ScrapeResult};
use crate::snapshot::{
    ColumnSchema, StandingsRow, StatValue, COLUMN_COUNT, DROPPED_HEADERS, PREVIOUS_POSITION,
};

/// Marker class on expansion/detail rows interleaved in the table body.
/// These carry no standings data and are skipped.
const EXPANDABLE_CLASS: &str = "expandable";

/// Roles of the data cells in one standings row, in cell order. The rank
/// cell contributes two columns (position and previous position); every
/// other cell contributes its first token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellRole {
    Rank,
    Team,
    Stat,
}

const CELL_ROLES: [CellRole; 10] = [
    CellRole::Rank,
    CellRole::Team,
    CellRole::Stat,
    CellRole::Stat,
    CellRole::Stat,
    CellRole::Stat,
    CellRole::Stat,
    CellRole::Stat,
    CellRole::Stat,
    CellRole::Stat,
];

// Within the rank cell the visible rank is token 0 and the previous
// position is token 3, embedded after an accessibility label
// ("1 Previous Position 2").
const RANK_TOKEN: usize = 0;
const PREVIOUS_POSITION_TOKEN: usize = 3;

fn selector(css: &str) -> Selector {
    // css is a compile-time literal, parsing cannot fail
    Selector::parse(css).unwrap()
}

/// Return the first table element of the document.
pub fn locate_table(document: &Html) -> ScrapeResult<ElementRef<'_>> {
    document
        .select(&selector("table"))
        .next()
        .ok_or_else(|| ScrapeError::Parse("no table element in document".to_string()))
}

/// Collapse a header cell's text into a column name: newlines become
/// spaces, surrounding whitespace is trimmed, and only the lowercased
/// first token survives (qualifier words after the first space are
/// dropped, so "GD\nGoal Difference" becomes "gd").
fn normalize_header(text: &str) -> String {
    text.replace('\n', " ")
        .trim()
        .split(' ')
        .next()
        .unwrap_or_default()
        .to_lowercase()
}

/// Drop the site's navigation columns and insert the synthetic
/// `previous_position` column at index 1, right after the position column.
fn filter_headers(mut names: Vec<String>) -> Vec<String> {
    names.retain(|name| !DROPPED_HEADERS.contains(&name.as_str()));
    let at = names.len().min(1);
    names.insert(at, PREVIOUS_POSITION.to_string());
    names
}

/// Derive the column schema from the table header.
pub fn derive_columns(table: ElementRef<'_>) -> ScrapeResult<ColumnSchema> {
    let raw: Vec<String> = table
        .select(&selector("thead th"))
        .map(|th| normalize_header(&th.text().collect::<String>()))
        .collect();
    if raw.is_empty() {
        return Err(ScrapeError::Parse(
            "table has no header cells".to_string(),
        ));
    }

    let names = filter_headers(raw);
    debug!(columns = ?names, "derived column schema");
    ColumnSchema::from_names(names).map_err(|e| ScrapeError::Parse(e.to_string()))
}

/// Select the body rows holding standings data, skipping expansion rows.
pub fn select_rows(table: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    table
        .select(&selector("tbody tr"))
        .filter(|row| !is_expandable(row))
        .collect()
}

fn is_expandable(row: &ElementRef<'_>) -> bool {
    row.value().classes().any(|c| c == EXPANDABLE_CLASS)
}

/// Whitespace-separated tokens of a cell's text, empties dropped.
fn cell_tokens(cell: ElementRef<'_>) -> Vec<String> {
    cell.text()
        .collect::<String>()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Extract one standings row, validating the cell layout against the
/// expected roles before any token is read.
pub fn extract_row(row: ElementRef<'_>, index: usize) -> ScrapeResult<StandingsRow> {
    let cells: Vec<Vec<String>> = row.select(&selector("td")).map(cell_tokens).collect();

    if cells.len() < CELL_ROLES.len() {
        return Err(ScrapeError::RowShape {
            index,
            reason: format!(
                "expected at least {} cells, got {}",
                CELL_ROLES.len(),
                cells.len()
            ),
        });
    }

    let mut values = Vec::with_capacity(COLUMN_COUNT);
    for (cell_index, (tokens, role)) in cells.iter().zip(CELL_ROLES).enumerate() {
        match role {
            CellRole::Rank => {
                if tokens.len() <= PREVIOUS_POSITION_TOKEN {
                    return Err(ScrapeError::RowShape {
                        index,
                        reason: format!(
                            "rank cell has {} tokens, need {}",
                            tokens.len(),
                            PREVIOUS_POSITION_TOKEN + 1
                        ),
                    });
                }
                values.push(StatValue::coerce(&tokens[RANK_TOKEN]));
                values.push(StatValue::coerce(&tokens[PREVIOUS_POSITION_TOKEN]));
            }
            CellRole::Team | CellRole::Stat => {
                let token = tokens.first().ok_or_else(|| ScrapeError::RowShape {
                    index,
                    reason: format!("{:?} cell {} is empty", role, cell_index),
                })?;
                values.push(StatValue::coerce(token));
            }
        }
    }

    Ok(StandingsRow::new(values))
}
