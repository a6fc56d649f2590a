//! Turn share-history table rows into data points.
//!
//! Row handling is best effort: a row that doesn't parse is skipped with a reason,
//! it never fails the table. Reasons are kept so tests and debug logs can see them.

use std::sync::LazyLock;

use chrono::NaiveDate;
use scraper::{ElementRef, Selector};
use thiserror::Error;

use crate::domain::DataPoint;

static ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").expect("static selector"));
static CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").expect("static selector"));

/// Rows shorter than this can't carry the share column.
pub const MIN_CELLS: usize = 6;
const DATE_COLUMN: usize = 0;
/// On-exchange shares (场内份额), in units of 10,000.
const VALUE_COLUMN: usize = 5;
/// "ten thousand" unit suffix on share counts.
const UNIT_SUFFIX: char = '万';

/// Why a row was dropped.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SkipReason {
    #[error("row has {found} cells, need at least {required}")]
    TooFewCells { found: usize, required: usize },
    #[error("unparseable date '{0}'")]
    InvalidDate(String),
    #[error("unparseable share value '{0}'")]
    InvalidValue(String),
    #[error("negative share value {0}")]
    NegativeValue(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Parsed(DataPoint),
    Skipped(SkipReason),
}

impl RowOutcome {
    pub fn point(&self) -> Option<DataPoint> {
        match self {
            RowOutcome::Parsed(p) => Some(*p),
            RowOutcome::Skipped(_) => None,
        }
    }
}

/// Cell text of up to `max_rows` data rows, header row excluded.
pub fn extract_cells(table: ElementRef<'_>, max_rows: usize) -> Vec<Vec<String>> {
    table
        .select(&ROW)
        .skip(1)
        .take(max_rows)
        .map(|row| row.select(&CELL).map(cell_text).collect())
        .collect()
}

/// Parse up to `max_rows` data rows of `table`.
pub fn parse_table(table: ElementRef<'_>, max_rows: usize) -> Vec<RowOutcome> {
    extract_cells(table, max_rows)
        .iter()
        .map(|cells| parse_row(cells))
        .collect()
}

pub fn parse_row(cells: &[String]) -> RowOutcome {
    if cells.len() < MIN_CELLS {
        return RowOutcome::Skipped(SkipReason::TooFewCells {
            found: cells.len(),
            required: MIN_CELLS,
        });
    }
    let date = match parse_date_cell(&cells[DATE_COLUMN]) {
        Ok(d) => d,
        Err(reason) => return RowOutcome::Skipped(reason),
    };
    match parse_value_cell(&cells[VALUE_COLUMN]) {
        Ok(value) => RowOutcome::Parsed(DataPoint::new(date, value)),
        Err(reason) => RowOutcome::Skipped(reason),
    }
}

/// `"2024/01/05 extra"` -> 2024-01-05. Only the first whitespace-separated token counts.
pub fn parse_date_cell(raw: &str) -> Result<NaiveDate, SkipReason> {
    let token = raw.split_whitespace().next().unwrap_or("");
    let normalized = token.replace('/', "-");
    NaiveDate::parse_from_str(&normalized, "%Y-%m-%d").map_err(|_| SkipReason::InvalidDate(raw.to_string()))
}

/// `"1,234万"` -> 1234.0. The value stays in units of 10,000 shares.
pub fn parse_value_cell(raw: &str) -> Result<f64, SkipReason> {
    let compact: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .collect();
    let number = compact.strip_suffix(UNIT_SUFFIX).unwrap_or(&compact);
    let value: f64 = number
        .parse()
        .map_err(|_| SkipReason::InvalidValue(raw.to_string()))?;
    if !value.is_finite() {
        return Err(SkipReason::InvalidValue(raw.to_string()));
    }
    if value < 0.0 {
        return Err(SkipReason::NegativeValue(value));
    }
    Ok(value)
}

fn cell_text(cell: ElementRef<'_>) -> String {
    let text: String = cell.text().collect();
    text.trim().replace(',', "")
}
