//! Spreadsheet layout of the remnants feed.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use tracing::{debug, warn};
use wsync_reconcile::RemnantRecord;

use crate::FeedError;

/// 0-based row holding the column titles; the rows above are a letterhead.
pub const DEFAULT_HEADER_ROW: usize = 17;

pub const CODE_COLUMN: &str = "Код";
pub const QUANTITY_COLUMN: &str = "Количество";
pub const PRICE_COLUMN: &str = "Цена";

/// Parse the first sheet of an `.xls`/`.xlsx` workbook held in memory.
pub fn parse_workbook(bytes: Vec<u8>, header_row: usize) -> Result<Vec<RemnantRecord>, FeedError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| FeedError::Spreadsheet("workbook has no sheets".to_string()))??;
    parse_grid(&grid(&range), header_row)
}

/// Parse a grid of rendered cells laid out as on the sheet (row 0 is the
/// sheet's first row).
///
/// Columns are located by title in `header_row`; every later row with a
/// non-blank code becomes a record.
pub fn parse_grid(rows: &[Vec<String>], header_row: usize) -> Result<Vec<RemnantRecord>, FeedError> {
    let header = rows.get(header_row).map(Vec::as_slice).unwrap_or(&[]);
    let code_col = column(header, CODE_COLUMN, header_row)?;
    let qty_col = column(header, QUANTITY_COLUMN, header_row)?;
    let price_col = column(header, PRICE_COLUMN, header_row)?;

    let mut records = Vec::new();
    let mut blank = 0usize;
    for row in rows.iter().skip(header_row + 1) {
        let code = cell(row, code_col);
        if code.is_empty() {
            blank += 1;
            continue;
        }
        records.push(RemnantRecord::new(
            code,
            cell(row, qty_col),
            cell(row, price_col),
        ));
    }

    if blank > 0 {
        warn!(skipped = blank, "feed rows without a code skipped");
    }
    if records.is_empty() {
        warn!(header_row, "remnants feed has a header but no rows");
    }
    debug!(records = records.len(), "remnants feed parsed");
    Ok(records)
}

fn column(header: &[String], title: &'static str, header_row: usize) -> Result<usize, FeedError> {
    header
        .iter()
        .position(|h| h.trim() == title)
        .ok_or(FeedError::MissingColumn {
            column: title,
            header_row,
        })
}

fn cell(row: &[String], idx: usize) -> &str {
    row.get(idx).map(|s| s.trim()).unwrap_or("")
}

/// Calamine ranges start at the first used cell; pad back to sheet
/// coordinates so `header_row` means the same thing for every file.
fn grid(range: &Range<Data>) -> Vec<Vec<String>> {
    let (row0, col0) = range.start().unwrap_or((0, 0));
    let mut out = vec![Vec::new(); row0 as usize];
    for row in range.rows() {
        let mut cells = vec![String::new(); col0 as usize];
        cells.extend(row.iter().map(render));
        out.push(cells);
    }
    out
}

fn render(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        // Codes and counts are stored as numbers in some exports.
        Data::Float(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
        Data::Float(n) => n.to_string(),
        Data::Int(n) => n.to_string(),
        other => other.to_string(),
    }
}
