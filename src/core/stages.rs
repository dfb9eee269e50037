//! Pure row-level cleaning stages. Every stage maps a [`Sheet`] to a new
//! [`Sheet`], preserving column order and set; the input is left untouched.

use std::collections::HashSet;

use crate::domain::model::{Cell, Sheet};
use crate::utils::error::{EtlError, Result};

/// Drop every row at index >= `from` whose key cell is blank (absent or the
/// exact empty string). Rows below `from` are kept no matter what.
pub fn prune_sparse_rows(sheet: &Sheet, key_col: usize, from: usize) -> Sheet {
    let mut out = Sheet::new(sheet.columns.clone());
    for (idx, row) in sheet.rows.iter().enumerate() {
        let blank_key = row.get(key_col).map(Cell::is_blank).unwrap_or(true);
        if idx >= from && blank_key {
            continue;
        }
        out.rows.push(row.clone());
    }
    out
}

/// Coalesce consecutive row pairs from `from` onward.
///
/// Rows below `from` pass through unchanged. For each candidate pair, the
/// second row may refuse the merge (see [`stands_alone`]); the first row is
/// then emitted by itself and the second row becomes the next candidate. An
/// unpaired trailing row is emitted as is.
///
/// Fails when the sheet has no rows at all.
pub fn merge_row_pairs(
    sheet: &Sheet,
    key_col: usize,
    guard_col: Option<usize>,
    from: usize,
) -> Result<Sheet> {
    if sheet.rows.is_empty() {
        return Err(EtlError::ProcessingError {
            message: "Cannot merge rows of an empty sheet".to_string(),
        });
    }

    let mut out = Sheet::new(sheet.columns.clone());

    for row in sheet.rows.iter().take(from) {
        out.rows.push(row.clone());
    }

    let mut i = from;
    while i + 1 < sheet.rows.len() {
        let row1 = &sheet.rows[i];
        let row2 = &sheet.rows[i + 1];

        if stands_alone(row2, key_col, guard_col) {
            out.rows.push(row1.clone());
            i += 1;
            continue;
        }

        out.rows.push(merge_pair(row1, row2, sheet.columns.len()));
        i += 2;
    }

    if i < sheet.rows.len() {
        out.rows.push(sheet.rows[i].clone());
    }

    Ok(out)
}

/// A second row refuses to be merged into the row above it when it carries
/// both a key value and guard-column content. The key check is exact; the
/// guard check trims its string form.
fn stands_alone(row: &[Cell], key_col: usize, guard_col: Option<usize>) -> bool {
    let Some(guard_col) = guard_col else {
        return false;
    };

    let key_filled = row.get(key_col).map(|c| !c.is_blank()).unwrap_or(false);
    let guard_filled = row.get(guard_col).map(guard_has_content).unwrap_or(false);

    key_filled && guard_filled
}

// Unlike merge normalization, literal "nan" text counts as content here.
fn guard_has_content(cell: &Cell) -> bool {
    match cell {
        Cell::Empty => false,
        Cell::Text(s) => !s.trim().is_empty(),
        Cell::Number(n) => !n.is_nan(),
    }
}

fn merge_pair(row1: &[Cell], row2: &[Cell], width: usize) -> Vec<Cell> {
    (0..width)
        .map(|col| {
            let val1 = row1.get(col).map(Cell::merge_text).unwrap_or_default();
            let val2 = row2.get(col).map(Cell::merge_text).unwrap_or_default();
            match (val1.is_empty(), val2.is_empty()) {
                (false, false) => Cell::Text(format!("{} - {}", val1, val2)),
                (false, true) => Cell::Text(val1),
                (true, false) => Cell::Text(val2),
                (true, true) => Cell::Empty,
            }
        })
        .collect()
}

/// Drop rows whose identifier cell contains the header-artifact text that
/// merging a repeated header pair leaves behind. Non-text cells never match.
pub fn drop_header_artifacts(sheet: &Sheet, id_col: usize, needle: &str) -> Sheet {
    let mut out = Sheet::new(sheet.columns.clone());
    for row in &sheet.rows {
        let is_artifact = matches!(row.get(id_col), Some(Cell::Text(s)) if s.contains(needle));
        if !is_artifact {
            out.rows.push(row.clone());
        }
    }
    out
}

/// Keep-first deduplication on the identifier column's normalized string
/// form. Rows with a blank identifier are always kept.
pub fn dedupe_by_identifier(sheet: &Sheet, id_col: usize) -> Sheet {
    let mut seen = HashSet::new();
    let mut out = Sheet::new(sheet.columns.clone());
    for row in &sheet.rows {
        let id = row.get(id_col).map(Cell::merge_text).unwrap_or_default();
        if !id.is_empty() && !seen.insert(id) {
            continue;
        }
        out.rows.push(row.clone());
    }
    out
}
