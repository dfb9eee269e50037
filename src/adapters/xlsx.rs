//! XLSX codec between workbook bytes and the in-memory [`Sheet`].

use std::io::Cursor;

use calamine::{Data, Reader, Xlsx};
use rust_xlsxwriter::Workbook;

use crate::domain::model::{Cell, Sheet};
use crate::utils::error::{EtlError, Result};

/// Decode the first worksheet of a workbook.
///
/// The first `skip_rows` physical rows are dropped and the next row becomes
/// the header. Header cells without text are auto-named `Unnamed: {col}`
/// (0-based column position), matching the naming the loop-list exports
/// carry for their unlabeled columns. Remaining rows become data rows padded
/// to the header width.
pub fn decode_first_worksheet(bytes: &[u8], skip_rows: usize) -> Result<Sheet> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))?;

    let sheet_names = workbook.sheet_names();
    let first = sheet_names
        .first()
        .cloned()
        .ok_or_else(|| EtlError::ProcessingError {
            message: "Workbook contains no worksheets".to_string(),
        })?;
    let range = workbook.worksheet_range(&first)?;

    // calamine ranges begin at the first non-empty cell; rows above the
    // range start count toward the physical skip.
    let start_row = range.start().map(|(r, _)| r as usize).unwrap_or(0);
    let mut rows = range.rows().skip(skip_rows.saturating_sub(start_row));

    let header = rows.next().ok_or_else(|| EtlError::ProcessingError {
        message: format!(
            "Worksheet '{}' has no header row after skipping {} row(s)",
            first, skip_rows
        ),
    })?;

    let columns = header
        .iter()
        .enumerate()
        .map(|(idx, data)| {
            let name = header_text(data);
            if name.is_empty() {
                format!("Unnamed: {}", idx)
            } else {
                name
            }
        })
        .collect();

    let mut sheet = Sheet::new(columns);
    for row in rows {
        sheet.push_row(row.iter().map(data_to_cell).collect());
    }

    Ok(sheet)
}

/// Encode a sheet as a single-worksheet workbook: header row from the column
/// names, one row per data row, no index column. Empty cells stay blank.
pub fn encode_worksheet(sheet: &Sheet) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (col, name) in sheet.columns.iter().enumerate() {
        worksheet.write_string(0, col as u16, name)?;
    }

    for (idx, row) in sheet.rows.iter().enumerate() {
        let row_num = (idx + 1) as u32;
        for (col, cell) in row.iter().enumerate() {
            match cell {
                Cell::Empty => {}
                Cell::Text(s) => {
                    worksheet.write_string(row_num, col as u16, s)?;
                }
                Cell::Number(n) => {
                    worksheet.write_number(row_num, col as u16, *n)?;
                }
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}

fn header_text(data: &Data) -> String {
    match data {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => format!("{}", f),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => format!("{}", dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(_) => String::new(),
    }
}

fn data_to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Text(b.to_string()),
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(_) => Cell::Empty,
    }
}
