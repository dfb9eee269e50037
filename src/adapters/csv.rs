//! CSV rendition of a sheet, for downstream tools that do not read XLSX.

use crate::domain::model::{Cell, Sheet};
use crate::utils::error::{EtlError, Result};

pub fn encode_sheet(sheet: &Sheet) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record(&sheet.columns)?;
    for row in &sheet.rows {
        let record: Vec<String> = row.iter().map(cell_field).collect();
        writer.write_record(&record)?;
    }

    writer
        .into_inner()
        .map_err(|e| EtlError::ProcessingError {
            message: format!("CSV buffer flush failed: {}", e),
        })
}

fn cell_field(cell: &Cell) -> String {
    match cell {
        Cell::Empty => String::new(),
        Cell::Text(s) => s.clone(),
        Cell::Number(n) => format!("{}", n),
    }
}
