// Excel import (xlsx, xlsm, xlsb, xls, ods) of count exports
//
// Only the first row of the used range is treated as the header; everything
// below it is data. Cell types are kept (numbers stay numbers) so the engine
// can coerce them without a text round-trip.

use std::io::{Cursor, Read, Seek};
use std::path::Path;

use calamine::{open_workbook_auto, open_workbook_auto_from_rs, Data, Range, Reader, Sheets};
use countboard_recon::model::{Cell, Dataset};

use crate::error::LoadError;
use crate::headers::clean_headers;

/// Maximum number of data rows read from a sheet
const MAX_ROWS: usize = 1_048_576;

pub fn read_path(path: &Path, sheet: Option<&str>) -> Result<Dataset, LoadError> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| LoadError::Spreadsheet(format!("{}: {e}", path.display())))?;
    read_workbook(&mut workbook, sheet)
}

pub fn read_bytes(bytes: Vec<u8>, sheet: Option<&str>) -> Result<Dataset, LoadError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| LoadError::Spreadsheet(e.to_string()))?;
    read_workbook(&mut workbook, sheet)
}

fn read_workbook<RS: Read + Seek>(
    workbook: &mut Sheets<RS>,
    sheet: Option<&str>,
) -> Result<Dataset, LoadError> {
    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();

    let name = match sheet {
        Some(requested) => sheet_names
            .iter()
            .find(|n| n.as_str() == requested)
            .cloned()
            .ok_or_else(|| LoadError::SheetNotFound {
                name: requested.to_string(),
                available: sheet_names.clone(),
            })?,
        None => sheet_names
            .first()
            .cloned()
            .ok_or_else(|| LoadError::Spreadsheet("workbook contains no sheets".into()))?,
    };
    log::debug!("reading sheet '{name}' of {}", sheet_names.len());

    let range = workbook
        .worksheet_range(&name)
        .map_err(|e| LoadError::Spreadsheet(format!("sheet '{name}': {e}")))?;

    dataset_from_range(&range)
}

fn dataset_from_range(range: &Range<Data>) -> Result<Dataset, LoadError> {
    let mut rows = range.rows();
    let header = rows.next().ok_or(LoadError::Empty)?;
    let headers = clean_headers(header.iter().map(|c| cell_from(c).display()).collect());

    let (height, _) = range.get_size();
    if height > MAX_ROWS + 1 {
        log::warn!("sheet has {} data rows, reading the first {MAX_ROWS}", height - 1);
    }

    let records: Vec<Vec<Cell>> = rows
        .take(MAX_ROWS)
        .map(|row| row.iter().map(cell_from).collect::<Vec<Cell>>())
        .filter(|cells| !cells.iter().all(Cell::is_empty))
        .collect();

    Ok(Dataset::from_rows(headers, records))
}

fn cell_from(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => {
            if s.is_empty() {
                Cell::Empty
            } else {
                Cell::Text(s.clone())
            }
        }
        Data::Float(n) => Cell::Number(*n),
        Data::Int(n) => Cell::Number(*n as f64),
        Data::Bool(b) => Cell::Bool(*b),
        // Dates travel as their serial number, like any other numeric cell
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(e) => Cell::Text(e.to_string()),
    }
}
