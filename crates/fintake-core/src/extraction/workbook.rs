use std::io::Cursor;

use calamine::{Data, Range, Reader};
use tracing::debug;

use crate::error::FintakeError;
use crate::model::{Cell, RawGrid};

/// Decode one sheet of an in-memory workbook (xlsx, xlsm, xlsb, xls or ods).
///
/// The grid keeps the sheet's absolute coordinates: when the used range does
/// not start at A1, leading rows and columns are padded with blanks so row
/// numbers match what the user sees in the spreadsheet.
pub fn read_workbook(bytes: &[u8], sheet_index: usize) -> Result<RawGrid, FintakeError> {
    let cursor = Cursor::new(bytes);
    let mut workbook = calamine::open_workbook_auto_from_rs(cursor)
        .map_err(|e| FintakeError::Workbook(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(sheet_index)
        .ok_or(FintakeError::SheetNotFound(sheet_index))?
        .map_err(|e| FintakeError::Workbook(format!("sheet {sheet_index}: {e}")))?;

    let grid = range_to_grid(&range);
    debug!(
        sheet = sheet_index,
        rows = grid.len(),
        cols = grid.width(),
        "workbook sheet decoded"
    );
    Ok(grid)
}

fn range_to_grid(range: &Range<Data>) -> RawGrid {
    let (row_offset, col_offset) = range
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or((0, 0));

    let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); row_offset];
    for row in range.rows() {
        let mut cells = vec![Cell::Empty; col_offset];
        cells.extend(row.iter().map(convert_cell));
        rows.push(cells);
    }
    RawGrid::new(rows)
}

/// Map a calamine cell onto the grid's cell model. Date cells keep their
/// serial number so header detection can recognize them.
pub fn convert_cell(cell: &Data) -> Cell {
    match cell {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::from(s.as_str()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Text(b.to_string()),
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::from(s.as_str()),
        Data::Error(_) => Cell::Empty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_scalar_cells() {
        assert_eq!(convert_cell(&Data::Empty), Cell::Empty);
        assert_eq!(
            convert_cell(&Data::String("Ventas".into())),
            Cell::Text("Ventas".into())
        );
        assert_eq!(convert_cell(&Data::String(String::new())), Cell::Empty);
        assert_eq!(convert_cell(&Data::Int(2024)), Cell::Number(2024.0));
        assert_eq!(convert_cell(&Data::Float(1500.5)), Cell::Number(1500.5));
        assert_eq!(convert_cell(&Data::Bool(true)), Cell::Text("true".into()));
    }

    #[test]
    fn test_error_cell_is_blank() {
        assert_eq!(
            convert_cell(&Data::Error(calamine::CellErrorType::Div0)),
            Cell::Empty
        );
    }

    #[test]
    fn test_range_offset_is_padded() {
        let mut range: Range<Data> = Range::new((2, 1), (3, 2));
        range.set_value((2, 1), Data::String("Ventas".into()));
        range.set_value((2, 2), Data::Float(100.0));
        let grid = range_to_grid(&range);
        assert_eq!(grid.len(), 4);
        assert_eq!(grid.cell(2, 1), &Cell::Text("Ventas".into()));
        assert_eq!(grid.cell(2, 2), &Cell::Number(100.0));
        assert_eq!(grid.cell(0, 0), &Cell::Empty);
    }

    #[test]
    fn test_garbage_bytes_fail_to_open() {
        let err = read_workbook(b"not a workbook", 0).unwrap_err();
        assert!(matches!(err, FintakeError::Workbook(_)));
    }
}
