use csv::ReaderBuilder;
use tracing::debug;

use crate::error::FintakeError;
use crate::model::{Cell, RawGrid};

const SNIFF_LINES: usize = 5;

/// Pick `;` when the leading lines hold more semicolons than commas. Exports
/// from Spanish-locale tools use `;` because `,` is their decimal mark.
fn sniff_delimiter(bytes: &[u8]) -> u8 {
    let count = |needle: u8| {
        bytes
            .split(|&b| b == b'\n')
            .take(SNIFF_LINES)
            .flat_map(|line| line.iter())
            .filter(|&&b| b == needle)
            .count()
    };
    if count(b';') > count(b',') {
        b';'
    } else {
        b','
    }
}

/// Decode CSV bytes into a grid. Every field is text; numeric
/// interpretation happens later.
pub fn read_csv(bytes: &[u8]) -> Result<RawGrid, FintakeError> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let delimiter = sniff_delimiter(bytes);

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(|field| Cell::from(field.trim())).collect());
    }

    debug!(
        delimiter = %(delimiter as char),
        rows = rows.len(),
        "csv decoded"
    );
    Ok(RawGrid::new(rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comma_delimited() {
        let grid = read_csv(b",2024,2025\nVentas,1000,1200\n").unwrap();
        assert_eq!(grid.len(), 2);
        assert_eq!(grid.cell(0, 0), &Cell::Empty);
        assert_eq!(grid.cell(1, 2), &Cell::Text("1200".into()));
    }

    #[test]
    fn test_semicolon_delimited_with_decimal_commas() {
        let csv = "Cuenta;2024\nVentas;1.234,50\n";
        let grid = read_csv(csv.as_bytes()).unwrap();
        assert_eq!(grid.cell(1, 1), &Cell::Text("1.234,50".into()));
    }

    #[test]
    fn test_semicolons_below_a_title_line() {
        let csv = "Estado de Resultados\nCuenta;2024;2025\nVentas;10;12\n";
        let grid = read_csv(csv.as_bytes()).unwrap();
        assert_eq!(grid.cell(2, 2), &Cell::Text("12".into()));
    }

    #[test]
    fn test_ragged_rows_and_bom() {
        let csv = "\u{FEFF}Empresa: Demo SpA\n,2024\nVentas,10,extra\n";
        let grid = read_csv(csv.as_bytes()).unwrap();
        assert_eq!(grid.cell(0, 0), &Cell::Text("Empresa: Demo SpA".into()));
        assert_eq!(grid.row(2).len(), 3);
    }

    #[test]
    fn test_quoted_thousands_separators() {
        let grid = read_csv(b",2024\n\"Ventas\",\"1,000,000\"\n").unwrap();
        assert_eq!(grid.cell(1, 1), &Cell::Text("1,000,000".into()));
    }
}
