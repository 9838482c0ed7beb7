use crate::model::{Cell, PeriodColumn, PeriodMap, PeriodSource, RawGrid};
use crate::parsing::normalize::{clean_period_label, detect_currency};
use crate::parsing::values::{
    excel_serial_to_date, format_date, is_amount_like, is_numeric_cell, DateOrder,
};
use chrono::NaiveDate;
use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;
use tracing::debug;

/// Rows examined when looking for the header row.
pub const HEADER_SCAN_ROWS: usize = 10;
/// Rows below a candidate header checked by the numeric fallback.
pub const FALLBACK_LOOKAHEAD: usize = 4;
/// Serial numbers accepted as header dates (roughly 2017-2031).
pub const HEADER_SERIAL_RANGE: Range<f64> = 43000.0..48000.0;

static YEAR_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b20[23]\d\b").unwrap());

static DATE_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,2})[/-](\d{1,2}|[a-z]{3})[/-](\d{2,4})\b").unwrap()
});

static ISO_DATE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{4})-(\d{1,2})-(\d{1,2})\b").unwrap());

static ANY_YEAR_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b((?:19|20)\d{2})\b").unwrap());

/// Which strategy located the header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionStrategy {
    DatePattern,
    NumericFallback,
}

#[derive(Debug, Clone)]
pub struct DetectOptions {
    pub scan_rows: usize,
    pub lookahead: usize,
    pub date_order: DateOrder,
}

impl Default for DetectOptions {
    fn default() -> Self {
        Self {
            scan_rows: HEADER_SCAN_ROWS,
            lookahead: FALLBACK_LOOKAHEAD,
            date_order: DateOrder::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HeaderDetection {
    /// 0-based index of the header row.
    pub header_row: usize,
    pub periods: PeriodMap,
    pub strategy: DetectionStrategy,
    /// Labels that appeared in more than one column (first column kept).
    pub duplicate_labels: Vec<String>,
}

/// Locate the header row and map each period column.
///
/// Scans the first `scan_rows` rows for year, date or serial-date headers;
/// if none are found, falls back to the first row whose columns have numeric
/// data underneath. Returns None when neither strategy finds a column.
pub fn detect_headers(grid: &RawGrid, options: &DetectOptions) -> Option<HeaderDetection> {
    let scan = options.scan_rows.min(grid.len());
    let width = grid.width();

    for row in 0..scan {
        let mut periods = PeriodMap::new();
        let mut duplicate_labels = Vec::new();
        for col in 1..width {
            if let Some((label, source)) = match_period(grid.cell(row, col), options.date_order) {
                register(&mut periods, &mut duplicate_labels, label, col, source);
            }
        }
        if !periods.is_empty() {
            debug!(row, periods = ?periods.labels(), "header row found by date pattern");
            return Some(HeaderDetection {
                header_row: row,
                periods,
                strategy: DetectionStrategy::DatePattern,
                duplicate_labels,
            });
        }
    }

    for row in 0..scan {
        let mut periods = PeriodMap::new();
        let mut duplicate_labels = Vec::new();
        for col in 1..width {
            let has_numbers_below = (row + 1..=row + options.lookahead)
                .any(|r| is_numeric_cell(grid.cell(r, col)));
            if !has_numbers_below {
                continue;
            }
            let label = fallback_label(grid.cell(row, col), col);
            register(
                &mut periods,
                &mut duplicate_labels,
                label,
                col,
                PeriodSource::NumericFallback,
            );
        }
        if !periods.is_empty() {
            debug!(row, periods = ?periods.labels(), "header row found by numeric fallback");
            return Some(HeaderDetection {
                header_row: row,
                periods,
                strategy: DetectionStrategy::NumericFallback,
                duplicate_labels,
            });
        }
    }

    None
}

fn register(
    periods: &mut PeriodMap,
    duplicates: &mut Vec<String>,
    label: String,
    column: usize,
    source: PeriodSource,
) {
    if !periods.insert(PeriodColumn {
        label: label.clone(),
        column,
        source,
    }) {
        duplicates.push(label);
    }
}

/// Test one header cell against the year, date and serial-date patterns,
/// in that priority.
fn match_period(cell: &Cell, order: DateOrder) -> Option<(String, PeriodSource)> {
    let text = cell.display_text();
    if text.is_empty() {
        return None;
    }

    if YEAR_TOKEN.is_match(&text) {
        return non_empty_label(&text, PeriodSource::Year);
    }
    if DATE_TOKEN.is_match(&text) {
        return non_empty_label(&text, PeriodSource::Date);
    }

    let serial = match cell {
        Cell::Number(n) => Some(*n),
        Cell::Text(s) if s.trim().chars().all(|c| c.is_ascii_digit()) => s.trim().parse().ok(),
        _ => None,
    }?;
    if HEADER_SERIAL_RANGE.contains(&serial) {
        let date = excel_serial_to_date(serial)?;
        return Some((format_date(date, order), PeriodSource::SerialDate));
    }
    None
}

fn non_empty_label(text: &str, source: PeriodSource) -> Option<(String, PeriodSource)> {
    let label = clean_period_label(text);
    if label.is_empty() {
        None
    } else {
        Some((label, source))
    }
}

fn fallback_label(cell: &Cell, col: usize) -> String {
    match cell.as_text() {
        Some(text) if !is_amount_like(text) => {
            let label = clean_period_label(text);
            if label.is_empty() {
                format!("Periodo_{col}")
            } else {
                label
            }
        }
        _ => format!("Periodo_{col}"),
    }
}

/// Document-level facts found around the header row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentMetadata {
    pub currency: Option<String>,
    pub company_name: Option<String>,
}

const COMPANY_LABELS: &[&str] = &[
    "razón social",
    "razon social",
    "empresa",
    "sociedad",
    "company",
];

/// Extract currency annotations from the header region and a company name
/// from labeled lines above the header.
pub fn detect_metadata(grid: &RawGrid, header_row: usize) -> DocumentMetadata {
    let mut meta = DocumentMetadata::default();

    for row in 0..=header_row {
        for cell in grid.row(row) {
            let Some(text) = cell.as_text() else {
                continue;
            };

            if meta.currency.is_none() {
                meta.currency = detect_currency(text).map(str::to_string);
            }

            if meta.company_name.is_none() && row < header_row {
                meta.company_name = COMPANY_LABELS
                    .iter()
                    .find_map(|label| extract_after_label(text, label));
            }
        }
    }

    meta
}

/// Extract a value appearing after a label (case-insensitive).
/// Handles patterns like "Label: value" or "Label    value".
fn extract_after_label(line: &str, label: &str) -> Option<String> {
    let lower = line.to_lowercase();
    let idx = lower.find(label)?;
    let after = line.get(idx + label.len()..)?;
    let trimmed = after.trim_start_matches(|c: char| c == ':' || c.is_whitespace());
    let value = trimmed.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn month_from_name(name: &str) -> Option<u32> {
    let month = match name.to_lowercase().as_str() {
        "ene" | "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "abr" | "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "ago" | "aug" => 8,
        "sep" | "set" => 9,
        "oct" => 10,
        "nov" => 11,
        "dic" | "dec" => 12,
        _ => return None,
    };
    Some(month)
}

/// Best-effort calendar date for a period label, used to order periods.
/// Bare years map to December 31st.
pub fn period_date(label: &str) -> Option<NaiveDate> {
    if let Some(caps) = ISO_DATE_TOKEN.captures(label) {
        let y = caps[1].parse().ok()?;
        let m = caps[2].parse().ok()?;
        let d = caps[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(y, m, d);
    }

    if let Some(caps) = DATE_TOKEN.captures(label) {
        let day: u32 = caps[1].parse().ok()?;
        let month = match caps[2].parse::<u32>() {
            Ok(m) => m,
            Err(_) => month_from_name(&caps[2])?,
        };
        let mut year: i32 = caps[3].parse().ok()?;
        if year < 100 {
            year += 2000;
        }
        return NaiveDate::from_ymd_opt(year, month, day)
            .or_else(|| NaiveDate::from_ymd_opt(year, day, month));
    }

    let caps = ANY_YEAR_TOKEN.captures(label)?;
    NaiveDate::from_ymd_opt(caps[1].parse().ok()?, 12, 31)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detect(grid: &RawGrid) -> Option<HeaderDetection> {
        detect_headers(grid, &DetectOptions::default())
    }

    #[test]
    fn test_year_header_row_zero() {
        let grid = RawGrid::from_text(&[&["", "2024", "2025"], &["Ventas", "1.000", "1.200"]]);
        let h = detect(&grid).unwrap();
        assert_eq!(h.header_row, 0);
        assert_eq!(h.periods.labels(), vec!["2024", "2025"]);
        assert_eq!(h.periods.column_of("2025"), Some(2));
        assert_eq!(h.strategy, DetectionStrategy::DatePattern);
    }

    #[test]
    fn test_header_below_title_rows() {
        let grid = RawGrid::from_text(&[
            &["Estado de Resultados"],
            &["Razón social: Comercial Andes SpA"],
            &["Cuenta", "2023 M$", "%", "2024 M$", "%"],
            &["Ventas", "900", "100", "1.000", "100"],
        ]);
        let h = detect(&grid).unwrap();
        assert_eq!(h.header_row, 2);
        assert_eq!(h.periods.labels(), vec!["2023", "2024"]);
        assert_eq!(h.periods.column_of("2024"), Some(3));
    }

    #[test]
    fn test_day_month_year_with_month_name() {
        let grid = RawGrid::from_text(&[&["", "31-Dic-19", "31/10/18"]]);
        let h = detect(&grid).unwrap();
        assert_eq!(h.periods.labels(), vec!["31-Dic-19", "31/10/18"]);
        assert!(h.periods.iter().all(|p| p.source == PeriodSource::Date));
    }

    #[test]
    fn test_serial_date_header() {
        let grid = RawGrid::new(vec![vec![
            Cell::Empty,
            Cell::Number(45291.0),
            Cell::Number(45657.0),
        ]]);
        let h = detect(&grid).unwrap();
        assert_eq!(h.periods.labels(), vec!["31/12/2023", "31/12/2024"]);
        assert_eq!(
            h.periods.iter().next().unwrap().source,
            PeriodSource::SerialDate
        );
    }

    #[test]
    fn test_column_zero_is_ignored() {
        let grid = RawGrid::from_text(&[&["2024", "Saldo"], &["Caja", "n/a"]]);
        assert!(detect(&grid).is_none());
    }

    #[test]
    fn test_numeric_fallback() {
        let grid = RawGrid::from_text(&[
            &["Cuenta", "Saldo actual", "Saldo anterior"],
            &["Ventas", "1.000", "900"],
            &["Costo de ventas", "(400)", "(350)"],
        ]);
        let h = detect(&grid).unwrap();
        assert_eq!(h.strategy, DetectionStrategy::NumericFallback);
        assert_eq!(h.header_row, 0);
        assert_eq!(h.periods.labels(), vec!["Saldo actual", "Saldo anterior"]);
    }

    #[test]
    fn test_numeric_fallback_synthetic_label() {
        let grid = RawGrid::from_text(&[&["Balance"], &["Caja", "500"]]);
        let h = detect(&grid).unwrap();
        assert_eq!(h.periods.labels(), vec!["Periodo_1"]);
    }

    #[test]
    fn test_no_signal_returns_none() {
        let grid = RawGrid::from_text(&[
            &["Informe", "Notas"],
            &["Ventas", "ver anexo"],
            &["Costos", "pendiente"],
        ]);
        assert!(detect(&grid).is_none());
    }

    #[test]
    fn test_only_first_ten_rows_scanned() {
        // Filler extends past the fallback lookahead of the last scanned row.
        let mut rows: Vec<Vec<Cell>> = (0..14).map(|_| vec![Cell::from("texto")]).collect();
        rows.push(vec![Cell::Empty, Cell::from("2024")]);
        rows.push(vec![Cell::from("Ventas"), Cell::from("100")]);
        let grid = RawGrid::new(rows);
        assert!(detect(&grid).is_none());
    }

    #[test]
    fn test_duplicate_labels_reported() {
        let grid = RawGrid::from_text(&[&["", "2024", "2024 M$"]]);
        let h = detect(&grid).unwrap();
        assert_eq!(h.periods.len(), 1);
        assert_eq!(h.duplicate_labels, vec!["2024"]);
    }

    #[test]
    fn test_metadata_company_and_currency() {
        let grid = RawGrid::from_text(&[
            &["Razón social: Comercial Andes SpA"],
            &["", "2024 M$"],
        ]);
        let meta = detect_metadata(&grid, 1);
        assert_eq!(meta.company_name.as_deref(), Some("Comercial Andes SpA"));
        assert_eq!(meta.currency.as_deref(), Some("CLP"));
    }

    #[test]
    fn test_period_date() {
        assert_eq!(period_date("2024"), NaiveDate::from_ymd_opt(2024, 12, 31));
        assert_eq!(period_date("31/10/2025"), NaiveDate::from_ymd_opt(2025, 10, 31));
        assert_eq!(period_date("31-Dic-24"), NaiveDate::from_ymd_opt(2024, 12, 31));
        assert_eq!(period_date("2024-06-30"), NaiveDate::from_ymd_opt(2024, 6, 30));
        assert_eq!(period_date("Periodo_2"), None);
    }
}
