use crate::model::Cell;
use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::str::FromStr;

/// Serial range accepted when formatting a numeric cell as a calendar date.
pub const SERIAL_DATE_RANGE: Range<f64> = 40000.0..60000.0;

/// Day/month/year convention used to format dates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateOrder {
    #[default]
    DayMonthYear,
    MonthDayYear,
    YearMonthDay,
}

impl DateOrder {
    pub fn from_str_loose(s: &str) -> Option<DateOrder> {
        match s.trim().to_lowercase().as_str() {
            "dmy" | "day_month_year" | "dd/mm/yyyy" => Some(DateOrder::DayMonthYear),
            "mdy" | "month_day_year" | "mm/dd/yyyy" => Some(DateOrder::MonthDayYear),
            "ymd" | "year_month_day" | "yyyy-mm-dd" | "iso" => Some(DateOrder::YearMonthDay),
            _ => None,
        }
    }
}

/// Parse a textual amount from an accounting export into a Decimal.
///
/// Handles formats like:
/// - "1.000.000" -> 1000000 (a lone dot is a thousands separator)
/// - "1,234,567" -> 1234567
/// - "1.234,56" / "1,234.56" -> 1234.56 (the last separator is the decimal one)
/// - "(1.234)" -> -1234 (accounting negative)
/// - "$ -500" -> -500
/// - "", "-" -> 0
///
/// Anything that still fails to parse yields zero; this never errors.
pub fn normalize_amount(s: &str) -> Decimal {
    let s = s.trim();
    if s.is_empty() || s == "-" {
        return Decimal::ZERO;
    }

    // Accounting parentheses, possibly behind a currency prefix: "$ (1.234)"
    let unprefixed = s.trim_start_matches(|c: char| !(c == '(' || c == '-' || c.is_ascii_digit()));
    if let Some(inner) = unprefixed
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
    {
        return -normalize_amount(inner).abs();
    }

    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-'))
        .collect();

    let canonical = match (cleaned.rfind('.'), cleaned.rfind(',')) {
        (Some(dot), Some(comma)) => {
            let (thousands, decimal) = if dot > comma { (',', '.') } else { ('.', ',') };
            cleaned
                .chars()
                .filter(|&c| c != thousands)
                .map(|c| if c == decimal { '.' } else { c })
                .collect()
        }
        // Policy: a lone separator is always a thousands separator, so
        // "12.50" reads as 1250. Kept for compatibility with ingested data.
        (Some(_), None) => cleaned.replace('.', ""),
        (None, Some(_)) => cleaned.replace(',', ""),
        (None, None) => cleaned,
    };

    Decimal::from_str(&canonical).unwrap_or(Decimal::ZERO)
}

/// Normalize any cell to a Decimal. Native numbers pass through unchanged.
pub fn normalize_cell(cell: &Cell) -> Decimal {
    match cell {
        Cell::Number(n) => f64_to_decimal(*n),
        Cell::Text(s) => normalize_amount(s),
        Cell::Empty => Decimal::ZERO,
    }
}

/// True when the text is an amount and nothing else: digits with optional
/// separators, sign, currency symbol or accounting parentheses.
pub fn is_amount_like(s: &str) -> bool {
    let s = s.trim();
    s.chars().any(|c| c.is_ascii_digit())
        && s.chars().all(|c| {
            c.is_ascii_digit()
                || c.is_whitespace()
                || matches!(c, '.' | ',' | '-' | '(' | ')' | '$' | '€' | '£')
        })
}

/// True when the cell holds a usable number (native or textual).
pub fn is_numeric_cell(cell: &Cell) -> bool {
    match cell {
        Cell::Number(n) => n.is_finite(),
        Cell::Text(s) => is_amount_like(s),
        Cell::Empty => false,
    }
}

/// Convert f64 to Decimal, preserving reasonable precision.
///
/// Uses string round-trip to avoid floating-point artifacts
/// (e.g., 0.0035_f64 becoming 0.00349999...).
pub fn f64_to_decimal(f: f64) -> Decimal {
    let s = format!("{f}");
    s.parse::<Decimal>()
        .unwrap_or_else(|_| Decimal::try_from(f).unwrap_or_default())
}

/// Calendar date for a spreadsheet day serial (epoch 1899-12-30).
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_days(Days::new(serial.trunc() as u64))
}

pub fn format_date(date: NaiveDate, order: DateOrder) -> String {
    let pattern = match order {
        DateOrder::DayMonthYear => "%d/%m/%Y",
        DateOrder::MonthDayYear => "%m/%d/%Y",
        DateOrder::YearMonthDay => "%Y-%m-%d",
    };
    date.format(pattern).to_string()
}

/// Formatted date for a plausible serial, or None outside `SERIAL_DATE_RANGE`.
pub fn serial_date_label(serial: f64, order: DateOrder) -> Option<String> {
    if !SERIAL_DATE_RANGE.contains(&serial) {
        return None;
    }
    excel_serial_to_date(serial).map(|d| format_date(d, order))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_thousands_dots() {
        assert_eq!(normalize_amount("1.000.000"), dec!(1000000));
    }

    #[test]
    fn test_thousands_commas() {
        assert_eq!(normalize_amount("1,234,567"), dec!(1234567));
    }

    #[test]
    fn test_european_decimal() {
        assert_eq!(normalize_amount("1.234,56"), dec!(1234.56));
    }

    #[test]
    fn test_us_decimal() {
        assert_eq!(normalize_amount("1,234.56"), dec!(1234.56));
    }

    #[test]
    fn test_parentheses_negative() {
        assert_eq!(normalize_amount("(100)"), dec!(-100));
        assert_eq!(normalize_amount("(1.234)"), dec!(-1234));
        assert_eq!(normalize_amount("$ (2.500)"), dec!(-2500));
    }

    #[test]
    fn test_parentheses_negate_every_magnitude() {
        for m in ["5", "42", "1.000", "12.345.678", "3,5"] {
            let plain = normalize_amount(m);
            assert_eq!(normalize_amount(&format!("({m})")), -plain, "magnitude {m}");
        }
    }

    #[test]
    fn test_currency_symbol_stripped() {
        assert_eq!(normalize_amount("$ 1.500"), dec!(1500));
        assert_eq!(normalize_amount("-$ 1.500"), dec!(-1500));
    }

    #[test]
    fn test_empty_and_dash_are_zero() {
        assert_eq!(normalize_amount(""), Decimal::ZERO);
        assert_eq!(normalize_amount("  -  "), Decimal::ZERO);
    }

    #[test]
    fn test_garbage_is_zero() {
        assert_eq!(normalize_amount("n/a"), Decimal::ZERO);
        assert_eq!(normalize_amount("1-2-3"), Decimal::ZERO);
    }

    #[test]
    fn test_lone_dot_reads_as_thousands() {
        assert_eq!(normalize_amount("12.50"), dec!(1250));
    }

    #[test]
    fn test_native_number_unchanged() {
        assert_eq!(normalize_cell(&Cell::Number(1234.5)), dec!(1234.5));
        assert_eq!(normalize_cell(&Cell::Number(-7.0)), dec!(-7));
        assert_eq!(normalize_cell(&Cell::Empty), Decimal::ZERO);
    }

    #[test]
    fn test_f64_to_decimal_preserves_precision() {
        assert_eq!(f64_to_decimal(0.0035), dec!(0.0035));
        assert_eq!(f64_to_decimal(68.0), dec!(68));
        assert_eq!(f64_to_decimal(f64::NAN), Decimal::ZERO);
    }

    #[test]
    fn test_amount_like() {
        assert!(is_amount_like("1.000.000"));
        assert!(is_amount_like("(500)"));
        assert!(is_amount_like("2024"));
        assert!(!is_amount_like("21,4%"));
        assert!(!is_amount_like("Ventas"));
        assert!(!is_amount_like("-"));
    }

    #[test]
    fn test_serial_to_date() {
        assert_eq!(
            excel_serial_to_date(45291.0),
            NaiveDate::from_ymd_opt(2023, 12, 31)
        );
        assert_eq!(
            excel_serial_to_date(45596.0),
            NaiveDate::from_ymd_opt(2024, 10, 31)
        );
    }

    #[test]
    fn test_serial_label_by_locale() {
        assert_eq!(
            serial_date_label(45291.0, DateOrder::DayMonthYear).as_deref(),
            Some("31/12/2023")
        );
        assert_eq!(
            serial_date_label(45291.0, DateOrder::MonthDayYear).as_deref(),
            Some("12/31/2023")
        );
        assert_eq!(
            serial_date_label(45291.0, DateOrder::YearMonthDay).as_deref(),
            Some("2023-12-31")
        );
        assert!(serial_date_label(1234.0, DateOrder::DayMonthYear).is_none());
    }
}
