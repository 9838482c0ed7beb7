pub mod aggregate;
pub mod classify;
pub mod derive;
pub mod error;
pub mod extraction;
pub mod insights;
pub mod mapping;
pub mod model;
pub mod parsing;
pub mod ratios;

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use aggregate::aggregate;
use classify::{Classifier, SkipReason};
use error::FintakeError;
use model::{FinancialReport, RawGrid};
use parsing::header::{
    detect_headers, detect_metadata, DetectOptions, DetectionStrategy, FALLBACK_LOOKAHEAD,
    HEADER_SCAN_ROWS,
};
use parsing::values::DateOrder;
use ratios::RatioOptions;

/// Currency assumed when neither the caller nor the sheet names one.
pub const DEFAULT_CURRENCY: &str = "CLP";

/// Knobs for one parse. Unset fields take the documented defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Rows examined when looking for the header.
    pub header_scan_rows: usize,
    /// Rows below a candidate header checked by the numeric fallback.
    pub fallback_lookahead: usize,
    pub date_order: DateOrder,
    /// Explicit currency; otherwise taken from header annotations, then
    /// [`DEFAULT_CURRENCY`].
    pub currency: Option<String>,
    /// Explicit company name; otherwise taken from a labeled line above the
    /// header.
    pub company_name: Option<String>,
    /// Workbook sheet to read (0-based).
    pub sheet_index: usize,
    pub compute_ratios: bool,
    pub ratio: RatioOptions,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            header_scan_rows: HEADER_SCAN_ROWS,
            fallback_lookahead: FALLBACK_LOOKAHEAD,
            date_order: DateOrder::default(),
            currency: None,
            company_name: None,
            sheet_index: 0,
            compute_ratios: true,
            ratio: RatioOptions::default(),
        }
    }
}

impl ParseOptions {
    fn detect_options(&self) -> DetectOptions {
        DetectOptions {
            scan_rows: self.header_scan_rows,
            lookahead: self.fallback_lookahead,
            date_order: self.date_order,
        }
    }
}

/// Main API entry point: normalize a decoded sheet with the built-in mapping.
pub fn parse_grid(grid: &RawGrid, options: &ParseOptions) -> Result<FinancialReport, FintakeError> {
    let classifier = Classifier::builtin()?;
    parse_grid_with(grid, &classifier, options)
}

/// Normalize a decoded sheet into one statement per detected period.
///
/// Fails only when the sheet is blank or no period column can be found;
/// everything else degrades into unmapped lines and warnings.
pub fn parse_grid_with(
    grid: &RawGrid,
    classifier: &Classifier,
    options: &ParseOptions,
) -> Result<FinancialReport, FintakeError> {
    if grid.is_empty() {
        return Err(FintakeError::EmptyGrid);
    }

    let detection =
        detect_headers(grid, &options.detect_options()).ok_or(FintakeError::NoPeriods {
            scanned: options.header_scan_rows,
        })?;

    let metadata = detect_metadata(grid, detection.header_row);
    let currency = options
        .currency
        .clone()
        .or(metadata.currency)
        .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());
    let company_name = options.company_name.clone().or(metadata.company_name);

    let mut warnings = Vec::new();
    let mut warn_with = |message: String| {
        warn!("{message}");
        warnings.push(message);
    };

    for label in &detection.duplicate_labels {
        warn_with(format!(
            "duplicate period header '{label}' ignored; the first column is used"
        ));
    }
    if detection.strategy == DetectionStrategy::NumericFallback {
        warn_with(format!(
            "no year or date headers found; periods inferred from numeric columns under row {}: {}",
            detection.header_row + 1,
            detection.periods.labels().join(", ")
        ));
    }

    let mut aggregation = aggregate(
        grid,
        &detection,
        classifier,
        &currency,
        company_name.as_deref(),
    );

    let misplaced = aggregation
        .skipped
        .iter()
        .filter(|s| {
            matches!(
                s.reason,
                SkipReason::NumericDescription | SkipReason::RatioInDescriptionSlot
            )
        })
        .count();
    if misplaced > 0 {
        warn_with(format!(
            "{misplaced} row(s) skipped because the description looked like a number or ratio"
        ));
    }

    for o in &aggregation.overflowed {
        warn_with(format!(
            "{}: row {} '{}' not added; the total would overflow",
            o.period, o.row_number, o.description
        ));
    }

    let mut insights = Vec::new();
    for statement in &mut aggregation.statements {
        derive::fill_derived(statement);

        if statement.pnl.is_empty() {
            warn_with(format!(
                "{}: no profit and loss lines recognized",
                statement.period
            ));
        }
        if !statement.has_balance_sheet {
            warn_with(format!(
                "{}: no balance-sheet lines recognized; balance-sheet ratios omitted",
                statement.period
            ));
        }

        if options.compute_ratios {
            statement.ratios = Some(ratios::compute_ratios(statement, &options.ratio));
        }
        insights.extend(
            insights::generate_insights(statement)
                .iter()
                .map(ToString::to_string),
        );
    }

    let unmapped: usize = aggregation.statements.iter().map(|s| s.unmapped.len()).sum();
    info!(
        mapping = classifier.name(),
        periods = aggregation.statements.len(),
        rows = aggregation.raw_rows.len(),
        unmapped,
        warnings = warnings.len(),
        "sheet parsed"
    );

    Ok(FinancialReport {
        statements: aggregation.statements,
        raw_rows: aggregation.raw_rows,
        warnings,
        insights,
    })
}

/// Decode and normalize one sheet of an in-memory workbook.
pub fn parse_workbook(
    bytes: &[u8],
    classifier: &Classifier,
    options: &ParseOptions,
) -> Result<FinancialReport, FintakeError> {
    let grid = extraction::read_workbook(bytes, options.sheet_index)?;
    parse_grid_with(&grid, classifier, options)
}

/// Decode and normalize CSV bytes.
pub fn parse_csv(
    bytes: &[u8],
    classifier: &Classifier,
    options: &ParseOptions,
) -> Result<FinancialReport, FintakeError> {
    let grid = extraction::read_csv(bytes)?;
    parse_grid_with(&grid, classifier, options)
}

/// Read a spreadsheet or CSV file from disk and normalize it.
pub fn parse_file(
    path: &Path,
    classifier: &Classifier,
    options: &ParseOptions,
) -> Result<FinancialReport, FintakeError> {
    let grid = extraction::read_path(path, options.sheet_index)?;
    parse_grid_with(&grid, classifier, options)
}
