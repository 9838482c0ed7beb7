use crate::classify::{skip_reason, Classification, Classifier, SkipReason};
use crate::mapping::schema::WriteMode;
use crate::model::{FinancialStatement, RawGrid, RawRow, Section, UnmappedLine};
use crate::parsing::header::HeaderDetection;
use crate::parsing::values::normalize_cell;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tracing::debug;

const UNMAPPED_CATEGORY: &str = "General";

/// Accumulates classified values into one period's statement.
#[derive(Debug, Clone)]
pub struct StatementBuilder {
    statement: FinancialStatement,
}

impl StatementBuilder {
    pub fn new(period: &str, currency: &str, company_name: Option<&str>) -> Self {
        let mut statement = FinancialStatement::new(period, currency);
        statement.company_name = company_name.map(str::to_string);
        Self { statement }
    }

    /// Route one row value. Unclassified non-zero values go to `unmapped`;
    /// zero values never touch a field.
    ///
    /// Returns false when accumulating would overflow. The field then keeps
    /// its previous value.
    pub fn apply(
        &mut self,
        classification: Option<Classification>,
        description: &str,
        value: Decimal,
    ) -> bool {
        if value.is_zero() {
            return true;
        }

        let Some(classification) = classification else {
            self.statement.unmapped.push(UnmappedLine {
                description: description.to_string(),
                value,
            });
            return true;
        };

        let signed = classification.signed(value);
        let slot = self.statement.slot_mut(classification.field);
        match classification.mode {
            WriteMode::Accumulate => match slot.checked_add(signed) {
                Some(sum) => *slot = sum,
                None => return false,
            },
            WriteMode::Overwrite => *slot = signed,
        }

        if classification.field.section() == Section::BalanceSheet {
            self.statement.has_balance_sheet = true;
        }
        true
    }

    pub fn statement(&self) -> &FinancialStatement {
        &self.statement
    }

    pub fn finish(self) -> FinancialStatement {
        self.statement
    }
}

/// A data row kept out of classification.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRow {
    pub row_number: usize,
    pub description: String,
    pub reason: SkipReason,
}

/// A value left out of its field because the running total would overflow.
#[derive(Debug, Clone, PartialEq)]
pub struct OverflowedValue {
    pub row_number: usize,
    pub period: String,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct Aggregation {
    /// One statement per period, in period-map order.
    pub statements: Vec<FinancialStatement>,
    pub raw_rows: Vec<RawRow>,
    pub skipped: Vec<SkippedRow>,
    pub overflowed: Vec<OverflowedValue>,
}

/// Walk every row below the header and fold it into the period statements.
pub fn aggregate(
    grid: &RawGrid,
    detection: &HeaderDetection,
    classifier: &Classifier,
    currency: &str,
    company_name: Option<&str>,
) -> Aggregation {
    let mut builders: Vec<StatementBuilder> = detection
        .periods
        .iter()
        .map(|p| StatementBuilder::new(&p.label, currency, company_name))
        .collect();
    let mut raw_rows = Vec::new();
    let mut skipped = Vec::new();
    let mut overflowed = Vec::new();

    for row in detection.header_row + 1..grid.len() {
        let row_number = row + 1;
        let (description, from_fallback) = row_description(grid, row);

        if let Some(reason) = skip_reason(&description, from_fallback) {
            if reason != SkipReason::Empty {
                debug!(row_number, %description, %reason, "row skipped");
            }
            skipped.push(SkippedRow {
                row_number,
                description,
                reason,
            });
            continue;
        }

        // Every period shares the description, so one lookup serves the row.
        let classification = classifier.classify(&description);
        match classification {
            Some(c) => debug!(row_number, %description, field = %c.field, "row classified"),
            None => debug!(row_number, %description, "row unmapped"),
        }

        let mut values = BTreeMap::new();
        let mut any_non_zero = false;
        for (period, builder) in detection.periods.iter().zip(builders.iter_mut()) {
            let value = normalize_cell(grid.cell(row, period.column));
            any_non_zero |= !value.is_zero();
            if !builder.apply(classification, &description, value) {
                overflowed.push(OverflowedValue {
                    row_number,
                    period: period.label.clone(),
                    description: description.clone(),
                });
            }
            values.insert(period.label.clone(), value);
        }

        if any_non_zero {
            let category = classification
                .map(|c| c.field.section().label())
                .unwrap_or(UNMAPPED_CATEGORY);
            raw_rows.push(RawRow {
                row_number,
                description,
                category: category.to_string(),
                values,
            });
        }
    }

    Aggregation {
        statements: builders.into_iter().map(StatementBuilder::finish).collect(),
        raw_rows,
        skipped,
        overflowed,
    }
}

/// Row label: column 0, or column 1 when column 0 is blank.
/// The flag reports whether the fallback column was used.
fn row_description(grid: &RawGrid, row: usize) -> (String, bool) {
    let first = grid.cell(row, 0);
    if first.is_blank() {
        (grid.cell(row, 1).display_text(), true)
    } else {
        (first.display_text(), false)
    }
}
