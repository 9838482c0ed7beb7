use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::FintakeError;

/// A single decoded spreadsheet cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Number(f64),
}

impl Cell {
    /// Trimmed text content, or None for blanks and numbers.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed)
                }
            }
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Number(_) => false,
        }
    }

    /// Cell rendered as text. Whole numbers print without a trailing ".0".
    pub fn display_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.trim().to_string(),
            Cell::Number(n) => {
                if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
                    format!("{}", *n as i64)
                } else {
                    format!("{n}")
                }
            }
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(s.to_string())
        }
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        if s.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(s)
        }
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

static EMPTY_CELL: Cell = Cell::Empty;

/// The decoded contents of one sheet: rows of cells, possibly ragged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawGrid {
    rows: Vec<Vec<Cell>>,
}

impl RawGrid {
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    /// Build a grid from string literals; empty strings become blank cells.
    pub fn from_text(rows: &[&[&str]]) -> Self {
        Self::new(
            rows.iter()
                .map(|row| row.iter().map(|s| Cell::from(*s)).collect())
                .collect(),
        )
    }

    /// Cell at (row, col). Reads outside the grid yield `Cell::Empty`.
    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY_CELL)
    }

    pub fn row(&self, row: usize) -> &[Cell] {
        self.rows.get(row).map(|r| r.as_slice()).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(|r| r.iter().all(Cell::is_blank))
    }

    /// Number of columns in the widest row.
    pub fn width(&self) -> usize {
        self.rows.iter().map(|r| r.len()).max().unwrap_or(0)
    }
}

/// How a period column was recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodSource {
    Year,
    Date,
    SerialDate,
    NumericFallback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodColumn {
    pub label: String,
    pub column: usize,
    pub source: PeriodSource,
}

/// Period label -> column index, in column order. Labels are unique.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeriodMap {
    columns: Vec<PeriodColumn>,
}

impl PeriodMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a column. Returns false (and keeps the first entry) when the
    /// label is already present.
    pub fn insert(&mut self, column: PeriodColumn) -> bool {
        if self.contains(&column.label) {
            return false;
        }
        self.columns.push(column);
        true
    }

    pub fn contains(&self, label: &str) -> bool {
        self.columns.iter().any(|c| c.label == label)
    }

    pub fn column_of(&self, label: &str) -> Option<usize> {
        self.columns
            .iter()
            .find(|c| c.label == label)
            .map(|c| c.column)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PeriodColumn> {
        self.columns.iter()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.label.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Section {
    IncomeStatement,
    BalanceSheet,
}

impl Section {
    pub fn label(&self) -> &'static str {
        match self {
            Section::IncomeStatement => "Income Statement",
            Section::BalanceSheet => "Balance Sheet",
        }
    }
}

/// Canonical statement fields a source line can populate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineField {
    Revenue,
    CostOfGoodsSold,
    GrossProfit,
    OperatingExpenses,
    OperatingProfit,
    OtherIncome,
    OtherExpenses,
    InterestExpense,
    Taxes,
    Depreciation,
    Amortization,
    NetIncome,
    Ebitda,
    Cash,
    Receivables,
    Inventory,
    CurrentAssets,
    FixedAssets,
    TotalAssets,
    Payables,
    ShortTermDebt,
    LongTermDebt,
    CurrentLiabilities,
    TotalLiabilities,
    Equity,
}

impl LineField {
    pub const ALL: [LineField; 25] = [
        LineField::Revenue,
        LineField::CostOfGoodsSold,
        LineField::GrossProfit,
        LineField::OperatingExpenses,
        LineField::OperatingProfit,
        LineField::OtherIncome,
        LineField::OtherExpenses,
        LineField::InterestExpense,
        LineField::Taxes,
        LineField::Depreciation,
        LineField::Amortization,
        LineField::NetIncome,
        LineField::Ebitda,
        LineField::Cash,
        LineField::Receivables,
        LineField::Inventory,
        LineField::CurrentAssets,
        LineField::FixedAssets,
        LineField::TotalAssets,
        LineField::Payables,
        LineField::ShortTermDebt,
        LineField::LongTermDebt,
        LineField::CurrentLiabilities,
        LineField::TotalLiabilities,
        LineField::Equity,
    ];

    pub fn section(&self) -> Section {
        match self {
            LineField::Cash
            | LineField::Receivables
            | LineField::Inventory
            | LineField::CurrentAssets
            | LineField::FixedAssets
            | LineField::TotalAssets
            | LineField::Payables
            | LineField::ShortTermDebt
            | LineField::LongTermDebt
            | LineField::CurrentLiabilities
            | LineField::TotalLiabilities
            | LineField::Equity => Section::BalanceSheet,
            _ => Section::IncomeStatement,
        }
    }

    /// The snake_case key used in mapping files.
    pub fn key(&self) -> &'static str {
        match self {
            LineField::Revenue => "revenue",
            LineField::CostOfGoodsSold => "cost_of_goods_sold",
            LineField::GrossProfit => "gross_profit",
            LineField::OperatingExpenses => "operating_expenses",
            LineField::OperatingProfit => "operating_profit",
            LineField::OtherIncome => "other_income",
            LineField::OtherExpenses => "other_expenses",
            LineField::InterestExpense => "interest_expense",
            LineField::Taxes => "taxes",
            LineField::Depreciation => "depreciation",
            LineField::Amortization => "amortization",
            LineField::NetIncome => "net_income",
            LineField::Ebitda => "ebitda",
            LineField::Cash => "cash",
            LineField::Receivables => "receivables",
            LineField::Inventory => "inventory",
            LineField::CurrentAssets => "current_assets",
            LineField::FixedAssets => "fixed_assets",
            LineField::TotalAssets => "total_assets",
            LineField::Payables => "payables",
            LineField::ShortTermDebt => "short_term_debt",
            LineField::LongTermDebt => "long_term_debt",
            LineField::CurrentLiabilities => "current_liabilities",
            LineField::TotalLiabilities => "total_liabilities",
            LineField::Equity => "equity",
        }
    }
}

impl fmt::Display for LineField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitAndLoss {
    pub revenue: Decimal,
    pub cost_of_goods_sold: Decimal,
    pub gross_profit: Decimal,
    pub operating_expenses: Decimal,
    pub operating_profit: Decimal,
    pub other_income: Decimal,
    pub other_expenses: Decimal,
    pub interest_expense: Decimal,
    pub taxes: Decimal,
    pub depreciation: Decimal,
    pub amortization: Decimal,
    pub net_income: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ebitda: Option<Decimal>,
}

impl ProfitAndLoss {
    /// True when every field is zero (or absent).
    pub fn is_empty(&self) -> bool {
        self == &ProfitAndLoss::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSheet {
    pub cash: Decimal,
    pub receivables: Decimal,
    pub inventory: Decimal,
    pub current_assets: Decimal,
    pub fixed_assets: Decimal,
    pub total_assets: Decimal,
    pub payables: Decimal,
    pub short_term_debt: Decimal,
    pub long_term_debt: Decimal,
    pub current_liabilities: Decimal,
    pub total_liabilities: Decimal,
    pub equity: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RatioStatus {
    Good,
    Warning,
    Critical,
}

impl RatioStatus {
    /// Points this tier contributes to a category score.
    pub fn points(&self) -> Decimal {
        match self {
            RatioStatus::Good => Decimal::ONE_HUNDRED,
            RatioStatus::Warning => Decimal::new(50, 0),
            RatioStatus::Critical => Decimal::ZERO,
        }
    }
}

impl fmt::Display for RatioStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RatioStatus::Good => write!(f, "Good"),
            RatioStatus::Warning => write!(f, "Warning"),
            RatioStatus::Critical => write!(f, "Critical"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatioValue {
    pub value: Decimal,
    pub status: RatioStatus,
}

/// Weighted 0-100 health score. Category scores are None when no ratio in
/// that category could be computed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthScore {
    pub overall: Decimal,
    pub liquidity: Option<Decimal>,
    pub solvency: Option<Decimal>,
    pub efficiency: Option<Decimal>,
    pub profitability: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ratios {
    pub current_ratio: Option<RatioValue>,
    pub quick_ratio: Option<RatioValue>,
    pub debt_to_equity: Option<RatioValue>,
    pub interest_coverage: RatioValue,
    pub asset_turnover: Option<RatioValue>,
    pub net_margin: RatioValue,
    pub return_on_equity: Option<RatioValue>,
    pub gross_margin: Option<Decimal>,
    pub operating_margin: Option<Decimal>,
    pub health: HealthScore,
}

/// A source line the classifier could not place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnmappedLine {
    pub description: String,
    pub value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialStatement {
    pub period: String,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    pub has_balance_sheet: bool,
    pub pnl: ProfitAndLoss,
    pub balance: BalanceSheet,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ratios: Option<Ratios>,
    pub unmapped: Vec<UnmappedLine>,
}

impl FinancialStatement {
    /// A zero-initialized statement for one period.
    pub fn new(period: impl Into<String>, currency: impl Into<String>) -> Self {
        Self {
            period: period.into(),
            currency: currency.into(),
            company_name: None,
            has_balance_sheet: false,
            pnl: ProfitAndLoss::default(),
            balance: BalanceSheet::default(),
            ratios: None,
            unmapped: Vec::new(),
        }
    }

    pub fn get(&self, field: LineField) -> Decimal {
        match field {
            LineField::Revenue => self.pnl.revenue,
            LineField::CostOfGoodsSold => self.pnl.cost_of_goods_sold,
            LineField::GrossProfit => self.pnl.gross_profit,
            LineField::OperatingExpenses => self.pnl.operating_expenses,
            LineField::OperatingProfit => self.pnl.operating_profit,
            LineField::OtherIncome => self.pnl.other_income,
            LineField::OtherExpenses => self.pnl.other_expenses,
            LineField::InterestExpense => self.pnl.interest_expense,
            LineField::Taxes => self.pnl.taxes,
            LineField::Depreciation => self.pnl.depreciation,
            LineField::Amortization => self.pnl.amortization,
            LineField::NetIncome => self.pnl.net_income,
            LineField::Ebitda => self.pnl.ebitda.unwrap_or_default(),
            LineField::Cash => self.balance.cash,
            LineField::Receivables => self.balance.receivables,
            LineField::Inventory => self.balance.inventory,
            LineField::CurrentAssets => self.balance.current_assets,
            LineField::FixedAssets => self.balance.fixed_assets,
            LineField::TotalAssets => self.balance.total_assets,
            LineField::Payables => self.balance.payables,
            LineField::ShortTermDebt => self.balance.short_term_debt,
            LineField::LongTermDebt => self.balance.long_term_debt,
            LineField::CurrentLiabilities => self.balance.current_liabilities,
            LineField::TotalLiabilities => self.balance.total_liabilities,
            LineField::Equity => self.balance.equity,
        }
    }

    /// Mutable slot for a field. Writing EBITDA makes it present.
    pub fn slot_mut(&mut self, field: LineField) -> &mut Decimal {
        match field {
            LineField::Revenue => &mut self.pnl.revenue,
            LineField::CostOfGoodsSold => &mut self.pnl.cost_of_goods_sold,
            LineField::GrossProfit => &mut self.pnl.gross_profit,
            LineField::OperatingExpenses => &mut self.pnl.operating_expenses,
            LineField::OperatingProfit => &mut self.pnl.operating_profit,
            LineField::OtherIncome => &mut self.pnl.other_income,
            LineField::OtherExpenses => &mut self.pnl.other_expenses,
            LineField::InterestExpense => &mut self.pnl.interest_expense,
            LineField::Taxes => &mut self.pnl.taxes,
            LineField::Depreciation => &mut self.pnl.depreciation,
            LineField::Amortization => &mut self.pnl.amortization,
            LineField::NetIncome => &mut self.pnl.net_income,
            LineField::Ebitda => self.pnl.ebitda.get_or_insert(Decimal::ZERO),
            LineField::Cash => &mut self.balance.cash,
            LineField::Receivables => &mut self.balance.receivables,
            LineField::Inventory => &mut self.balance.inventory,
            LineField::CurrentAssets => &mut self.balance.current_assets,
            LineField::FixedAssets => &mut self.balance.fixed_assets,
            LineField::TotalAssets => &mut self.balance.total_assets,
            LineField::Payables => &mut self.balance.payables,
            LineField::ShortTermDebt => &mut self.balance.short_term_debt,
            LineField::LongTermDebt => &mut self.balance.long_term_debt,
            LineField::CurrentLiabilities => &mut self.balance.current_liabilities,
            LineField::TotalLiabilities => &mut self.balance.total_liabilities,
            LineField::Equity => &mut self.balance.equity,
        }
    }
}

/// One aggregable source row, kept for audit display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRow {
    /// 1-based row number in the source sheet.
    pub row_number: usize,
    pub description: String,
    pub category: String,
    pub values: BTreeMap<String, Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialReport {
    pub statements: Vec<FinancialStatement>,
    pub raw_rows: Vec<RawRow>,
    pub warnings: Vec<String>,
    pub insights: Vec<String>,
}

impl FinancialReport {
    pub fn statement(&self, period: &str) -> Option<&FinancialStatement> {
        self.statements.iter().find(|s| s.period == period)
    }

    /// Statements ordered oldest first. Labels without a recognizable date
    /// keep their column order after the dated ones.
    pub fn chronological(&self) -> Vec<&FinancialStatement> {
        let mut ordered: Vec<(usize, &FinancialStatement)> =
            self.statements.iter().enumerate().collect();
        ordered.sort_by_key(|(idx, s)| {
            let key = crate::parsing::header::period_date(&s.period);
            (key.is_none(), key, *idx)
        });
        ordered.into_iter().map(|(_, s)| s).collect()
    }

    /// The statement immediately preceding `period` chronologically.
    pub fn previous_of(&self, period: &str) -> Option<&FinancialStatement> {
        let ordered = self.chronological();
        let pos = ordered.iter().position(|s| s.period == period)?;
        pos.checked_sub(1).map(|p| ordered[p])
    }
}

/// The serialized outcome of one parse, success or failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsingResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<FinancialReport>,
    pub errors: Vec<String>,
}

impl From<Result<FinancialReport, FintakeError>> for ParsingResult {
    fn from(result: Result<FinancialReport, FintakeError>) -> Self {
        match result {
            Ok(report) => ParsingResult {
                success: true,
                report: Some(report),
                errors: Vec::new(),
            },
            Err(e) => ParsingResult {
                success: false,
                report: None,
                errors: vec![e.to_string()],
            },
        }
    }
}
