use fintake_core::model::{FinancialReport, LineField, RatioValue, Ratios, Section};
use fintake_core::ratios::Variance;
use rust_decimal::Decimal;
use std::fmt::Write;

const LABEL_WIDTH: usize = 22;
const VALUE_WIDTH: usize = 16;

fn field_label(field: LineField) -> &'static str {
    match field {
        LineField::Revenue => "Revenue",
        LineField::CostOfGoodsSold => "Cost of goods sold",
        LineField::GrossProfit => "Gross profit",
        LineField::OperatingExpenses => "Operating expenses",
        LineField::OperatingProfit => "Operating profit",
        LineField::OtherIncome => "Other income",
        LineField::OtherExpenses => "Other expenses",
        LineField::InterestExpense => "Interest expense",
        LineField::Taxes => "Taxes",
        LineField::Depreciation => "Depreciation",
        LineField::Amortization => "Amortization",
        LineField::NetIncome => "Net income",
        LineField::Ebitda => "EBITDA",
        LineField::Cash => "Cash",
        LineField::Receivables => "Receivables",
        LineField::Inventory => "Inventory",
        LineField::CurrentAssets => "Current assets",
        LineField::FixedAssets => "Fixed assets",
        LineField::TotalAssets => "Total assets",
        LineField::Payables => "Payables",
        LineField::ShortTermDebt => "Short-term debt",
        LineField::LongTermDebt => "Long-term debt",
        LineField::CurrentLiabilities => "Current liabilities",
        LineField::TotalLiabilities => "Total liabilities",
        LineField::Equity => "Equity",
    }
}

/// Whole amounts print without decimals; fractional ones keep two.
fn amount(value: Decimal) -> String {
    let rounded = value.round_dp(2).normalize();
    rounded.to_string()
}

/// One column per period, one row per populated field.
pub fn format_report(report: &FinancialReport) -> String {
    let mut out = String::new();
    let statements = report.chronological();

    if let Some(first) = statements.first() {
        let company = first.company_name.as_deref().unwrap_or("(company not detected)");
        let _ = writeln!(out, "{company} [{}]\n", first.currency);
    }

    let _ = write!(out, "{:<width$}", "", width = LABEL_WIDTH);
    for s in &statements {
        let _ = write!(out, "{:>width$}", s.period, width = VALUE_WIDTH);
    }
    out.push('\n');

    for section in [Section::IncomeStatement, Section::BalanceSheet] {
        let fields: Vec<LineField> = LineField::ALL
            .into_iter()
            .filter(|f| f.section() == section)
            .filter(|f| statements.iter().any(|s| !s.get(*f).is_zero()))
            .collect();
        if fields.is_empty() {
            continue;
        }

        let _ = writeln!(out, "\n{}", section.label());
        for field in fields {
            let _ = write!(out, "  {:<width$}", field_label(field), width = LABEL_WIDTH - 2);
            for s in &statements {
                let _ = write!(out, "{:>width$}", amount(s.get(field)), width = VALUE_WIDTH);
            }
            out.push('\n');
        }
    }

    let _ = write!(out, "\n  {:<width$}", "Unmapped lines", width = LABEL_WIDTH - 2);
    for s in &statements {
        let _ = write!(out, "{:>width$}", s.unmapped.len(), width = VALUE_WIDTH);
    }
    out.push('\n');

    if !report.warnings.is_empty() {
        out.push_str("\nWarnings:\n");
        for w in &report.warnings {
            let _ = writeln!(out, "  - {w}");
        }
    }

    out
}

fn ratio_line(out: &mut String, name: &str, value: Option<RatioValue>) {
    match value {
        Some(r) => {
            let value = r.value.round_dp(2).to_string();
            let _ = writeln!(out, "  {name:<20} {value:>10}  {}", r.status);
        }
        None => {
            let _ = writeln!(out, "  {name:<20} {:>10}  (no balance sheet)", "n/a");
        }
    }
}

fn score(value: Option<Decimal>) -> String {
    value.map(|v| v.round_dp(0).to_string()).unwrap_or_else(|| "-".into())
}

pub fn format_ratios(
    period: &str,
    ratios: Option<&Ratios>,
    previous: Option<&str>,
    variance: &[Variance],
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== {period} ===\n");

    let Some(r) = ratios else {
        out.push_str("  ratios not computed\n");
        return out;
    };

    ratio_line(&mut out, "Current ratio", r.current_ratio);
    ratio_line(&mut out, "Quick ratio", r.quick_ratio);
    ratio_line(&mut out, "Debt to equity", r.debt_to_equity);
    ratio_line(&mut out, "Interest coverage", Some(r.interest_coverage));
    ratio_line(&mut out, "Asset turnover", r.asset_turnover);
    ratio_line(&mut out, "Net margin", Some(r.net_margin));
    ratio_line(&mut out, "Return on equity", r.return_on_equity);
    let margins = [
        ("Gross margin", r.gross_margin),
        ("Operating margin", r.operating_margin),
    ];
    for (name, margin) in margins {
        let shown = margin
            .map(|m| format!("{}%", (m * Decimal::ONE_HUNDRED).round_dp(1)))
            .unwrap_or_else(|| "n/a".into());
        let _ = writeln!(out, "  {name:<20} {shown:>10}");
    }

    let h = &r.health;
    let _ = writeln!(
        out,
        "\n  Health score: {} / 100 (liquidity {}, solvency {}, efficiency {}, profitability {})",
        h.overall.round_dp(0),
        score(h.liquidity),
        score(h.solvency),
        score(h.efficiency),
        score(h.profitability),
    );

    if let Some(prev) = previous {
        let _ = writeln!(out, "\n  Change vs {prev}:");
        for v in variance {
            let pct = v
                .change_pct
                .map(|p| {
                    let sign = if p > Decimal::ZERO { "+" } else { "" };
                    format!("{sign}{p}%")
                })
                .unwrap_or_else(|| "n/a".into());
            let _ = writeln!(
                out,
                "    {:<20} {:>14} {:>10}",
                field_label(v.field),
                amount(v.change),
                pct
            );
        }
    }

    out
}
