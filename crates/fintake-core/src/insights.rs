use crate::model::FinancialStatement;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InsightKind {
    HighFixedCosts,
    LowGrossMargin,
    NetLoss,
    LiquidityPressure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Medium,
    High,
}

/// An improvement hint for one period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insight {
    pub period: String,
    pub kind: InsightKind,
    pub severity: Severity,
    pub message: String,
}

impl fmt::Display for Insight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.period, self.message)
    }
}

/// `part` as a percentage of `whole`, or None when it cannot be represented.
fn percent(part: Decimal, whole: Decimal) -> Option<Decimal> {
    part.checked_div(whole)?
        .checked_mul(Decimal::ONE_HUNDRED)
        .map(|p| p.round_dp(1))
}

/// Hints derived from one statement's headline figures.
pub fn generate_insights(s: &FinancialStatement) -> Vec<Insight> {
    let pnl = &s.pnl;
    let mut out = Vec::new();
    let mut push = |kind, severity, message: String| {
        out.push(Insight {
            period: s.period.clone(),
            kind,
            severity,
            message,
        })
    };

    if pnl.revenue > Decimal::ZERO {
        let opex = pnl.operating_expenses.abs();
        // opex * 2 > revenue
        if opex > pnl.revenue - opex {
            let share = match percent(opex, pnl.revenue) {
                Some(p) => format!("{p}%"),
                None => "a multiple".to_string(),
            };
            push(
                InsightKind::HighFixedCosts,
                Severity::High,
                format!(
                    "operating expenses ({opex}) exceed 50% of revenue ({share}); \
                     review fixed commitments"
                ),
            );
        }

        let margin = percent(pnl.gross_profit, pnl.revenue);
        if let Some(margin) = margin.filter(|m| *m < Decimal::new(30, 0)) {
            push(
                InsightKind::LowGrossMargin,
                Severity::Medium,
                format!("gross margin is {margin}%; review cost of sales or pricing"),
            );
        }
    }

    if pnl.net_income < Decimal::ZERO {
        push(
            InsightKind::NetLoss,
            Severity::High,
            format!("net loss of {}", pnl.net_income.abs()),
        );
    }

    let bs = &s.balance;
    if s.has_balance_sheet
        && bs.current_liabilities > Decimal::ZERO
        && bs.current_assets < bs.current_liabilities
    {
        push(
            InsightKind::LiquidityPressure,
            Severity::High,
            format!(
                "current assets ({}) do not cover current liabilities ({})",
                bs.current_assets, bs.current_liabilities
            ),
        );
    }

    out
}
