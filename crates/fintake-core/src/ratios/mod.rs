use crate::model::{FinancialStatement, HealthScore, LineField, RatioStatus, RatioValue, Ratios};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

const LIQUIDITY_WEIGHT: i64 = 20;
const SOLVENCY_WEIGHT: i64 = 30;
const EFFICIENCY_WEIGHT: i64 = 20;
const PROFITABILITY_WEIGHT: i64 = 30;

/// Explicit stand-ins for missing data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatioOptions {
    /// Used in place of a zero denominator.
    pub absent_denominator: Decimal,
    /// Interest coverage reported when there is no interest expense.
    pub coverage_ceiling: Decimal,
}

impl Default for RatioOptions {
    fn default() -> Self {
        Self {
            absent_denominator: Decimal::ONE,
            coverage_ceiling: Decimal::TEN,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Direction {
    HigherIsBetter,
    LowerIsBetter,
}

/// Status thresholds for one ratio, as (mantissa, scale) pairs.
struct Band {
    good: (i64, u32),
    warning: (i64, u32),
    direction: Direction,
}

impl Band {
    fn status(&self, value: Decimal) -> RatioStatus {
        let good = Decimal::new(self.good.0, self.good.1);
        let warning = Decimal::new(self.warning.0, self.warning.1);
        match self.direction {
            Direction::HigherIsBetter if value >= good => RatioStatus::Good,
            Direction::HigherIsBetter if value >= warning => RatioStatus::Warning,
            Direction::LowerIsBetter if value <= good => RatioStatus::Good,
            Direction::LowerIsBetter if value <= warning => RatioStatus::Warning,
            _ => RatioStatus::Critical,
        }
    }

    fn rate(&self, value: Decimal) -> RatioValue {
        RatioValue {
            value,
            status: self.status(value),
        }
    }
}

const CURRENT_RATIO: Band = Band {
    good: (15, 1),
    warning: (10, 1),
    direction: Direction::HigherIsBetter,
};
const QUICK_RATIO: Band = Band {
    good: (10, 1),
    warning: (7, 1),
    direction: Direction::HigherIsBetter,
};
const DEBT_TO_EQUITY: Band = Band {
    good: (10, 1),
    warning: (20, 1),
    direction: Direction::LowerIsBetter,
};
const INTEREST_COVERAGE: Band = Band {
    good: (30, 1),
    warning: (15, 1),
    direction: Direction::HigherIsBetter,
};
const ASSET_TURNOVER: Band = Band {
    good: (10, 1),
    warning: (5, 1),
    direction: Direction::HigherIsBetter,
};
const NET_MARGIN: Band = Band {
    good: (10, 2),
    warning: (3, 2),
    direction: Direction::HigherIsBetter,
};
const RETURN_ON_EQUITY: Band = Band {
    good: (15, 2),
    warning: (5, 2),
    direction: Direction::HigherIsBetter,
};

fn ratio(numerator: Decimal, denominator: Decimal, options: &RatioOptions) -> Decimal {
    let denominator = if denominator.is_zero() {
        options.absent_denominator
    } else {
        denominator
    };
    numerator
        .checked_div(denominator)
        .unwrap_or_default()
        .round_dp(4)
}

/// Compute liquidity, solvency, efficiency and profitability ratios.
///
/// Ratios that need balance-sheet data are None when the statement has no
/// balance-sheet lines at all.
pub fn compute_ratios(s: &FinancialStatement, options: &RatioOptions) -> Ratios {
    let pnl = &s.pnl;
    let bs = &s.balance;
    let has_bs = s.has_balance_sheet;

    let current_ratio = has_bs
        .then(|| CURRENT_RATIO.rate(ratio(bs.current_assets, bs.current_liabilities, options)));
    let quick_ratio = has_bs
        .then(|| bs.current_assets.checked_sub(bs.inventory))
        .flatten()
        .map(|quick_assets| {
            QUICK_RATIO.rate(ratio(quick_assets, bs.current_liabilities, options))
        });

    let debt_to_equity = has_bs.then(|| {
        if bs.equity < Decimal::ZERO {
            // Negative equity
            RatioValue {
                value: ratio(bs.total_liabilities, bs.equity, options),
                status: RatioStatus::Critical,
            }
        } else {
            DEBT_TO_EQUITY.rate(ratio(bs.total_liabilities, bs.equity, options))
        }
    });

    let coverage = if pnl.interest_expense.is_zero() {
        options.coverage_ceiling
    } else {
        ratio(pnl.operating_profit, pnl.interest_expense.abs(), options)
    };
    let interest_coverage = INTEREST_COVERAGE.rate(coverage);

    let asset_turnover =
        has_bs.then(|| ASSET_TURNOVER.rate(ratio(pnl.revenue, bs.total_assets, options)));

    let net_margin = NET_MARGIN.rate(ratio(pnl.net_income, pnl.revenue, options));
    let return_on_equity =
        has_bs.then(|| RETURN_ON_EQUITY.rate(ratio(pnl.net_income, bs.equity, options)));

    let margin = |value: Decimal| {
        (!pnl.revenue.is_zero()).then(|| ratio(value, pnl.revenue, options))
    };
    let gross_margin = margin(pnl.gross_profit);
    let operating_margin = margin(pnl.operating_profit);

    let mut ratios = Ratios {
        current_ratio,
        quick_ratio,
        debt_to_equity,
        interest_coverage,
        asset_turnover,
        net_margin,
        return_on_equity,
        gross_margin,
        operating_margin,
        health: HealthScore::default(),
    };
    ratios.health = health_score(&ratios);
    ratios
}

fn category_score(ratios: &[Option<RatioValue>]) -> Option<Decimal> {
    let points: Vec<Decimal> = ratios.iter().flatten().map(|r| r.status.points()).collect();
    if points.is_empty() {
        return None;
    }
    let total: Decimal = points.iter().sum();
    Some((total / Decimal::from(points.len())).round_dp(2))
}

/// Blend category scores by weight. Categories without any ratio are left
/// out and the remaining weights renormalized.
pub fn health_score(r: &Ratios) -> HealthScore {
    let categories = [
        (LIQUIDITY_WEIGHT, category_score(&[r.current_ratio, r.quick_ratio])),
        (
            SOLVENCY_WEIGHT,
            category_score(&[r.debt_to_equity, Some(r.interest_coverage)]),
        ),
        (EFFICIENCY_WEIGHT, category_score(&[r.asset_turnover])),
        (
            PROFITABILITY_WEIGHT,
            category_score(&[Some(r.net_margin), r.return_on_equity]),
        ),
    ];

    let mut weighted = Decimal::ZERO;
    let mut weight_sum = Decimal::ZERO;
    for (weight, score) in &categories {
        if let Some(score) = score {
            weighted += score * Decimal::from(*weight);
            weight_sum += Decimal::from(*weight);
        }
    }
    let overall = weighted
        .checked_div(weight_sum)
        .unwrap_or_default()
        .round_dp(2);

    HealthScore {
        overall,
        liquidity: categories[0].1,
        solvency: categories[1].1,
        efficiency: categories[2].1,
        profitability: categories[3].1,
    }
}

/// Period-over-period change for one headline figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variance {
    pub field: LineField,
    pub current: Decimal,
    pub previous: Decimal,
    pub change: Decimal,
    /// Percentage change against the previous magnitude; None when the
    /// previous value is zero.
    pub change_pct: Option<Decimal>,
}

const VARIANCE_FIELDS: [LineField; 6] = [
    LineField::Revenue,
    LineField::GrossProfit,
    LineField::OperatingProfit,
    LineField::NetIncome,
    LineField::TotalAssets,
    LineField::Equity,
];

/// Compare headline figures against the preceding period.
pub fn variance(current: &FinancialStatement, previous: &FinancialStatement) -> Vec<Variance> {
    VARIANCE_FIELDS
        .iter()
        .filter_map(|&field| {
            let cur = current.get(field);
            let prev = previous.get(field);
            let change = cur.checked_sub(prev)?;
            let change_pct = change
                .checked_div(prev.abs())
                .and_then(|r| r.checked_mul(Decimal::ONE_HUNDRED))
                .map(|pct| pct.round_dp(2));
            Some(Variance {
                field,
                current: cur,
                previous: prev,
                change,
                change_pct,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn healthy() -> FinancialStatement {
        let mut s = FinancialStatement::new("2024", "CLP");
        s.pnl.revenue = dec!(1000);
        s.pnl.gross_profit = dec!(400);
        s.pnl.operating_profit = dec!(200);
        s.pnl.interest_expense = dec!(-20);
        s.pnl.net_income = dec!(150);
        s.balance.current_assets = dec!(600);
        s.balance.inventory = dec!(100);
        s.balance.current_liabilities = dec!(300);
        s.balance.total_assets = dec!(900);
        s.balance.total_liabilities = dec!(400);
        s.balance.equity = dec!(500);
        s.has_balance_sheet = true;
        s
    }

    #[test]
    fn test_liquidity_ratios() {
        let r = compute_ratios(&healthy(), &RatioOptions::default());
        let current = r.current_ratio.unwrap();
        assert_eq!(current.value, dec!(2));
        assert_eq!(current.status, RatioStatus::Good);
        let quick = r.quick_ratio.unwrap();
        assert_eq!(quick.value, dec!(1.6667));
        assert_eq!(quick.status, RatioStatus::Good);
    }

    #[test]
    fn test_solvency_and_profitability() {
        let r = compute_ratios(&healthy(), &RatioOptions::default());
        assert_eq!(r.debt_to_equity.unwrap().value, dec!(0.8));
        assert_eq!(r.interest_coverage.value, dec!(10));
        assert_eq!(r.net_margin.value, dec!(0.15));
        assert_eq!(r.return_on_equity.unwrap().value, dec!(0.3));
        assert_eq!(r.gross_margin, Some(dec!(0.4)));
        assert_eq!(r.operating_margin, Some(dec!(0.2)));
        assert_eq!(r.asset_turnover.unwrap().status, RatioStatus::Good);
    }

    #[test]
    fn test_all_good_scores_hundred() {
        let r = compute_ratios(&healthy(), &RatioOptions::default());
        assert_eq!(r.health.overall, dec!(100));
    }

    #[test]
    fn test_zero_interest_uses_ceiling() {
        let mut s = healthy();
        s.pnl.interest_expense = Decimal::ZERO;
        let r = compute_ratios(&s, &RatioOptions::default());
        assert_eq!(r.interest_coverage.value, dec!(10));
        assert_eq!(r.interest_coverage.status, RatioStatus::Good);
    }

    #[test]
    fn test_missing_balance_sheet_suppresses_ratios() {
        let mut s = FinancialStatement::new("2024", "CLP");
        s.pnl.revenue = dec!(1000);
        s.pnl.net_income = dec!(-50);
        let r = compute_ratios(&s, &RatioOptions::default());
        assert!(r.current_ratio.is_none());
        assert!(r.debt_to_equity.is_none());
        assert!(r.asset_turnover.is_none());
        assert!(r.return_on_equity.is_none());
        assert!(r.health.liquidity.is_none());
        assert!(r.health.efficiency.is_none());
        // solvency: coverage ceiling (Good); profitability: net loss (Critical)
        assert_eq!(r.health.solvency, Some(dec!(100)));
        assert_eq!(r.health.profitability, Some(dec!(0)));
        assert_eq!(r.health.overall, dec!(50));
    }

    #[test]
    fn test_zero_denominator_uses_sentinel() {
        let mut s = FinancialStatement::new("2024", "CLP");
        s.pnl.net_income = dec!(5);
        let r = compute_ratios(&s, &RatioOptions::default());
        assert_eq!(r.net_margin.value, dec!(5));
        assert!(r.gross_margin.is_none());
    }

    #[test]
    fn test_negative_equity_is_critical() {
        let mut s = healthy();
        s.balance.equity = dec!(-100);
        let r = compute_ratios(&s, &RatioOptions::default());
        assert_eq!(r.debt_to_equity.unwrap().status, RatioStatus::Critical);
    }

    #[test]
    fn test_variance_against_previous() {
        let mut prev = healthy();
        prev.period = "2023".into();
        prev.pnl.revenue = dec!(800);
        prev.pnl.net_income = Decimal::ZERO;
        let v = variance(&healthy(), &prev);
        let revenue = v.iter().find(|v| v.field == LineField::Revenue).unwrap();
        assert_eq!(revenue.change, dec!(200));
        assert_eq!(revenue.change_pct, Some(dec!(25)));
        let net = v.iter().find(|v| v.field == LineField::NetIncome).unwrap();
        assert!(net.change_pct.is_none());
    }

    #[test]
    fn test_overflowing_quick_assets_omit_quick_ratio() {
        let mut s = healthy();
        s.balance.current_assets = Decimal::MAX;
        s.balance.inventory = -Decimal::MAX;
        let r = compute_ratios(&s, &RatioOptions::default());
        assert!(r.quick_ratio.is_none());
        assert!(r.current_ratio.is_some());
    }

    #[test]
    fn test_overflowing_change_left_out_of_variance() {
        let mut current = healthy();
        current.pnl.revenue = Decimal::MAX;
        let mut prev = healthy();
        prev.pnl.revenue = -Decimal::MAX;
        let v = variance(&current, &prev);
        assert_eq!(v.len(), VARIANCE_FIELDS.len() - 1);
        assert!(v.iter().all(|v| v.field != LineField::Revenue));
    }
}
