use crate::model::{FinancialStatement, LineField};
use tracing::debug;

/// Fill totals the source did not state explicitly.
///
/// Only zero-valued totals are filled, so explicit values always win and a
/// second pass changes nothing. Costs are already stored negative, so the
/// derivations are plain sums. Returns the fields that were filled.
pub fn fill_derived(statement: &mut FinancialStatement) -> Vec<LineField> {
    let mut filled = Vec::new();
    let pnl = &mut statement.pnl;

    if pnl.gross_profit.is_zero() && !pnl.revenue.is_zero() {
        if let Some(gross) = pnl.revenue.checked_add(pnl.cost_of_goods_sold) {
            pnl.gross_profit = gross;
            filled.push(LineField::GrossProfit);
        }
    }

    if pnl.operating_profit.is_zero() && !pnl.gross_profit.is_zero() {
        if let Some(operating) = pnl.gross_profit.checked_add(pnl.operating_expenses) {
            pnl.operating_profit = operating;
            filled.push(LineField::OperatingProfit);
        }
    }

    if pnl.ebitda.is_none()
        && !pnl.operating_profit.is_zero()
        && !(pnl.depreciation.is_zero() && pnl.amortization.is_zero())
    {
        let ebitda = pnl
            .operating_profit
            .checked_sub(pnl.depreciation)
            .and_then(|v| v.checked_sub(pnl.amortization));
        if ebitda.is_some() {
            pnl.ebitda = ebitda;
            filled.push(LineField::Ebitda);
        }
    }

    if !filled.is_empty() {
        debug!(period = %statement.period, ?filled, "derived totals filled");
    }
    filled
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn statement() -> FinancialStatement {
        FinancialStatement::new("2024", "CLP")
    }

    #[test]
    fn test_gross_profit_from_components() {
        let mut s = statement();
        s.pnl.revenue = dec!(1000);
        s.pnl.cost_of_goods_sold = dec!(-600);
        fill_derived(&mut s);
        assert_eq!(s.pnl.gross_profit, dec!(400));
    }

    #[test]
    fn test_operating_profit_chains_from_derived_gross() {
        let mut s = statement();
        s.pnl.revenue = dec!(1000);
        s.pnl.cost_of_goods_sold = dec!(-600);
        s.pnl.operating_expenses = dec!(-150);
        let filled = fill_derived(&mut s);
        assert_eq!(s.pnl.operating_profit, dec!(250));
        assert_eq!(filled, vec![LineField::GrossProfit, LineField::OperatingProfit]);
    }

    #[test]
    fn test_explicit_totals_never_overwritten() {
        let mut s = statement();
        s.pnl.revenue = dec!(1000);
        s.pnl.cost_of_goods_sold = dec!(-600);
        s.pnl.gross_profit = dec!(390);
        s.pnl.operating_profit = dec!(100);
        let filled = fill_derived(&mut s);
        assert!(filled.is_empty());
        assert_eq!(s.pnl.gross_profit, dec!(390));
        assert_eq!(s.pnl.operating_profit, dec!(100));
    }

    #[test]
    fn test_idempotent() {
        let mut once = statement();
        once.pnl.revenue = dec!(800);
        once.pnl.cost_of_goods_sold = dec!(-300);
        once.pnl.operating_expenses = dec!(-200);
        once.pnl.depreciation = dec!(-50);
        fill_derived(&mut once);
        let mut twice = once.clone();
        fill_derived(&mut twice);
        assert_eq!(once, twice);
        assert_eq!(twice.pnl.ebitda, Some(dec!(350)));
    }

    #[test]
    fn test_overflowing_derivation_left_unset() {
        let mut s = statement();
        s.pnl.revenue = dec!(1000);
        s.pnl.gross_profit = -Decimal::MAX;
        s.pnl.operating_expenses = dec!(-1);
        let filled = fill_derived(&mut s);
        assert!(filled.is_empty());
        assert_eq!(s.pnl.operating_profit, Decimal::ZERO);
    }

    #[test]
    fn test_nothing_to_derive_stays_zero() {
        let mut s = statement();
        fill_derived(&mut s);
        assert_eq!(s.pnl.gross_profit, Decimal::ZERO);
        assert_eq!(s.pnl.operating_profit, Decimal::ZERO);
        assert!(s.pnl.ebitda.is_none());
    }
}
