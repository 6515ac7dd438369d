use crate::error::AnalyticsError;
use core_types::TradeRow;
use rust_decimal::Decimal;

/// Derives the equity curve of chronologically ordered rows.
///
/// The logged balance is the source of truth when every row carries one.
/// Otherwise the curve is rebuilt as `base_equity` plus the cumulative sum of
/// realized profit.
pub fn equity_curve(
    rows: &[&TradeRow],
    base_equity: Decimal,
) -> Result<Vec<Decimal>, AnalyticsError> {
    if !rows.is_empty() && rows.iter().all(|r| r.balance.is_some()) {
        return Ok(rows.iter().filter_map(|r| r.balance).collect());
    }

    if rows.iter().any(|r| r.balance.is_some()) {
        tracing::debug!("Balance column is incomplete; deriving equity from profit.");
    }

    let mut equity = base_equity;
    rows.iter()
        .map(|r| {
            equity = equity
                .checked_add(r.realized())
                .ok_or(AnalyticsError::Overflow("equity curve"))?;
            Ok(equity)
        })
        .collect()
}

/// The most negative percentage drawdown of `curve` against its running peak.
///
/// Returns `None` for an empty curve, and when the running peak is zero or
/// negative at any point, since a drawdown relative to it is meaningless.
pub fn max_drawdown_pct(curve: &[Decimal]) -> Result<Option<Decimal>, AnalyticsError> {
    let mut peak: Option<Decimal> = None;
    let mut deepest: Option<Decimal> = None;

    for &equity in curve {
        let running_max = peak.map_or(equity, |p| p.max(equity));
        peak = Some(running_max);
        if running_max <= Decimal::ZERO {
            return Ok(None);
        }

        let drawdown = equity
            .checked_sub(running_max)
            .and_then(|fall| fall.checked_div(running_max))
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .ok_or(AnalyticsError::Overflow("drawdown"))?;
        deepest = Some(deepest.map_or(drawdown, |d| d.min(drawdown)));
    }

    Ok(deepest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use core_types::EventKind;
    use rust_decimal_macros::dec;

    fn rows(profits: &[Decimal], balances: &[Option<Decimal>]) -> Vec<TradeRow> {
        let start = Utc.with_ymd_and_hms(2024, 1, 2, 8, 0, 0).unwrap();
        profits
            .iter()
            .zip(balances)
            .enumerate()
            .map(|(i, (&profit, &balance))| TradeRow {
                timestamp: start + Duration::hours(i as i64),
                tz_offset: String::new(),
                event: EventKind::PositionClose,
                price: dec!(1),
                volume: dec!(1),
                profit: Some(profit),
                balance,
                comment: String::new(),
            })
            .collect()
    }

    #[test]
    fn complete_balances_pass_through_unchanged() {
        let owned = rows(
            &[dec!(5), dec!(-3), dec!(1)],
            &[Some(dec!(990)), Some(dec!(1012.5)), Some(dec!(1001))],
        );
        let refs: Vec<&TradeRow> = owned.iter().collect();
        assert_eq!(
            equity_curve(&refs, dec!(1000)).unwrap(),
            vec![dec!(990), dec!(1012.5), dec!(1001)]
        );
    }

    #[test]
    fn partial_balances_fall_back_to_cumulative_profit() {
        let owned = rows(&[dec!(10), dec!(-5), dec!(20)], &[Some(dec!(1)), None, None]);
        let refs: Vec<&TradeRow> = owned.iter().collect();
        assert_eq!(
            equity_curve(&refs, dec!(1000)).unwrap(),
            vec![dec!(1010), dec!(1005), dec!(1025)]
        );
    }

    #[test]
    fn blank_profit_leaves_equity_unchanged() {
        let mut owned = rows(&[dec!(10), dec!(5)], &[None, None]);
        owned[1].profit = None;
        let refs: Vec<&TradeRow> = owned.iter().collect();
        assert_eq!(
            equity_curve(&refs, dec!(1000)).unwrap(),
            vec![dec!(1010), dec!(1010)]
        );
    }

    #[test]
    fn curve_past_the_decimal_range_is_an_error() {
        let huge = Decimal::from_scientific("5e28").unwrap();
        let owned = rows(&[huge, huge], &[None, None]);
        let refs: Vec<&TradeRow> = owned.iter().collect();
        assert_eq!(
            equity_curve(&refs, Decimal::ZERO),
            Err(AnalyticsError::Overflow("equity curve"))
        );
    }

    #[test]
    fn drawdown_tracks_the_deepest_fall_from_a_peak() {
        let curve = [dec!(1000), dec!(1100), dec!(990), dec!(1200), dec!(1140)];
        // 990 against the 1100 peak is -10%, deeper than 1140 against 1200 (-5%).
        assert_eq!(max_drawdown_pct(&curve), Ok(Some(dec!(-10))));
    }

    #[test]
    fn monotonic_curve_has_zero_drawdown() {
        assert_eq!(
            max_drawdown_pct(&[dec!(1), dec!(2), dec!(3)]),
            Ok(Some(Decimal::ZERO))
        );
    }

    #[test]
    fn drawdown_from_a_tiny_peak_to_a_huge_loss_overflows() {
        let curve = [dec!(0.0000001), Decimal::MIN / dec!(2)];
        assert_eq!(
            max_drawdown_pct(&curve),
            Err(AnalyticsError::Overflow("drawdown"))
        );
    }

    #[test]
    fn undefined_drawdowns() {
        assert_eq!(max_drawdown_pct(&[]), Ok(None));
        assert_eq!(max_drawdown_pct(&[dec!(0), dec!(5)]), Ok(None));
        assert_eq!(max_drawdown_pct(&[dec!(-10), dec!(-20)]), Ok(None));
    }
}
