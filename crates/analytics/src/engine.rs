use crate::curve::{equity_curve, max_drawdown_pct};
use crate::error::AnalyticsError;
use crate::report::{DailyPoint, MetricsResult};
use chrono::{NaiveDate, Utc};
use configuration::RiskLimits;
use core_types::structs::{PROFIT, TIMESTAMP};
use core_types::{TradeRow, TradeTable};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};

const CURRENCY_DP: u32 = 2;
const PERCENT_DP: u32 = 4;

/// A stateless calculator for deriving risk and performance metrics from a trade log.
///
/// Every call recomputes from the table it is given; nothing is cached between
/// calls, so concurrent callers only need their own copy of the table.
#[derive(Debug, Clone)]
pub struct MetricsEngine {
    limits: RiskLimits,
}

impl MetricsEngine {
    pub fn new(limits: RiskLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &RiskLimits {
        &self.limits
    }

    /// Computes the metrics of `table`, judging "today" by the current UTC date.
    pub fn compute_metrics(&self, table: &TradeTable) -> Result<MetricsResult, AnalyticsError> {
        self.compute_metrics_at(table, Utc::now().date_naive())
    }

    /// Computes the metrics of `table` as seen on the UTC calendar date `today`.
    ///
    /// # Errors
    ///
    /// * `AnalyticsError::EmptyLog` if the table has no rows.
    /// * `AnalyticsError::Schema` if the `timestamp` or `profit` column is absent.
    pub fn compute_metrics_at(
        &self,
        table: &TradeTable,
        today: NaiveDate,
    ) -> Result<MetricsResult, AnalyticsError> {
        if table.is_empty() {
            return Err(AnalyticsError::EmptyLog);
        }
        require_columns(table)?;

        let rows = table.sorted();

        // --- Profitability ---
        // Only events with a recorded profit count as trades; blank cells add nothing.
        let trades = rows.iter().filter(|r| r.has_profit()).count();
        let total_pnl = sum_profit(rows.iter().copied(), "total pnl")?;
        let pnl_pct = self.pct_of_base(total_pnl)?;

        // --- Drawdown ---
        let curve = equity_curve(&rows, self.limits.base_equity)?;
        let max_dd = max_drawdown_pct(&curve)?;

        // --- Activity ---
        let days = rows.iter().map(|r| r.date()).collect::<BTreeSet<_>>().len();

        // --- Daily lockout ---
        // A day without trades reports zero, not "no data".
        let today_pnl = sum_profit(
            rows.iter().copied().filter(|r| r.date() == today),
            "today's pnl",
        )?;
        let daily_pnl_pct_today = self.pct_of_base(today_pnl)?;
        let lockout_breached = daily_pnl_pct_today
            .is_some_and(|pct| pct <= -self.limits.daily_loss_limit_pct);

        if lockout_breached {
            tracing::warn!(
                %today,
                daily_pnl_pct = %daily_pnl_pct_today.unwrap_or_default().round_dp(PERCENT_DP),
                limit_pct = %self.limits.daily_loss_limit_pct,
                "Daily loss limit reached."
            );
        }
        tracing::debug!(rows = rows.len(), trades, days, %total_pnl, "Metrics computed.");

        Ok(MetricsResult {
            trades,
            pnl: total_pnl.round_dp(CURRENCY_DP),
            pnl_pct: pnl_pct.map(|p| p.round_dp(PERCENT_DP)),
            max_dd: max_dd.map(|d| d.round_dp(PERCENT_DP)),
            days,
            daily_pnl_pct_today: daily_pnl_pct_today.map(|p| p.round_dp(PERCENT_DP)),
            lockout_breached,
        })
    }

    /// Aggregates `table` into one point per calendar day, ascending by date.
    ///
    /// An empty table yields an empty series; days without events produce no point.
    ///
    /// Each day's `pnl` is the change in the rounded running total, so the
    /// reported days always add up to the rounded total P&L. A day's figure
    /// can therefore differ by a cent from its own rounded sum when profits
    /// carry sub-cent fractions.
    pub fn build_daily_series(&self, table: &TradeTable) -> Result<Vec<DailyPoint>, AnalyticsError> {
        if table.is_empty() {
            return Ok(Vec::new());
        }
        require_columns(table)?;

        let mut buckets: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
        for row in table.sorted() {
            let day = buckets.entry(row.date()).or_default();
            *day = day
                .checked_add(row.realized())
                .ok_or(AnalyticsError::Overflow("daily pnl"))?;
        }

        let mut cumulative = Decimal::ZERO;
        let mut reported = Decimal::ZERO;
        let mut series = Vec::with_capacity(buckets.len());
        for (date, pnl) in buckets {
            cumulative = cumulative
                .checked_add(pnl)
                .ok_or(AnalyticsError::Overflow("daily pnl"))?;
            let rounded = cumulative.round_dp(CURRENCY_DP);
            let equity = self
                .limits
                .base_equity
                .checked_add(rounded)
                .ok_or(AnalyticsError::Overflow("daily equity"))?;
            let day_pnl = rounded
                .checked_sub(reported)
                .ok_or(AnalyticsError::Overflow("daily pnl"))?;
            series.push(DailyPoint {
                date,
                pnl: day_pnl,
                equity: equity.round_dp(CURRENCY_DP),
            });
            reported = rounded;
        }

        Ok(series)
    }

    fn pct_of_base(&self, amount: Decimal) -> Result<Option<Decimal>, AnalyticsError> {
        if self.limits.base_equity.is_zero() {
            return Ok(None);
        }
        amount
            .checked_div(self.limits.base_equity)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .map(Some)
            .ok_or(AnalyticsError::Overflow("percentage of base equity"))
    }
}

fn sum_profit<'a>(
    mut rows: impl Iterator<Item = &'a TradeRow>,
    what: &'static str,
) -> Result<Decimal, AnalyticsError> {
    rows.try_fold(Decimal::ZERO, |total, row| {
        total
            .checked_add(row.realized())
            .ok_or(AnalyticsError::Overflow(what))
    })
}

fn require_columns(table: &TradeTable) -> Result<(), AnalyticsError> {
    for column in [TIMESTAMP, PROFIT] {
        if !table.has_column(column) {
            return Err(AnalyticsError::Schema(column));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone};
    use core_types::EventKind;
    use rust_decimal_macros::dec;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, day, hour, 0, 0).unwrap()
    }

    fn close(timestamp: DateTime<Utc>, profit: Decimal) -> TradeRow {
        TradeRow {
            timestamp,
            tz_offset: "+00:00".to_string(),
            event: EventKind::PositionClose,
            price: dec!(1.2),
            volume: dec!(0.5),
            profit: Some(profit),
            balance: None,
            comment: String::new(),
        }
    }

    fn engine() -> MetricsEngine {
        MetricsEngine::new(RiskLimits::default())
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
    }

    #[test]
    fn sums_profit_into_pnl_and_percentage() {
        let table = TradeTable::from_rows(vec![
            close(at(3, 9), dec!(10)),
            close(at(3, 10), dec!(-5)),
            close(at(3, 11), dec!(20)),
        ]);
        let metrics = engine().compute_metrics_at(&table, today()).unwrap();

        assert_eq!(metrics.trades, 3);
        assert_eq!(metrics.pnl, dec!(25));
        assert_eq!(metrics.pnl_pct, Some(dec!(2.5)));
        assert_eq!(metrics.days, 1);
        // Equity 1010 -> 1005 is the only dip.
        assert_eq!(metrics.max_dd, Some(dec!(-0.495)));
        assert_eq!(metrics.daily_pnl_pct_today, Some(Decimal::ZERO));
        assert!(!metrics.lockout_breached);
    }

    #[test]
    fn rows_are_sorted_before_the_curve_is_built() {
        // Out of order on disk: the win really happened first.
        let table = TradeTable::from_rows(vec![
            close(at(4, 12), dec!(-100)),
            close(at(4, 9), dec!(100)),
        ]);
        let metrics = engine().compute_metrics_at(&table, today()).unwrap();
        // 1100 -> 1000 in time order; the file order would show no drawdown at all.
        assert_eq!(metrics.max_dd, Some(dec!(-9.0909)));
    }

    #[test]
    fn logged_balance_takes_priority_over_profit() {
        let mut first = close(at(5, 9), dec!(1));
        first.balance = Some(dec!(2000));
        let mut second = close(at(5, 10), dec!(1));
        second.balance = Some(dec!(1500));
        let table = TradeTable::from_rows(vec![first, second]);

        let metrics = engine().compute_metrics_at(&table, today()).unwrap();
        assert_eq!(metrics.max_dd, Some(dec!(-25)));
        assert_eq!(metrics.pnl, dec!(2));
    }

    #[test]
    fn max_drawdown_is_never_positive() {
        let table = TradeTable::from_rows(vec![
            close(at(6, 9), dec!(50)),
            close(at(7, 9), dec!(75)),
        ]);
        let metrics = engine().compute_metrics_at(&table, today()).unwrap();
        assert_eq!(metrics.max_dd, Some(Decimal::ZERO));
        assert_eq!(metrics.days, 2);
    }

    #[test]
    fn counts_distinct_calendar_days() {
        let table = TradeTable::from_rows(vec![
            close(at(1, 0), dec!(1)),
            close(at(1, 23), dec!(1)),
            close(at(2, 12), dec!(1)),
            close(at(9, 12), dec!(1)),
        ]);
        assert_eq!(engine().compute_metrics_at(&table, today()).unwrap().days, 3);
    }

    #[test]
    fn lockout_triggers_exactly_at_the_limit() {
        let table = TradeTable::from_rows(vec![
            close(at(29, 9), dec!(-500)),
            close(at(30, 9), dec!(-15)),
            close(at(30, 14), dec!(-5)),
        ]);
        let metrics = engine().compute_metrics_at(&table, today()).unwrap();
        assert_eq!(metrics.daily_pnl_pct_today, Some(dec!(-2)));
        assert!(metrics.lockout_breached);
    }

    #[test]
    fn lockout_only_looks_at_today() {
        let table = TradeTable::from_rows(vec![
            close(at(29, 9), dec!(-500)),
            close(at(30, 9), dec!(-19.99)),
        ]);
        let metrics = engine().compute_metrics_at(&table, today()).unwrap();
        assert_eq!(metrics.daily_pnl_pct_today, Some(dec!(-1.999)));
        assert!(!metrics.lockout_breached);
    }

    #[test]
    fn zero_base_equity_leaves_percentages_undefined() {
        let engine = MetricsEngine::new(RiskLimits {
            base_equity: Decimal::ZERO,
            daily_loss_limit_pct: dec!(2),
        });
        let table = TradeTable::from_rows(vec![close(at(30, 9), dec!(-10))]);
        let metrics = engine.compute_metrics_at(&table, today()).unwrap();

        assert_eq!(metrics.pnl_pct, None);
        assert_eq!(metrics.daily_pnl_pct_today, None);
        assert_eq!(metrics.max_dd, None);
        assert!(!metrics.lockout_breached);
    }

    #[test]
    fn empty_log_is_an_error_for_metrics_but_not_for_the_series() {
        let table = TradeTable::from_rows(Vec::new());
        assert_eq!(
            engine().compute_metrics_at(&table, today()).unwrap_err(),
            AnalyticsError::EmptyLog
        );
        assert!(engine().build_daily_series(&table).unwrap().is_empty());
    }

    #[test]
    fn missing_columns_are_schema_errors() {
        let columns = vec!["timestamp".to_string(), "event".to_string()];
        let table = TradeTable::new(columns, vec![close(at(1, 1), dec!(1))]);

        assert_eq!(
            engine().compute_metrics_at(&table, today()).unwrap_err(),
            AnalyticsError::Schema("profit")
        );
        assert_eq!(
            engine().build_daily_series(&table).unwrap_err(),
            AnalyticsError::Schema("profit")
        );
    }

    #[test]
    fn daily_series_is_sparse_and_cumulative() {
        let table = TradeTable::from_rows(vec![
            close(at(10, 15), dec!(-7.5)),
            close(at(3, 9), dec!(12.25)),
            close(at(3, 18), dec!(2.75)),
        ]);
        let series = engine().build_daily_series(&table).unwrap();

        assert_eq!(
            series,
            vec![
                DailyPoint {
                    date: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
                    pnl: dec!(15),
                    equity: dec!(1015),
                },
                DailyPoint {
                    date: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
                    pnl: dec!(-7.5),
                    equity: dec!(1007.5),
                },
            ]
        );
    }

    #[test]
    fn daily_series_agrees_with_total_pnl() {
        let table = TradeTable::from_rows(vec![
            close(at(1, 9), dec!(3.10)),
            close(at(1, 10), dec!(-1.05)),
            close(at(2, 9), dec!(8.40)),
            close(at(5, 9), dec!(-0.99)),
        ]);
        let engine = engine();
        let series = engine.build_daily_series(&table).unwrap();
        let metrics = engine.compute_metrics_at(&table, today()).unwrap();

        let series_total: Decimal = series.iter().map(|p| p.pnl).sum();
        assert_eq!(series_total, metrics.pnl);
    }

    #[test]
    fn sub_cent_profits_still_add_up_across_days() {
        let table = TradeTable::from_rows(vec![
            close(at(1, 9), dec!(0.005)),
            close(at(2, 9), dec!(0.005)),
        ]);
        let engine = engine();
        let series = engine.build_daily_series(&table).unwrap();
        let metrics = engine.compute_metrics_at(&table, today()).unwrap();

        assert_eq!(metrics.pnl, dec!(0.01));
        // Half a cent rounds to even on the first day; the second day carries the cent.
        let pnls: Vec<Decimal> = series.iter().map(|p| p.pnl).collect();
        assert_eq!(pnls, vec![dec!(0.00), dec!(0.01)]);
        assert_eq!(pnls.iter().copied().sum::<Decimal>(), metrics.pnl);
        assert_eq!(series[1].equity, dec!(1000.01));
    }

    #[test]
    fn blank_profit_rows_are_not_trades() {
        let mut open = close(at(3, 8), Decimal::ZERO);
        open.event = EventKind::parse("BUY_OPEN");
        open.profit = None;
        let table = TradeTable::from_rows(vec![
            open,
            close(at(3, 9), dec!(10)),
            close(at(3, 10), dec!(-5)),
        ]);
        let metrics = engine().compute_metrics_at(&table, today()).unwrap();
        assert_eq!(metrics.trades, 2);
        assert_eq!(metrics.pnl, dec!(5));
    }

    #[test]
    fn profits_past_the_decimal_range_are_an_error() {
        let huge = Decimal::from_scientific("5e28").unwrap();
        let table = TradeTable::from_rows(vec![close(at(1, 9), huge), close(at(1, 10), huge)]);
        let engine = engine();
        assert_eq!(
            engine.compute_metrics_at(&table, today()).unwrap_err(),
            AnalyticsError::Overflow("total pnl")
        );
        assert_eq!(
            engine.build_daily_series(&table).unwrap_err(),
            AnalyticsError::Overflow("daily pnl")
        );
    }

    #[test]
    fn repeated_calls_are_identical() {
        let table = TradeTable::from_rows(vec![
            close(at(1, 9), dec!(4)),
            close(at(2, 9), dec!(-9)),
        ]);
        let engine = engine();
        assert_eq!(
            engine.compute_metrics_at(&table, today()).unwrap(),
            engine.compute_metrics_at(&table, today()).unwrap()
        );
    }

    #[test]
    fn serializes_as_plain_json_numbers() {
        let table = TradeTable::from_rows(vec![close(at(1, 9), dec!(12.5))]);
        let engine = engine();
        let metrics = engine.compute_metrics_at(&table, today()).unwrap();
        let json = serde_json::to_value(&metrics).unwrap();
        assert_eq!(json["pnl"], serde_json::json!(12.5));
        assert_eq!(json["trades"], serde_json::json!(1));
        assert_eq!(json["lockout_breached"], serde_json::json!(false));

        let series = serde_json::to_value(engine.build_daily_series(&table).unwrap()).unwrap();
        assert_eq!(series[0]["date"], serde_json::json!("2024-06-01"));
        assert_eq!(series[0]["equity"], serde_json::json!(1012.5));
    }
}
