use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The risk and performance summary of one trade log.
///
/// Currency values are rounded to 2 decimals and percentages to 4; rounding
/// happens once, when the report is built, never during accumulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsResult {
    pub trades: usize,
    #[serde(with = "rust_decimal::serde::float")]
    pub pnl: Decimal,
    /// `None` when the base equity is zero.
    #[serde(with = "rust_decimal::serde::float_option")]
    pub pnl_pct: Option<Decimal>,
    /// The deepest drawdown in percent (always <= 0). `None` if no curve could be derived.
    #[serde(with = "rust_decimal::serde::float_option")]
    pub max_dd: Option<Decimal>,
    /// Number of distinct calendar days with at least one event.
    pub days: usize,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub daily_pnl_pct_today: Option<Decimal>,
    pub lockout_breached: bool,
}

/// One point of the chart-ready daily series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPoint {
    /// Serialized as `YYYY-MM-DD`.
    pub date: NaiveDate,
    #[serde(with = "rust_decimal::serde::float")]
    pub pnl: Decimal,
    /// Base equity plus every day's P&L up to and including this one.
    #[serde(with = "rust_decimal::serde::float")]
    pub equity: Decimal,
}
