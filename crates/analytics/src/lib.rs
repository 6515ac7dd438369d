//! # Analytics
//!
//! Turns a trade-event log into the numbers the dashboard and the trading
//! switch rely on: P&L, drawdown, activity and the daily-loss lockout.
//!
//! ## Architectural Principles
//!
//! - **Pure logic:** depends only on `core-types` and the `RiskLimits` from
//!   `configuration`. It never reads files or the environment.
//! - **Stateless calculation:** the `MetricsEngine` recomputes everything from
//!   the table it is handed, on every call.
//!
//! ## Public API
//!
//! - `MetricsEngine`: computes a `MetricsResult` and the daily `DailyPoint` series.
//! - `equity_curve` / `max_drawdown_pct`: the curve math, exposed for reuse.
//! - `AnalyticsError`: the specific error types that can be returned from this crate.

pub mod curve;
pub mod engine;
pub mod error;
pub mod report;

pub use curve::{equity_curve, max_drawdown_pct};
pub use engine::MetricsEngine;
pub use error::AnalyticsError;
pub use report::{DailyPoint, MetricsResult};
