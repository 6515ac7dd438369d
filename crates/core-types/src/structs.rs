use crate::enums::EventKind;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const TIMESTAMP: &str = "timestamp";
pub const TZ_OFFSET: &str = "tz_offset";
pub const EVENT: &str = "event";
pub const PRICE: &str = "price";
pub const VOLUME: &str = "volume";
pub const PROFIT: &str = "profit";
pub const COMMENT: &str = "comment";
pub const BALANCE: &str = "balance";

/// The columns every trade log must carry, in the order the trading process writes them.
pub const REQUIRED_COLUMNS: [&str; 7] = [TIMESTAMP, TZ_OFFSET, EVENT, PRICE, VOLUME, PROFIT, COMMENT];

/// A single line of the trade-event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRow {
    /// Event time, normalized to UTC.
    pub timestamp: DateTime<Utc>,
    /// The offset column as the trading process wrote it.
    pub tz_offset: String,
    pub event: EventKind,
    pub price: Decimal,
    pub volume: Decimal,
    /// Realized P&L of the event, `None` when the cell was left blank.
    pub profit: Option<Decimal>,
    /// Running account balance, when the log provides one.
    pub balance: Option<Decimal>,
    pub comment: String,
}

impl TradeRow {
    /// The UTC calendar date of the event.
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }

    /// Realized P&L, counting a blank cell as zero.
    pub fn realized(&self) -> Decimal {
        self.profit.unwrap_or_default()
    }

    /// Whether the log recorded a profit for this event.
    pub fn has_profit(&self) -> bool {
        self.profit.is_some()
    }
}

/// A loaded trade log: its rows plus the columns its header declared.
///
/// Rows keep the order they were read in. The table is never mutated after
/// construction; consumers that need chronological order call [`TradeTable::sorted`].
#[derive(Debug, Clone, PartialEq)]
pub struct TradeTable {
    columns: Vec<String>,
    rows: Vec<TradeRow>,
}

impl TradeTable {
    pub fn new(columns: Vec<String>, rows: Vec<TradeRow>) -> Self {
        Self { columns, rows }
    }

    /// Builds a table from in-memory rows. All required columns are declared, and
    /// `balance` is declared when at least one row carries a value for it.
    pub fn from_rows(rows: Vec<TradeRow>) -> Self {
        let mut columns: Vec<String> = REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect();
        if rows.iter().any(|r| r.balance.is_some()) {
            columns.push(BALANCE.to_string());
        }
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn rows(&self) -> &[TradeRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The rows ordered by timestamp. The sort is stable, so rows sharing a
    /// timestamp keep their original relative order.
    pub fn sorted(&self) -> Vec<&TradeRow> {
        let mut sorted: Vec<&TradeRow> = self.rows.iter().collect();
        sorted.sort_by_key(|r| r.timestamp);
        sorted
    }
}
