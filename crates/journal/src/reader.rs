use crate::discovery::latest_log;
use crate::error::JournalError;
use core_types::structs::{BALANCE, COMMENT, EVENT, PRICE, PROFIT, TIMESTAMP, TZ_OFFSET, VOLUME};
use core_types::{parse_decimal, parse_offset, parse_timestamp, EventKind, TradeRow, TradeTable};
use csv::StringRecord;
use rust_decimal::Decimal;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Where each known column sits in the header. Only `timestamp` is mandatory
/// for loading; the analytics decide which other columns they cannot do without.
struct ColumnLayout {
    timestamp: usize,
    tz_offset: Option<usize>,
    event: Option<usize>,
    price: Option<usize>,
    volume: Option<usize>,
    profit: Option<usize>,
    balance: Option<usize>,
    comment: Option<usize>,
}

impl ColumnLayout {
    fn from_headers(headers: &StringRecord) -> Result<Self, JournalError> {
        let find = |name: &str| headers.iter().position(|h| h == name);
        Ok(Self {
            timestamp: find(TIMESTAMP).ok_or(JournalError::MissingColumn(TIMESTAMP))?,
            tz_offset: find(TZ_OFFSET),
            event: find(EVENT),
            price: find(PRICE),
            volume: find(VOLUME),
            profit: find(PROFIT),
            balance: find(BALANCE),
            comment: find(COMMENT),
        })
    }

    fn parse_row(&self, record: &StringRecord, line: u64) -> Result<TradeRow, JournalError> {
        let raw_ts = field(record, Some(self.timestamp));
        let tz_offset = field(record, self.tz_offset);
        let timestamp = parse_timestamp(raw_ts)
            .map_err(|_| JournalError::InvalidTimestamp {
                line,
                value: raw_ts.to_string(),
            })?
            .to_utc(parse_offset(tz_offset));

        Ok(TradeRow {
            timestamp,
            tz_offset: tz_offset.to_string(),
            event: EventKind::parse(field(record, self.event)),
            price: number(record, self.price, PRICE, line)?.unwrap_or_default(),
            volume: number(record, self.volume, VOLUME, line)?.unwrap_or_default(),
            profit: number(record, self.profit, PROFIT, line)?,
            balance: number(record, self.balance, BALANCE, line)?,
            comment: field(record, self.comment).to_string(),
        })
    }
}

fn field(record: &StringRecord, index: Option<usize>) -> &str {
    index.and_then(|i| record.get(i)).unwrap_or("")
}

fn number(
    record: &StringRecord,
    index: Option<usize>,
    column: &'static str,
    line: u64,
) -> Result<Option<Decimal>, JournalError> {
    let raw = field(record, index);
    if raw.is_empty() {
        return Ok(None);
    }
    parse_decimal(raw)
        .map(Some)
        .ok_or_else(|| JournalError::InvalidNumber {
            line,
            column,
            value: raw.to_string(),
        })
}

/// Parses a trade log from any reader. The first line must be the header.
pub fn read_trades<R: Read>(source: R) -> Result<TradeTable, JournalError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(source);

    let headers = reader.headers()?.clone();
    let layout = ColumnLayout::from_headers(&headers)?;
    let columns: Vec<String> = headers.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record.position().map_or(0, |p| p.line());
        rows.push(layout.parse_row(&record, line)?);
    }

    if layout.balance.is_none() {
        tracing::debug!("Trade log has no balance column.");
    }

    Ok(TradeTable::new(columns, rows))
}

/// Loads the trade log at `path`.
pub fn load_trades(path: &Path) -> Result<TradeTable, JournalError> {
    let file = File::open(path).map_err(|source| JournalError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let table = read_trades(file)?;
    tracing::debug!(path = %path.display(), rows = table.len(), "Trade log loaded.");
    Ok(table)
}

/// Loads the most recent log in `dir`, or `None` if there is no log to load.
pub fn read_latest(dir: &Path) -> Result<Option<TradeTable>, JournalError> {
    match latest_log(dir)? {
        Some(path) => {
            tracing::info!(path = %path.display(), "Reading latest trade log.");
            load_trades(&path).map(Some)
        }
        None => Ok(None),
    }
}
