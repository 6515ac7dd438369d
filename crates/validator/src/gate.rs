use crate::error::ValidationFailure;
use crate::verdict::ValidationVerdict;
use chrono::NaiveDate;
use configuration::RiskLimits;
use core_types::structs::{EVENT, PROFIT, TIMESTAMP, VOLUME};
use core_types::{parse_decimal, parse_timestamp, EventKind, REQUIRED_COLUMNS};
use csv::StringRecord;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::path::Path;

/// Absorbs floating-point noise written by the trading process (1e-6).
pub const TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 6);

/// Re-checks a raw trade log before it is trusted.
///
/// It reads the file itself and shares no code with the metrics engine; the
/// daily loss check here is independent of the engine's lockout flag.
#[derive(Debug, Clone)]
pub struct LogValidator {
    limits: RiskLimits,
}

/// Running totals gathered while scanning the rows.
#[derive(Debug, Default)]
struct Tally {
    daily_profit: BTreeMap<NaiveDate, Decimal>,
    open_volume: Decimal,
    close_volume: Decimal,
    rows: usize,
}

struct Columns {
    timestamp: usize,
    event: usize,
    volume: usize,
    profit: usize,
}

impl LogValidator {
    pub fn new(limits: RiskLimits) -> Self {
        Self { limits }
    }

    /// Validates the log at `path`, stopping at the first violation.
    pub fn validate(&self, path: &Path) -> ValidationVerdict {
        match self.check(path) {
            Ok(verdict) => verdict,
            Err(failure) => {
                tracing::debug!(path = %path.display(), %failure, "Log rejected.");
                ValidationVerdict::failed(failure)
            }
        }
    }

    fn check(&self, path: &Path) -> Result<ValidationVerdict, ValidationFailure> {
        if self.limits.base_equity <= Decimal::ZERO {
            return Err(ValidationFailure::InvalidLimits(format!(
                "base equity must be positive (got {})",
                self.limits.base_equity
            )));
        }
        if !path.exists() {
            return Err(ValidationFailure::FileNotFound(path.to_path_buf()));
        }

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .map_err(unreadable)?;
        let headers = reader.headers().map_err(unreadable)?.clone();
        let columns = locate_columns(&headers)?;

        let mut tally = Tally::default();
        for record in reader.records() {
            let record = record.map_err(unreadable)?;
            tally.add(&record, &columns)?;
        }

        if tally.rows == 0 {
            return Ok(ValidationVerdict::passed_with_warning(
                "Log is empty; nothing to validate.",
            ));
        }

        self.check_daily_losses(&tally.daily_profit)?;
        check_volume_balance(tally.open_volume, tally.close_volume)?;

        tracing::debug!(
            rows = tally.rows,
            days = tally.daily_profit.len(),
            "Log passed validation."
        );
        Ok(ValidationVerdict::passed())
    }

    /// Fails on the earliest day whose net loss exceeds the limit.
    fn check_daily_losses(
        &self,
        daily_profit: &BTreeMap<NaiveDate, Decimal>,
    ) -> Result<(), ValidationFailure> {
        for (&date, &profit) in daily_profit {
            if profit >= Decimal::ZERO {
                continue;
            }
            let loss_pct = profit
                .abs()
                .checked_div(self.limits.base_equity)
                .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
                .ok_or(ValidationFailure::Overflow("daily loss percentage"))?;
            if loss_pct > self.limits.daily_loss_limit_pct + TOLERANCE {
                return Err(ValidationFailure::RiskLimitBreach {
                    date,
                    loss_pct,
                    limit_pct: self.limits.daily_loss_limit_pct,
                });
            }
        }
        Ok(())
    }
}

impl Tally {
    fn add(&mut self, record: &StringRecord, columns: &Columns) -> Result<(), ValidationFailure> {
        let raw_ts = record.get(columns.timestamp).unwrap_or("");
        let day = parse_timestamp(raw_ts)
            .map_err(|_| ValidationFailure::MalformedTimestamp(raw_ts.to_string()))?
            .local_date();

        // Numbers are coerced leniently: anything unreadable counts as zero.
        let profit = lenient(record.get(columns.profit));
        let day_total = self.daily_profit.entry(day).or_default();
        *day_total = checked_sum(*day_total, profit, "daily profit")?;

        let volume = lenient(record.get(columns.volume));
        match EventKind::parse(record.get(columns.event).unwrap_or("")) {
            EventKind::Open(_) => {
                self.open_volume = checked_sum(self.open_volume, volume, "open volume")?;
            }
            EventKind::PositionClose => {
                self.close_volume = checked_sum(self.close_volume, volume, "close volume")?;
            }
            EventKind::Other(_) => {}
        }

        self.rows += 1;
        Ok(())
    }
}

/// Every open must eventually be closed with matching volume.
fn check_volume_balance(open: Decimal, close: Decimal) -> Result<(), ValidationFailure> {
    let diff = open
        .checked_sub(close)
        .ok_or(ValidationFailure::Overflow("volume difference"))?;
    if diff.abs() > TOLERANCE {
        return Err(ValidationFailure::VolumeImbalance { open, close });
    }
    Ok(())
}

fn locate_columns(headers: &StringRecord) -> Result<Columns, ValidationFailure> {
    let find = |name: &str| headers.iter().position(|h| h == name);

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|column| find(**column).is_none())
        .map(|column| column.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ValidationFailure::MissingColumns(missing));
    }

    let required = |name: &str| {
        find(name).ok_or_else(|| ValidationFailure::MissingColumns(vec![name.to_string()]))
    };
    Ok(Columns {
        timestamp: required(TIMESTAMP)?,
        event: required(EVENT)?,
        volume: required(VOLUME)?,
        profit: required(PROFIT)?,
    })
}

fn checked_sum(
    total: Decimal,
    value: Decimal,
    what: &'static str,
) -> Result<Decimal, ValidationFailure> {
    total
        .checked_add(value)
        .ok_or(ValidationFailure::Overflow(what))
}

fn lenient(raw: Option<&str>) -> Decimal {
    raw.and_then(parse_decimal).unwrap_or_default()
}

fn unreadable(err: csv::Error) -> ValidationFailure {
    ValidationFailure::Unreadable(err.to_string())
}
