//! The on-disk trading switch (`control.json`) and the preset library.

use chrono::{SecondsFormat, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ControlError {
    #[error("Risk percent must be positive")]
    InvalidRiskPercent(Decimal),

    #[error("Failed to write {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("Failed to encode control file: {0}")]
    Json(#[from] serde_json::Error),
}

/// What the trading process reads to decide whether, and how hard, to trade.
///
/// The file is read the way the trading process reads it: any non-empty
/// string, non-zero number or `true` enables trading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlState {
    #[serde(deserialize_with = "deserialize_truthy")]
    pub trading_enabled: bool,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub risk_percent: Decimal,
}

impl Default for ControlState {
    fn default() -> Self {
        Self {
            trading_enabled: true,
            risk_percent: Decimal::new(5, 1),
        }
    }
}

/// A `POST /api/control` body. Here a string switch is read by its meaning,
/// so `"off"` disables trading.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ControlUpdate {
    #[serde(deserialize_with = "deserialize_switch")]
    pub trading_enabled: bool,
    pub risk_percent: Decimal,
}

impl Default for ControlUpdate {
    fn default() -> Self {
        ControlState::default().into()
    }
}

impl From<ControlState> for ControlUpdate {
    fn from(state: ControlState) -> Self {
        Self {
            trading_enabled: state.trading_enabled,
            risk_percent: state.risk_percent,
        }
    }
}

impl From<ControlUpdate> for ControlState {
    fn from(update: ControlUpdate) -> Self {
        Self {
            trading_enabled: update.trading_enabled,
            risk_percent: update.risk_percent,
        }
    }
}

/// The control file as written: the state plus when it was last changed.
#[derive(Debug, Clone, Serialize)]
pub struct ControlRecord {
    #[serde(flatten)]
    pub state: ControlState,
    pub updated_at: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FlagValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

/// File semantics: `null`, `false`, `0` and `""` are off, anything else is on.
fn deserialize_truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match FlagValue::deserialize(deserializer)? {
        FlagValue::Null => false,
        FlagValue::Bool(b) => b,
        FlagValue::Number(n) => n != 0.0,
        FlagValue::Text(s) => !s.is_empty(),
    })
}

/// Request semantics: a string is on only for "1", "true", "yes" or "on" (case-insensitive).
fn deserialize_switch<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match FlagValue::deserialize(deserializer)? {
        FlagValue::Text(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        ),
        FlagValue::Null => false,
        FlagValue::Bool(b) => b,
        FlagValue::Number(n) => n != 0.0,
    })
}

/// Reads the control file. A missing or unreadable file yields the defaults,
/// so a broken file never blocks the dashboard.
pub fn load_control(path: &Path) -> ControlState {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return ControlState::default(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Control file unreadable; using defaults.");
            return ControlState::default();
        }
    };

    serde_json::from_str(&raw).unwrap_or_else(|e| {
        tracing::warn!(path = %path.display(), error = %e, "Control file malformed; using defaults.");
        ControlState::default()
    })
}

/// Validates and writes a new control state, stamping it with the current UTC time.
pub fn save_control(path: &Path, state: ControlState) -> Result<ControlRecord, ControlError> {
    if state.risk_percent <= Decimal::ZERO {
        return Err(ControlError::InvalidRiskPercent(state.risk_percent));
    }

    let io_err = |source: io::Error| ControlError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }

    let record = ControlRecord {
        state,
        updated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
    };
    fs::write(path, serde_json::to_string_pretty(&record)?).map_err(io_err)?;
    tracing::info!(
        trading_enabled = record.state.trading_enabled,
        risk_percent = %record.state.risk_percent,
        "Control file updated."
    );

    Ok(record)
}

/// Names of the `.set` preset files in `dir`, sorted. A missing directory is empty.
pub fn list_presets(dir: &Path) -> io::Result<Vec<String>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let mut presets = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "set") {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                presets.push(name.to_string());
            }
        }
    }
    presets.sort();
    Ok(presets)
}
