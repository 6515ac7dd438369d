use crate::error::ConfigError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub risk: RiskLimits,
    pub paths: DataPaths,
    pub server: ServerSettings,
}

impl Settings {
    /// Checks the loaded values make sense before anything consumes them.
    pub fn validate(&self) -> Result<(), ConfigError> {
        RiskLimits::new(self.risk.base_equity, self.risk.daily_loss_limit_pct)?;
        Ok(())
    }
}

/// The account-level risk parameters the analytics and the log gate are judged against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct RiskLimits {
    /// The equity the account started from. P&L percentages are relative to it.
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub base_equity: Decimal,
    /// The maximum tolerated loss for one calendar day, in percent of `base_equity`.
    /// 2.0 corresponds to 2%.
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub daily_loss_limit_pct: Decimal,
}

impl RiskLimits {
    /// Creates a new `RiskLimits`, rejecting non-positive values.
    pub fn new(base_equity: Decimal, daily_loss_limit_pct: Decimal) -> Result<Self, ConfigError> {
        if base_equity <= Decimal::ZERO {
            return Err(ConfigError::ValidationError(format!(
                "base_equity must be greater than 0 (got {base_equity})"
            )));
        }
        if daily_loss_limit_pct <= Decimal::ZERO {
            return Err(ConfigError::ValidationError(format!(
                "daily_loss_limit_pct must be greater than 0 (got {daily_loss_limit_pct})"
            )));
        }
        Ok(Self {
            base_equity,
            daily_loss_limit_pct,
        })
    }
}

impl Default for RiskLimits {
    fn default() -> Self {
        Self {
            base_equity: Decimal::ONE_THOUSAND,
            daily_loss_limit_pct: Decimal::TWO,
        }
    }
}

/// Where the trading process keeps its data on disk.
///
/// Everything lives under a single root: `logs/` holds one CSV per session,
/// `presets/` holds uploaded `.set` files and `control.json` the trading switch.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DataPaths {
    pub root: PathBuf,
}

impl DataPaths {
    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    pub fn presets_dir(&self) -> PathBuf {
        self.root.join("presets")
    }

    pub fn control_file(&self) -> PathBuf {
        self.root.join("control.json")
    }
}

/// Contains parameters for the monitoring HTTP server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    pub addr: SocketAddr,
}

/// Values given on the command line. They take precedence over every other source.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "clap", derive(clap::Args))]
pub struct Overrides {
    /// Starting equity used for P&L percentages (overrides BASE_EQUITY).
    #[cfg_attr(feature = "clap", arg(long, global = true))]
    pub base_equity: Option<Decimal>,

    /// Daily loss limit in percent of base equity (overrides DAILY_LOSS_LIMIT).
    #[cfg_attr(feature = "clap", arg(long = "daily-loss-limit", global = true))]
    pub daily_loss_limit_pct: Option<Decimal>,

    /// Root of the bot data directory (overrides BOTDATA).
    #[cfg_attr(feature = "clap", arg(long, global = true))]
    pub data_dir: Option<PathBuf>,
}
