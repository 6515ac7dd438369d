use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{DataPaths, Overrides, RiskLimits, ServerSettings, Settings};

/// The configuration file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "tradelog";

/// Loads the application settings.
///
/// Sources are layered, later ones winning: built-in defaults, the configuration
/// file, `TRADELOG_*` environment variables (`TRADELOG_RISK__BASE_EQUITY`, ...),
/// the legacy `BASE_EQUITY` / `DAILY_LOSS_LIMIT` / `BOTDATA` variables, and
/// finally the command-line `overrides`.
///
/// An explicit `file` must exist; the default `tradelog.toml` is optional.
pub fn load_settings(file: Option<&Path>, overrides: &Overrides) -> Result<Settings, ConfigError> {
    let mut builder = config::Config::builder()
        .set_default("risk.base_equity", "1000")?
        .set_default("risk.daily_loss_limit_pct", "2.0")?
        .set_default("paths.root", "botdata")?
        .set_default("server.addr", "0.0.0.0:3000")?;

    builder = match file {
        Some(path) => builder.add_source(config::File::from(path)),
        None => builder.add_source(config::File::with_name(DEFAULT_CONFIG_FILE).required(false)),
    };

    let settings = builder
        .add_source(
            config::Environment::with_prefix("TRADELOG")
                .prefix_separator("_")
                .separator("__"),
        )
        .set_override_option("risk.base_equity", std::env::var("BASE_EQUITY").ok())?
        .set_override_option("risk.daily_loss_limit_pct", std::env::var("DAILY_LOSS_LIMIT").ok())?
        .set_override_option("paths.root", std::env::var("BOTDATA").ok())?
        .set_override_option("risk.base_equity", overrides.base_equity.map(|v| v.to_string()))?
        .set_override_option(
            "risk.daily_loss_limit_pct",
            overrides.daily_loss_limit_pct.map(|v| v.to_string()),
        )?
        .set_override_option(
            "paths.root",
            overrides.data_dir.as_ref().map(|p| p.to_string_lossy().into_owned()),
        )?
        .build()?;

    // Attempt to deserialize the entire configuration into our `Settings` struct
    let settings = settings.try_deserialize::<Settings>()?;
    settings.validate()?;

    tracing::debug!(
        base_equity = %settings.risk.base_equity,
        daily_loss_limit_pct = %settings.risk.daily_loss_limit_pct,
        root = %settings.paths.root.display(),
        "Settings loaded."
    );

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;

    #[test]
    fn risk_limits_reject_non_positive_values() {
        assert!(RiskLimits::new(dec!(0), dec!(2)).is_err());
        assert!(RiskLimits::new(dec!(1000), dec!(-1)).is_err());
        let limits = RiskLimits::new(dec!(1000), dec!(2.0)).unwrap();
        assert_eq!(limits, RiskLimits::default());
    }

    #[test]
    fn file_values_are_read_and_overrides_win() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[risk]\nbase_equity = 5000\ndaily_loss_limit_pct = 3.5\n\n[paths]\nroot = \"/srv/bot\"\n\n[server]\naddr = \"127.0.0.1:8080\""
        )
        .unwrap();

        let overrides = Overrides {
            daily_loss_limit_pct: Some(dec!(1.25)),
            ..Overrides::default()
        };
        let settings = load_settings(Some(file.path()), &overrides).unwrap();

        // BASE_EQUITY may be set in the environment running the tests; only
        // assert on values it cannot touch.
        assert_eq!(settings.risk.daily_loss_limit_pct, dec!(1.25));
        assert_eq!(settings.server.addr.port(), 8080);
    }

    #[test]
    fn invalid_override_is_rejected() {
        let overrides = Overrides {
            base_equity: Some(dec!(-10)),
            ..Overrides::default()
        };
        let err = load_settings(None, &overrides).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn data_paths_hang_off_the_root() {
        let paths = DataPaths { root: "botdata".into() };
        assert_eq!(paths.logs_dir(), Path::new("botdata/logs"));
        assert_eq!(paths.presets_dir(), Path::new("botdata/presets"));
        assert_eq!(paths.control_file(), Path::new("botdata/control.json"));
    }
}
