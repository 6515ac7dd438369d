use clap::Parser;
use configuration::Overrides;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Validate a trading log before it is trusted.
///
/// Checks the header, every timestamp, the daily loss limit and the
/// open/close volume balance. Exits 0 on a pass and 1 on any failure.
#[derive(Parser)]
#[command(name = "validate-log", version, about, long_about = None)]
struct Cli {
    /// Path to the CSV trade log.
    path: Option<PathBuf>,

    /// Settings file (defaults to ./tradelog.toml when present).
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(flatten)]
    overrides: Overrides,
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    // Diagnostics go to stdout; tracing output stays on stderr.
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to install tracing subscriber: {e}");
    }

    let cli = Cli::parse();
    let Some(path) = cli.path else {
        println!("Usage: validate-log <log.csv>");
        return ExitCode::FAILURE;
    };

    let settings = match configuration::load_settings(cli.config.as_deref(), &cli.overrides) {
        Ok(settings) => settings,
        Err(e) => {
            println!("[ERROR] {e}");
            return ExitCode::FAILURE;
        }
    };

    let verdict = validator::validate(&path, settings.risk);
    if let Err(e) = validator::write_report(&verdict, &mut io::stdout().lock()) {
        eprintln!("Failed to write report: {e}");
        return ExitCode::FAILURE;
    }

    ExitCode::from(verdict.exit_code())
}
