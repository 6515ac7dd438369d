use analytics::MetricsEngine;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use comfy_table::Table;
use configuration::{Overrides, Settings};
use core_types::TradeTable;
use rust_decimal::Decimal;
use std::io;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// The main entry point for the tradelog application.
#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load environment variables from .env file, if there is one
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();
    let _guard = init_tracing(cli.log_dir.as_deref())?;

    let settings = configuration::load_settings(cli.config.as_deref(), &cli.overrides)
        .context("Failed to load settings")?;

    // Execute the appropriate command
    match cli.command {
        Commands::Metrics(args) => handle_metrics(args, &settings)?,
        Commands::Daily(args) => handle_daily(args, &settings)?,
        Commands::Validate(args) => return handle_validate(args, &settings),
        Commands::Serve(args) => handle_serve(args, settings).await?,
    }

    Ok(ExitCode::SUCCESS)
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Risk and performance analytics for trade-event logs.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Settings file (defaults to ./tradelog.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Also write logs to a daily-rotated file in this directory.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(flatten)]
    overrides: Overrides,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute P&L, drawdown and the daily lockout for a trade log.
    Metrics(ReportArgs),
    /// Show the per-day P&L and equity series of a trade log.
    Daily(ReportArgs),
    /// Validate a trade log before it is trusted (exit code 1 on failure).
    Validate(ValidateArgs),
    /// Serve the metrics over HTTP for the monitoring dashboard.
    Serve(ServeArgs),
}

#[derive(Parser)]
struct ReportArgs {
    /// Log to read. Defaults to the most recent log in the data directory.
    #[arg(long)]
    file: Option<PathBuf>,

    /// Print JSON instead of a table.
    #[arg(long)]
    json: bool,
}

#[derive(Parser)]
struct ValidateArgs {
    /// Path to the CSV trade log.
    path: PathBuf,
}

#[derive(Parser)]
struct ServeArgs {
    /// Address to listen on (e.g. 127.0.0.1:8080).
    #[arg(long)]
    addr: Option<SocketAddr>,
}

// ==============================================================================
// Command Logic
// ==============================================================================

fn init_tracing(log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "tradelog.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_writer(writer).with_ansi(false)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .try_init()
        .context("Failed to initialize tracing")?;

    Ok(guard)
}

fn load_table(file: Option<&Path>, settings: &Settings) -> Result<TradeTable> {
    match file {
        Some(path) => journal::load_trades(path)
            .with_context(|| format!("Failed to load {}", path.display())),
        None => {
            let dir = settings.paths.logs_dir();
            journal::read_latest(&dir)?
                .with_context(|| format!("No trade logs available in {}", dir.display()))
        }
    }
}

fn or_na(value: Option<Decimal>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| v.to_string())
}

fn handle_metrics(args: ReportArgs, settings: &Settings) -> Result<()> {
    let table = load_table(args.file.as_deref(), settings)?;
    let metrics = MetricsEngine::new(settings.risk).compute_metrics(&table)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&metrics)?);
        return Ok(());
    }

    let mut output = Table::new();
    output.set_header(vec!["Metric", "Value"]);
    output.add_row(vec!["Trades".to_string(), metrics.trades.to_string()]);
    output.add_row(vec!["P&L".to_string(), metrics.pnl.to_string()]);
    output.add_row(vec!["P&L %".to_string(), or_na(metrics.pnl_pct)]);
    output.add_row(vec!["Max drawdown %".to_string(), or_na(metrics.max_dd)]);
    output.add_row(vec!["Trading days".to_string(), metrics.days.to_string()]);
    output.add_row(vec!["Today's P&L %".to_string(), or_na(metrics.daily_pnl_pct_today)]);
    output.add_row(vec![
        "Lockout breached".to_string(),
        if metrics.lockout_breached { "YES" } else { "no" }.to_string(),
    ]);
    println!("{output}");

    Ok(())
}

fn handle_daily(args: ReportArgs, settings: &Settings) -> Result<()> {
    let table = load_table(args.file.as_deref(), settings)?;
    let series = MetricsEngine::new(settings.risk).build_daily_series(&table)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&series)?);
        return Ok(());
    }

    let mut output = Table::new();
    output.set_header(vec!["Date", "P&L", "Equity"]);
    for point in &series {
        output.add_row(vec![
            point.date.format("%Y-%m-%d").to_string(),
            point.pnl.to_string(),
            point.equity.to_string(),
        ]);
    }
    println!("{output}");

    Ok(())
}

fn handle_validate(args: ValidateArgs, settings: &Settings) -> Result<ExitCode> {
    let verdict = validator::validate(&args.path, settings.risk);
    validator::write_report(&verdict, &mut io::stdout().lock())?;
    Ok(ExitCode::from(verdict.exit_code()))
}

async fn handle_serve(args: ServeArgs, mut settings: Settings) -> Result<()> {
    if let Some(addr) = args.addr {
        settings.server.addr = addr;
    }
    web_server::run_server(settings).await
}
