use crate::config::FacilityConfig;
use crate::facility::{AllocationEngine, Facility, ParkingError, PlateNumber, SystemClock};
use crate::observability::init_logging;
use crate::observability::logging::LogLevel;
use crate::storage::FileGateway;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::{json, Value};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

/// Parking facility slot allocation and revenue tool.
#[derive(Debug, Parser)]
#[command(name = "parkade", version, about, long_about = None)]
pub struct Cli {
    /// JSON configuration file; defaults apply when omitted.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the occupancy and revenue records.
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Log level override (TRACE, DEBUG, INFO, WARN, ERROR).
    #[arg(long, global = true)]
    pub log_level: Option<LogLevel>,

    /// Print results as JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Assign a slot to an arriving vehicle.
    Park {
        /// Registration number, e.g. MH12AB1234.
        plate: String,
        /// Category: 1/2/3 or two-wheeler, three-wheeler, four-wheeler.
        category: String,
    },
    /// Release a departing vehicle's slot and bill the stay.
    Unpark {
        plate: String,
    },
    /// Show active tickets and free slots per category.
    Status,
    /// Show per-day revenue.
    Revenue {
        #[arg(long)]
        secret: String,
    },
    /// Erase all revenue history.
    ClearRevenue {
        #[arg(long)]
        secret: String,
    },
}

/// How a command finished, for the process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    Rejected,
}

impl Outcome {
    pub fn exit_code(self) -> i32 {
        match self {
            Outcome::Completed => 0,
            Outcome::Rejected => 2,
        }
    }
}

/// Application entrypoint: parse arguments, load configuration, run one command.
pub fn run() -> Result<Outcome> {
    let cli = Cli::parse();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_with(cli, &mut out)
}

/// Runs a parsed command, writing user-facing output to `out`.
pub fn run_with(cli: Cli, out: &mut dyn Write) -> Result<Outcome> {
    let config = resolve_config(&cli)?;
    let log = init_logging(&config.log).context("failed to open log sink")?;
    let gateway = FileGateway::from_config(&config.storage, log.clone());
    let engine = AllocationEngine::from_config(&config, gateway, Arc::new(SystemClock), log)
        .context("invalid facility configuration")?;
    let facility = Facility::new(engine);
    execute(&facility, cli.command, cli.json, out)
}

fn resolve_config(cli: &Cli) -> Result<FacilityConfig> {
    let mut config = FacilityConfig::load(cli.config.as_deref())
        .with_context(|| match &cli.config {
            Some(path) => format!("failed to load config {}", path.display()),
            None => "failed to build default config".to_string(),
        })?;
    let mut overrides = serde_json::Map::new();
    if let Some(dir) = &cli.data_dir {
        overrides.insert("storage".into(), json!({ "data_dir": dir }));
    }
    if let Some(level) = cli.log_level {
        overrides.insert("log".into(), json!({ "level": level }));
    }
    if !overrides.is_empty() {
        config
            .apply_overrides(Value::Object(overrides))
            .context("invalid command-line override")?;
    }
    Ok(config)
}

fn execute(
    facility: &Facility<FileGateway>,
    command: Command,
    as_json: bool,
    out: &mut dyn Write,
) -> Result<Outcome> {
    match command {
        Command::Park { plate, category } => {
            let Some(plate) = PlateNumber::normalize(&plate) else {
                return reject(out, as_json, "Please enter a vehicle number", None);
            };
            report(out, as_json, facility.park(&plate, category))
        }
        Command::Unpark { plate } => {
            let Some(plate) = PlateNumber::normalize(&plate) else {
                return reject(out, as_json, "Please enter a vehicle number", None);
            };
            report(out, as_json, facility.unpark(&plate))
        }
        Command::Status => {
            let status = facility.status();
            if as_json {
                writeln!(out, "{}", serde_json::to_string_pretty(&status)?)?;
            } else {
                writeln!(out, "{status}")?;
            }
            Ok(Outcome::Completed)
        }
        Command::Revenue { secret } => match facility.revenue_snapshot(&secret) {
            Ok(revenue) => {
                if as_json {
                    writeln!(out, "{}", serde_json::to_string_pretty(&revenue)?)?;
                } else {
                    writeln!(out, "Daily Revenue Report")?;
                    writeln!(out)?;
                    if revenue.is_empty() {
                        writeln!(out, "No revenue data available")?;
                    }
                    for (date, amount) in &revenue {
                        writeln!(out, "{date}: Rs. {amount}")?;
                    }
                }
                Ok(Outcome::Completed)
            }
            Err(err) => reject(out, as_json, &err.to_string(), Some(&err)),
        },
        Command::ClearRevenue { secret } => match facility.clear_revenue(&secret) {
            Ok(()) => {
                if as_json {
                    writeln!(out, "{}", json!({ "cleared": true }))?;
                } else {
                    writeln!(out, "Revenue history cleared successfully!")?;
                }
                Ok(Outcome::Completed)
            }
            Err(err) => reject(out, as_json, &err.to_string(), Some(&err)),
        },
    }
}

fn report<T>(
    out: &mut dyn Write,
    as_json: bool,
    outcome: Result<T, ParkingError>,
) -> Result<Outcome>
where
    T: Serialize + std::fmt::Display,
{
    match outcome {
        Ok(receipt) => {
            if as_json {
                writeln!(out, "{}", serde_json::to_string_pretty(&receipt)?)?;
            } else {
                writeln!(out, "{receipt}")?;
            }
            Ok(Outcome::Completed)
        }
        Err(err) => reject(out, as_json, &err.to_string(), Some(&err)),
    }
}

fn reject(
    out: &mut dyn Write,
    as_json: bool,
    message: &str,
    err: Option<&ParkingError>,
) -> Result<Outcome> {
    if as_json {
        let reason = err.map(ParkingError::status_reason);
        writeln!(out, "{}", json!({ "error": message, "reason": reason }))?;
    } else {
        writeln!(out, "{message}")?;
    }
    Ok(Outcome::Rejected)
}
