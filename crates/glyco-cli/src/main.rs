//! Glyco CLI - CGM glucose insights
//!
//! Usage:
//!   glyco analyze --file entries.json       Trend, events and forecast for the latest data
//!   glyco report --file entries.json        Retrospective statistics
//!   glyco day yesterday --file entries.json Readings of one day
//!   glyco config                            Show the effective configuration

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = cli.config.as_deref();

    match cli.command {
        Commands::Analyze {
            file,
            settings,
            now,
            state,
            json,
        } => commands::cmd_analyze(
            config,
            &file,
            settings.as_deref(),
            now.as_deref(),
            state.as_deref(),
            json,
        ),
        Commands::Report {
            file,
            settings,
            utc_offset,
            worst,
            days,
            weekday,
            hours,
            now,
            json,
        } => {
            let options = commands::report_options(utc_offset, worst, days, weekday, hours)?;
            commands::cmd_report(
                config,
                &file,
                settings.as_deref(),
                now.as_deref(),
                options,
                json,
            )
        }
        Commands::Day {
            date,
            file,
            settings,
            utc_offset,
            hours,
            now,
            json,
        } => commands::cmd_day(
            config,
            &file,
            settings.as_deref(),
            &date,
            now.as_deref(),
            utc_offset,
            hours,
            json,
        ),
        Commands::Config => commands::cmd_config(config),
    }
}
