//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use chrono::Weekday;
use clap::{Parser, Subcommand};
use glyco_core::HourRange;

/// Glyco - Real-time insights from CGM data
#[derive(Parser)]
#[command(name = "glyco")]
#[command(about = "Glucose trend, event and forecast insights from Nightscout data", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Engine config file (defaults to the data-dir override, then built-in defaults)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one analysis cycle over a Nightscout entries export
    Analyze {
        /// Nightscout entries JSON file
        #[arg(short, long)]
        file: PathBuf,

        /// Nightscout settings JSON (thresholds and display units)
        #[arg(short, long)]
        settings: Option<PathBuf>,

        /// Analysis time (RFC3339); defaults to the current time
        #[arg(long)]
        now: Option<String>,

        /// Cycle state file, read before and written after the analysis
        ///
        /// Keeps cool-downs and recovery detection working across runs.
        #[arg(long)]
        state: Option<PathBuf>,

        /// Print the insight as JSON
        #[arg(long)]
        json: bool,
    },

    /// Retrospective report over a Nightscout entries export
    Report {
        /// Nightscout entries JSON file
        #[arg(short, long)]
        file: PathBuf,

        /// Nightscout settings JSON (thresholds and display units)
        #[arg(short, long)]
        settings: Option<PathBuf>,

        /// Local time offset in hours for hourly and daily breakdowns
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        utc_offset: f64,

        /// Number of worst days to list
        #[arg(long, default_value = "5")]
        worst: usize,

        /// Only the last N days before --now
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
        days: Option<u32>,

        /// Only readings on this weekday (e.g. Monday)
        #[arg(long)]
        weekday: Option<Weekday>,

        /// Only readings within these local hours, inclusive (e.g. 12-14)
        #[arg(long)]
        hours: Option<HourRange>,

        /// Report time (RFC3339); defaults to the current time
        #[arg(long)]
        now: Option<String>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Readings of a single day with their status, peak and trough
    Day {
        /// today, yesterday, YYYY-MM-DD, MM/DD or "Jan 15"
        date: String,

        /// Nightscout entries JSON file
        #[arg(short, long)]
        file: PathBuf,

        /// Nightscout settings JSON (thresholds and display units)
        #[arg(short, long)]
        settings: Option<PathBuf>,

        /// Local time offset in hours
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        utc_offset: f64,

        /// Only readings within these local hours, inclusive (e.g. 12-14)
        #[arg(long)]
        hours: Option<HourRange>,

        /// Reference time for today/yesterday (RFC3339); defaults to the current time
        #[arg(long)]
        now: Option<String>,

        /// Print the day as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the effective engine configuration
    Config,
}
