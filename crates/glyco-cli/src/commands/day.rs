//! Day command implementation

use std::path::Path;

use anyhow::{Context, Result};
use glyco_core::report::{self, DayView, HourRange, ReportOptions};
use glyco_core::{normalize, GlucoseUnit};

use super::{load_inputs, load_samples, parse_now, Inputs};

/// Readings of one local day from an entries file
///
/// `date` accepts `today`, `yesterday`, ISO dates, `MM/DD` and `Jan 15`,
/// resolved against `now` in the given offset.
pub fn run_day(
    config_path: Option<&Path>,
    file: &Path,
    settings_path: Option<&Path>,
    date: &str,
    now: Option<&str>,
    utc_offset_hours: f64,
    hours: Option<HourRange>,
) -> Result<DayView> {
    let inputs = load_inputs(config_path, settings_path)?;
    day_file(&inputs, file, date, now, utc_offset_hours, hours)
}

fn day_file(
    inputs: &Inputs,
    file: &Path,
    date: &str,
    now: Option<&str>,
    utc_offset_hours: f64,
    hours: Option<HourRange>,
) -> Result<DayView> {
    let offset = ReportOptions::default()
        .with_utc_offset_hours(utc_offset_hours)
        .context("Invalid --utc-offset")?
        .utc_offset;
    let now = parse_now(now)?;
    let today = now.with_timezone(&offset).date_naive();
    let date = report::parse_day(date, today)?;

    let samples = load_samples(file)?;
    let normalized = normalize(&samples, now, &inputs.config.normalizer);

    Ok(report::day_view(
        &normalized.readings,
        date,
        &inputs.thresholds,
        offset,
        hours,
    ))
}

#[allow(clippy::too_many_arguments)]
pub fn cmd_day(
    config_path: Option<&Path>,
    file: &Path,
    settings_path: Option<&Path>,
    date: &str,
    now: Option<&str>,
    utc_offset_hours: f64,
    hours: Option<HourRange>,
    json: bool,
) -> Result<()> {
    let inputs = load_inputs(config_path, settings_path)?;
    let view = day_file(&inputs, file, date, now, utc_offset_hours, hours)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    print_day(&view, inputs.unit);
    Ok(())
}

fn print_day(view: &DayView, unit: GlucoseUnit) {
    println!();
    println!("📅 {}", view.date.format("%A %Y-%m-%d"));
    if let Some(filter) = &view.filter {
        println!("   Filter: {}", filter);
    }
    println!("   ─────────────────────────────");

    let Some(stats) = &view.statistics else {
        println!("   No readings for this day.");
        return;
    };

    println!(
        "   Average: {}   In range: {:.0}%   Readings: {}",
        unit.format(stats.average),
        stats.in_range_pct,
        stats.count
    );
    println!(
        "   Peak: {} at {}   Trough: {} at {}",
        unit.format(stats.max),
        stats.peak_time.format("%H:%M"),
        unit.format(stats.min),
        stats.trough_time.format("%H:%M")
    );

    println!();
    for r in &view.readings {
        let icon = match r.status {
            report::RangeBucket::VeryLow | report::RangeBucket::VeryHigh => "🔴",
            report::RangeBucket::Low | report::RangeBucket::High => "🟡",
            report::RangeBucket::InRange => "🟢",
        };
        println!(
            "   {} {}  {:>12}  {}",
            r.time.format("%H:%M"),
            icon,
            unit.format(r.value),
            r.status
        );
    }
}
