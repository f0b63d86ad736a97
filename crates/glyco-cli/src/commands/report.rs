//! Report command implementation

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Weekday;
use glyco_core::report::{self, weekday_name, HourRange, Report, ReportOptions};
use glyco_core::{normalize, GlucoseUnit};

use super::{bar, load_inputs, load_samples, parse_now, Inputs};

/// Report options from the command-line flags
pub fn report_options(
    utc_offset_hours: f64,
    worst: usize,
    days: Option<u32>,
    weekday: Option<Weekday>,
    hours: Option<HourRange>,
) -> Result<ReportOptions> {
    let mut options = ReportOptions::default()
        .with_utc_offset_hours(utc_offset_hours)
        .context("Invalid --utc-offset")?
        .with_worst_days(worst);
    if let Some(days) = days {
        options = options.with_days(days);
    }
    if let Some(weekday) = weekday {
        options = options.with_weekday(weekday);
    }
    if let Some(hours) = hours {
        options = options.with_hours(hours);
    }
    Ok(options)
}

/// Build a report from one entries file; `None` when no readings pass the filters
pub fn run_report(
    config_path: Option<&Path>,
    file: &Path,
    settings_path: Option<&Path>,
    now: Option<&str>,
    options: ReportOptions,
) -> Result<Option<Report>> {
    let inputs = load_inputs(config_path, settings_path)?;
    report_file(&inputs, file, now, options)
}

fn report_file(
    inputs: &Inputs,
    file: &Path,
    now: Option<&str>,
    options: ReportOptions,
) -> Result<Option<Report>> {
    let now = parse_now(now)?;
    let samples = load_samples(file)?;
    // Historical exports: only readings from the future are dropped
    let normalized = normalize(&samples, now, &inputs.config.normalizer);

    let options = options.with_as_of(now);
    Ok(report::build_report(
        &normalized.readings,
        &inputs.thresholds,
        &options,
    ))
}

pub fn cmd_report(
    config_path: Option<&Path>,
    file: &Path,
    settings_path: Option<&Path>,
    now: Option<&str>,
    options: ReportOptions,
    json: bool,
) -> Result<()> {
    let inputs = load_inputs(config_path, settings_path)?;
    let Some(report) = report_file(&inputs, file, now, options)? else {
        println!("No glucose readings found in {} for this selection.", file.display());
        return Ok(());
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_report(&report, inputs.unit);
    Ok(())
}

fn print_report(report: &Report, unit: GlucoseUnit) {
    let stats = &report.statistics;

    println!();
    println!("📊 Glucose Report");
    println!(
        "   Period: {} to {}",
        report.start.format("%Y-%m-%d %H:%M"),
        report.end.format("%Y-%m-%d %H:%M")
    );
    if let Some(filter) = &report.filter {
        println!("   Filter: {}", filter);
    }
    println!("   ─────────────────────────────────────────────");
    println!("   Readings: {}", stats.count);
    println!(
        "   Mean: {}   Median: {}",
        unit.format(stats.mean),
        unit.format(stats.median)
    );
    println!(
        "   Range: {} – {}   SD: {}",
        unit.format(stats.min),
        unit.format(stats.max),
        unit.format(stats.std_dev)
    );
    println!("   GMI (est. A1c): {:.1}%", report.gmi);
    println!(
        "   CV: {:.1}% ({})",
        report.variability.cv_percent, report.variability.status
    );

    let tir = &report.time_in_range;
    println!();
    println!("🎯 Time in Range");
    for (label, pct) in [
        ("Very low", tir.very_low_pct),
        ("Low", tir.low_pct),
        ("In range", tir.in_range_pct),
        ("High", tir.high_pct),
        ("Very high", tir.very_high_pct),
    ] {
        println!("   {:10} {} {:5.1}%", label, bar(pct, 20), pct);
    }

    if !report.hourly.is_empty() {
        let means: Vec<f64> = report.hourly.iter().map(|h| h.mean).collect();
        println!();
        println!("🕐 Hourly Pattern");
        println!(
            "   {:02}h {} {:02}h",
            report.hourly[0].hour,
            report::sparkline(&means),
            report.hourly[report.hourly.len() - 1].hour
        );
        if let Some(h) = report.best_hour {
            println!("   Best hour:  {:02}:00", h);
        }
        if let Some(h) = report.worst_hour {
            println!("   Worst hour: {:02}:00", h);
        }
    }

    if !report.weekdays.is_empty() {
        println!();
        println!("📆 By Weekday");
        for d in &report.weekdays {
            println!(
                "   {:9} {} {:5.1}%  avg {}",
                weekday_name(d.weekday),
                bar(d.in_range_pct, 20),
                d.in_range_pct,
                unit.format(d.mean)
            );
        }
        if let (Some(best), Some(worst)) = (report.best_weekday, report.worst_weekday) {
            println!(
                "   Best day: {}   Worst day: {}",
                weekday_name(best),
                weekday_name(worst)
            );
        }
    }

    if !report.problem_times.is_empty() {
        println!();
        println!("⚠️  Problem Times");
        for p in &report.problem_times {
            println!(
                "   {:9} {:02}:00  {:5.1}% in range, mostly {} (avg {}, {} readings)",
                weekday_name(p.weekday),
                p.hour,
                p.in_range_pct,
                if p.is_mostly_low() { "low" } else { "high" },
                unit.format(p.mean),
                p.readings
            );
        }
    }

    if !report.worst_days.is_empty() {
        println!();
        println!("📅 Worst Days");
        println!(
            "   {:10} │ {:>12} │ {:>12} │ {:>12} │ {:>6} │ {:>4} │ {:>4}",
            "Date", "Peak", "Trough", "Average", "TIR", "High", "Low"
        );
        for d in &report.worst_days {
            println!(
                "   {:10} │ {:>12} │ {:>12} │ {:>12} │ {:>5.0}% │ {:>4} │ {:>4}",
                d.date.format("%Y-%m-%d").to_string(),
                unit.format(d.peak),
                unit.format(d.trough),
                unit.format(d.average),
                d.in_range_pct,
                d.high_count,
                d.low_count
            );
        }
    }
}
