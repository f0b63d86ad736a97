//! Analyze command implementation

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use glyco_core::{
    normalize, AnalysisContext, GlucoseUnit, Insight, InsightEngine, Severity, Window,
};

use super::{load_inputs, load_samples, load_state, save_state, Inputs};

/// Parse `--now`, defaulting to the wall clock
pub fn parse_now(now: Option<&str>) -> Result<DateTime<Utc>> {
    match now {
        Some(s) => Ok(DateTime::parse_from_rfc3339(s)
            .with_context(|| format!("Invalid --now '{}' (use RFC3339, e.g. 2026-01-15T08:00:00Z)", s))?
            .with_timezone(&Utc)),
        None => Ok(Utc::now()),
    }
}

/// Normalize, window and analyze one entries file
///
/// Reads the previous state from `state` when given and writes the new one back.
pub fn run_analyze(
    config_path: Option<&Path>,
    file: &Path,
    settings_path: Option<&Path>,
    now: Option<&str>,
    state_path: Option<&Path>,
) -> Result<Insight> {
    let inputs = load_inputs(config_path, settings_path)?;
    analyze_file(&inputs, file, now, state_path)
}

fn analyze_file(
    inputs: &Inputs,
    file: &Path,
    now: Option<&str>,
    state_path: Option<&Path>,
) -> Result<Insight> {
    let config = &inputs.config;
    let now = parse_now(now)?;

    let samples = load_samples(file)?;
    let normalized = normalize(&samples, now, &config.normalizer);
    for rejection in &normalized.rejected {
        tracing::debug!(index = rejection.index, error = %rejection.error, "Sample skipped");
    }
    let window = Window::from_config(normalized.readings, &config.window);

    let previous = match state_path {
        Some(path) => load_state(path)?,
        None => Default::default(),
    };

    let engine = InsightEngine::new(config);
    let insight = engine.analyze(&AnalysisContext::new(&window, &inputs.thresholds, &previous, now));

    if let Some(path) = state_path {
        save_state(path, &insight.state)?;
    }

    tracing::info!(
        readings = window.len(),
        rejected = normalized.rejected.len(),
        events = insight.events.len(),
        stale = insight.stale,
        "Analysis complete"
    );

    Ok(insight)
}

pub fn cmd_analyze(
    config_path: Option<&Path>,
    file: &Path,
    settings_path: Option<&Path>,
    now: Option<&str>,
    state_path: Option<&Path>,
    json: bool,
) -> Result<()> {
    let inputs = load_inputs(config_path, settings_path)?;
    let insight = analyze_file(&inputs, file, now, state_path)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&insight)?);
        return Ok(());
    }

    print_insight(&insight, inputs.unit);
    Ok(())
}

fn print_insight(insight: &Insight, unit: GlucoseUnit) {
    println!();
    println!(
        "🩸 Glucose Insight ({})",
        insight.generated_at.format("%Y-%m-%d %H:%M UTC")
    );
    println!("   ─────────────────────────────");

    if insight.no_data {
        println!("   No readings in the analysis window.");
        return;
    }

    if let (Some(value), Some(classification)) = (insight.latest_value, insight.classification) {
        println!(
            "   Latest: {} {} ({})",
            unit.format(value),
            insight.trend.direction.symbol(),
            classification
        );
    }
    if let Some(age) = insight.data_age_minutes.filter(|a| *a >= 1.0) {
        println!("   Age: {:.0} min", age);
    }
    if insight.stale {
        println!("   ⚠️  Stale data: the latest reading is older than the analysis window");
    }

    match insight.trend.rate {
        Some(rate) => println!(
            "   Trend: {} ({:+.2} {}/min, confidence {:.0}%)",
            insight.trend.direction,
            unit.from_mg_dl(rate),
            unit,
            insight.trend.confidence * 100.0
        ),
        None => println!("   Trend: not enough data"),
    }

    if let Some(p) = &insight.prediction {
        let mut flags = Vec::new();
        if p.low_confidence {
            flags.push("low confidence");
        }
        if p.out_of_plausible_range {
            flags.push("clamped");
        }
        let suffix = if flags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", flags.join(", "))
        };
        println!(
            "   Forecast ({:.0} min): {}{}",
            p.horizon_minutes,
            unit.format(p.value),
            suffix
        );
    }

    if !insight.events.is_empty() {
        println!();
        println!("🚨 Events");
        for e in &insight.events {
            let icon = match e.event.severity {
                Severity::Urgent => "🔴",
                Severity::Warning => "🟡",
            };
            println!(
                "   {} {} ({}) at {}{}",
                icon,
                e.event.kind,
                e.event.severity,
                unit.format(e.event.value),
                if e.suppressed { "  (already notified)" } else { "" }
            );
        }
    }

    if !insight.proactive.is_empty() {
        println!();
        println!("🔮 Heads-up");
        for alert in &insight.proactive {
            println!(
                "   {} ({}) in ~{:.0} min",
                alert.boundary,
                unit.format(alert.threshold),
                alert.minutes_to_cross.ceil()
            );
        }
    }

    if insight.events.is_empty() && insight.proactive.is_empty() {
        println!();
        println!("✅ Nothing to report.");
    }
}
