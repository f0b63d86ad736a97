//! Integration tests for glyco-core
//!
//! These tests exercise the full Nightscout → normalize → window → analyze
//! workflow, including state carried across cycles.

use chrono::{DateTime, Duration, Utc};
use glyco_core::{
    analyze, build_report,
    nightscout::{parse_entries, to_raw_samples},
    normalize, AnalysisContext, Boundary, Classification, CycleState, Direction, EngineConfig,
    Error, EventKind, GlucoseUnit, InsightEngine, RawSample, ReportOptions, Severity, Thresholds,
    Window,
};

fn ts(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .expect("valid timestamp")
        .with_timezone(&Utc)
}

/// Nightscout entries export, newest first as the API returns them.
/// A steady fall from 120 to 62 over 35 minutes plus one meter reading.
fn falling_entries_json() -> &'static str {
    r#"[
  {"_id":"e8","sgv":62,"date":1768466100000,"dateString":"2026-01-15T08:35:00.000Z","direction":"SingleDown","type":"sgv","device":"share2","noise":1},
  {"_id":"e7","sgv":72,"date":1768465800000,"dateString":"2026-01-15T08:30:00.000Z","direction":"SingleDown","type":"sgv","device":"share2","noise":1},
  {"_id":"e6","sgv":82,"date":1768465500000,"dateString":"2026-01-15T08:25:00.000Z","direction":"FortyFiveDown","type":"sgv","device":"share2","noise":1},
  {"_id":"m1","mbg":85,"date":1768465400000,"dateString":"2026-01-15T08:23:20.000Z","type":"mbg","device":"meter"},
  {"_id":"e5","sgv":92,"date":1768465200000,"dateString":"2026-01-15T08:20:00.000Z","direction":"FortyFiveDown","type":"sgv","device":"share2","noise":1},
  {"_id":"e4","sgv":100,"date":1768464900000,"dateString":"2026-01-15T08:15:00.000Z","direction":"Flat","type":"sgv","device":"share2","noise":1},
  {"_id":"e3","sgv":108,"date":1768464600000,"dateString":"2026-01-15T08:10:00.000Z","direction":"Flat","type":"sgv","device":"share2","noise":1},
  {"_id":"e2","sgv":114,"date":1768464300000,"dateString":"2026-01-15T08:05:00.000Z","direction":"Flat","type":"sgv","device":"share2","noise":1},
  {"_id":"e1","sgv":120,"date":1768464000000,"dateString":"2026-01-15T08:00:00.000Z","direction":"Flat","type":"sgv","device":"share2","noise":1}
]"#
}

fn samples_every_5_min(values: &[f64], end: DateTime<Utc>) -> Vec<RawSample> {
    let n = values.len() as i64;
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| RawSample::mg_dl(v, end - Duration::minutes(5 * (n - 1 - i as i64))))
        .collect()
}

fn cycle(values: &[f64], now: DateTime<Utc>, previous: &CycleState) -> glyco_core::Insight {
    let config = EngineConfig::default();
    let normalized = normalize(&samples_every_5_min(values, now), now, &config.normalizer);
    let window = Window::from_config(normalized.readings, &config.window);
    analyze(&window, &config.thresholds, previous, &config, now)
}

// =============================================================================
// Nightscout Workflow
// =============================================================================

#[test]
fn test_nightscout_to_insight() {
    let entries = parse_entries(falling_entries_json().as_bytes()).expect("Failed to parse entries");
    assert_eq!(entries.len(), 9);

    let samples = to_raw_samples(&entries);
    assert_eq!(samples.len(), 8, "meter reading should be skipped");

    let config = EngineConfig::default();
    let now = ts("2026-01-15T08:36:00Z");
    let normalized = normalize(&samples, now, &config.normalizer);
    assert!(normalized.rejected.is_empty());
    assert_eq!(normalized.readings.len(), 8);

    let window = Window::from_config(normalized.readings, &config.window);
    // 30-minute horizon drops 08:00
    assert_eq!(window.len(), 7);

    let insight = analyze(&window, &config.thresholds, &CycleState::default(), &config, now);
    assert!(!insight.no_data);
    assert_eq!(insight.latest_value, Some(62.0));
    assert_eq!(insight.classification, Some(Classification::Low));
    assert!((insight.data_age_minutes.expect("age") - 1.0).abs() < 1e-9);

    // Last 15 minutes fall 2 mg/dL/min: falling, not rapid
    assert_eq!(insight.trend.direction, Direction::Falling);
    assert!((insight.trend.rate.expect("rate") + 2.0).abs() < 1e-9);

    let hypo = insight.event(EventKind::Hypo).expect("hypo event");
    assert_eq!(hypo.event.severity, Severity::Warning);
    assert!(!hypo.suppressed);

    // 62 - 2/min reaches 55 in 3.5 minutes
    let alert = insight
        .proactive
        .iter()
        .find(|a| a.boundary == Boundary::HypoUrgent)
        .expect("proactive hypo alert");
    assert!((alert.minutes_to_cross - 3.5).abs() < 1e-9);
}

#[test]
fn test_unit_conversion_through_pipeline() {
    let config = EngineConfig::default();
    let now = ts("2026-01-15T08:00:00Z");
    let samples = vec![RawSample::new(3.0, GlucoseUnit::MmolL, now)];

    let normalized = normalize(&samples, now, &config.normalizer);
    let window = Window::from_config(normalized.readings, &config.window);
    let insight = analyze(&window, &config.thresholds, &CycleState::default(), &config, now);

    // 3.0 mmol/L = 54.05 mg/dL: urgent low
    let hypo = insight.event(EventKind::Hypo).expect("hypo event");
    assert_eq!(hypo.event.severity, Severity::Urgent);
    assert!((hypo.event.value - 54.0546).abs() < 1e-9);
}

#[test]
fn test_rejected_samples_do_not_reach_the_window() {
    let config = EngineConfig::default();
    let now = ts("2026-01-15T08:00:00Z");
    let samples = vec![
        RawSample::mg_dl(110.0, now - Duration::minutes(5)),
        RawSample::mg_dl(-1.0, now - Duration::minutes(4)),
        RawSample::mg_dl(115.0, now + Duration::minutes(30)),
        RawSample::mg_dl(112.0, now),
    ];

    let normalized = normalize(&samples, now, &config.normalizer);
    assert_eq!(normalized.readings.len(), 2);
    let rejected: Vec<usize> = normalized.rejected.iter().map(|r| r.index).collect();
    assert_eq!(rejected, vec![1, 2]);
    assert!(matches!(normalized.rejected[0].error, Error::InvalidReading(_)));
    assert!(matches!(
        normalized.rejected[1].error,
        Error::ClockSkewReading { .. }
    ));
}

// =============================================================================
// Multi-cycle State
// =============================================================================

#[test]
fn test_hypo_episode_across_cycles() {
    let t0 = ts("2026-01-15T08:00:00Z");
    let mut state = CycleState::default();

    // Cycle 1: drifting into a low
    let first = cycle(&[76.0, 72.0, 68.0], t0, &state);
    let kinds: Vec<EventKind> = first.notifiable().map(|e| e.kind).collect();
    assert_eq!(kinds, vec![EventKind::Hypo]);
    state = first.state.clone();

    // Cycle 2: still low, same severity, inside the cool-down
    let second = cycle(&[80.0, 68.0, 66.0], t0 + Duration::minutes(5), &state);
    assert!(second.event(EventKind::Hypo).expect("hypo").suppressed);
    state = second.state.clone();

    // Cycle 3: no data arrives; state survives untouched
    let config = EngineConfig::default();
    let empty = analyze(
        &Window::empty(config.window.horizon()),
        &config.thresholds,
        &state,
        &config,
        t0 + Duration::minutes(10),
    );
    assert!(empty.no_data);
    assert_eq!(empty.state, state);

    // Cycle 4: back in range
    let recovered = cycle(&[66.0, 75.0, 85.0], t0 + Duration::minutes(15), &empty.state);
    let kinds: Vec<EventKind> = recovered.events.iter().map(|e| e.event.kind).collect();
    assert!(kinds.contains(&EventKind::Recovered));
    assert!(!kinds.contains(&EventKind::Hypo));
    assert_eq!(recovered.state.classification, Some(Classification::InRange));

    // Cycle 5: steady in range, nothing to say
    let quiet = cycle(&[85.0, 86.0, 86.0], t0 + Duration::minutes(20), &recovered.state);
    assert!(quiet.events.is_empty());
}

#[test]
fn test_parallel_streams_share_one_engine() {
    let engine = InsightEngine::new(&EngineConfig::default());
    let thresholds = Thresholds::default();
    let now = ts("2026-01-15T08:00:00Z");

    let windows: Vec<Window> = [[100.0, 101.0, 102.0], [260.0, 262.0, 265.0], [60.0, 52.0, 45.0]]
        .iter()
        .map(|values| {
            let normalized = normalize(
                &samples_every_5_min(values, now),
                now,
                &Default::default(),
            );
            Window::new(normalized.readings, Duration::minutes(30))
        })
        .collect();

    let states: Vec<CycleState> = vec![CycleState::default(); windows.len()];
    let results: Vec<_> = std::thread::scope(|s| {
        let handles: Vec<_> = windows
            .iter()
            .zip(&states)
            .map(|(w, st)| {
                let engine = &engine;
                let thresholds = &thresholds;
                s.spawn(move || engine.analyze(&AnalysisContext::new(w, thresholds, st, now)))
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("thread panicked"))
            .collect()
    });

    assert_eq!(results[0].classification, Some(Classification::InRange));
    assert_eq!(results[1].classification, Some(Classification::VeryHigh));
    assert_eq!(results[2].classification, Some(Classification::VeryLow));
    assert!(results[2].has_urgent());
}

// =============================================================================
// Properties
// =============================================================================

#[test]
fn test_normalize_is_idempotent() {
    let now = ts("2026-01-15T08:00:00Z");
    let config = EngineConfig::default();
    let samples = vec![
        RawSample::new(6.5, GlucoseUnit::MmolL, now - Duration::minutes(10)),
        RawSample::mg_dl(130.0, now - Duration::minutes(5)),
        RawSample::mg_dl(128.0, now - Duration::minutes(5)),
        RawSample::mg_dl(125.0, now),
    ];

    let once = normalize(&samples, now, &config.normalizer);
    let again_input: Vec<RawSample> = once.readings.iter().map(RawSample::from).collect();
    let twice = normalize(&again_input, now, &config.normalizer);

    assert_eq!(once.readings, twice.readings);
    assert_eq!(once.merged_duplicates, 1);
    assert_eq!(twice.merged_duplicates, 0);
}

#[test]
fn test_constant_and_rapid_trends() {
    let now = ts("2026-01-15T08:00:00Z");

    let flat = cycle(&[140.0, 140.0, 140.0, 140.0], now, &CycleState::default());
    assert_eq!(flat.trend.direction, Direction::Stable);
    assert!(flat.trend.rate.expect("rate").abs() < 1e-9);
    assert_eq!(flat.trend.confidence, 1.0);

    // +15 per 5 minutes = 3 mg/dL/min
    let rising = cycle(&[100.0, 115.0, 130.0, 145.0], now, &CycleState::default());
    assert_eq!(rising.trend.direction, Direction::RisingRapidly);
    assert!(rising.event(EventKind::RapidRise).is_some());
}

#[test]
fn test_invalid_threshold_order_fails_at_validation() {
    let err = EngineConfig::parse(
        r#"
        [thresholds]
        hypo_urgent = 54
        hypo_warning = 70
        hyper_warning = 50
        hyper_urgent = 250
        "#,
    )
    .expect_err("unordered thresholds must be rejected");
    assert!(matches!(err, Error::InvalidThresholdConfig(_)));

    assert!(matches!(
        Thresholds::new(54.0, 70.0, 50.0, 250.0),
        Err(Error::InvalidThresholdConfig(_))
    ));
}

// =============================================================================
// Report
// =============================================================================

#[test]
fn test_report_from_nightscout_entries() {
    let entries = parse_entries(falling_entries_json().as_bytes()).expect("Failed to parse entries");
    let samples = to_raw_samples(&entries);
    let now = ts("2026-01-15T09:00:00Z");
    let readings = normalize(&samples, now, &Default::default()).readings;

    let report = build_report(&readings, &Thresholds::default(), &ReportOptions::default())
        .expect("report for non-empty input");

    assert_eq!(report.statistics.count, 8);
    assert_eq!(report.statistics.max, 120.0);
    assert_eq!(report.statistics.min, 62.0);
    assert_eq!(report.start, ts("2026-01-15T08:00:00Z"));
    assert_eq!(report.end, ts("2026-01-15T08:35:00Z"));
    assert!((report.time_in_range.total() - 100.0).abs() < 1e-9);
    // 62 is the only reading under 70
    assert!((report.time_in_range.low_pct - 12.5).abs() < 1e-9);
    assert_eq!(report.hourly.len(), 1);
    assert_eq!(report.worst_days.len(), 1);
    assert_eq!(report.worst_days[0].low_count, 1);
}
