//! Retrospective glucose report
//!
//! Summary statistics over a batch of normalized readings: time in range,
//! GMI, variability, hourly and weekday patterns, problem times and the worst
//! days. Local hours and dates use a fixed UTC offset supplied by the caller.
//!
//! Readings can be narrowed before the report is built: a lookback of N days,
//! a single weekday and an inclusive range of local hours. [`day_view`] lists a
//! single local day reading by reading.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{
    DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveTime, Offset, Timelike, Utc,
    Weekday,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{Reading, Thresholds};

/// CV at or above this percentage is considered high variability
const CV_STABLE_BELOW: f64 = 36.0;

/// Weekday/hour slots below this time in range are problem times
const PROBLEM_TIR_BELOW: f64 = 70.0;

/// Slots with fewer readings are too thin to call a problem
const PROBLEM_MIN_READINGS: usize = 3;

const MAX_PROBLEM_TIMES: usize = 5;

const SPARK_CHARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Inclusive range of local hours
///
/// Wraps past midnight when `start > end`, so `22-06` covers the night.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourRange {
    start: u32,
    end: u32,
}

impl HourRange {
    pub fn new(start: u32, end: u32) -> Result<Self> {
        if start > 23 || end > 23 {
            return Err(Error::InvalidConfig(format!(
                "hours must be within 0..=23, got {}-{}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    pub fn contains(&self, hour: u32) -> bool {
        if self.start <= self.end {
            (self.start..=self.end).contains(&hour)
        } else {
            hour >= self.start || hour <= self.end
        }
    }
}

impl fmt::Display for HourRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:00-{:02}:00", self.start, self.end)
    }
}

impl FromStr for HourRange {
    type Err = String;

    /// Accepts `12-14` or `12:00-14:00`
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (start, end) = s
            .split_once('-')
            .ok_or_else(|| format!("Invalid hour range '{}' (expected e.g. 12-14)", s))?;
        let start = parse_hour(start)?;
        let end = parse_hour(end)?;
        HourRange::new(start, end).map_err(|e| e.to_string())
    }
}

fn parse_hour(s: &str) -> std::result::Result<u32, String> {
    let s = s.trim();
    let hour = match s.split_once(':') {
        Some((hour, "00")) => hour,
        Some(_) => return Err(format!("Hour ranges use whole hours, got '{}'", s)),
        None => s,
    };
    hour.parse().map_err(|_| format!("Invalid hour '{}'", s))
}

/// Full English name of a weekday
pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Report options
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Offset used to bucket readings into local hours and dates
    pub utc_offset: FixedOffset,
    /// Number of worst days to include
    pub worst_days: usize,
    /// Only the last `days` days before `as_of`
    pub days: Option<u32>,
    /// End of the lookback; the newest reading when unset
    pub as_of: Option<DateTime<Utc>>,
    /// Only readings on this local weekday
    pub weekday: Option<Weekday>,
    /// Only readings within these local hours
    pub hours: Option<HourRange>,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            utc_offset: Utc.fix(),
            worst_days: 5,
            days: None,
            as_of: None,
            weekday: None,
            hours: None,
        }
    }
}

impl ReportOptions {
    /// Set the local offset from a (possibly fractional) hour count
    pub fn with_utc_offset_hours(mut self, hours: f64) -> Result<Self> {
        let seconds = (hours * 3600.0).round();
        self.utc_offset = FixedOffset::east_opt(seconds as i32)
            .filter(|_| seconds.is_finite())
            .ok_or_else(|| Error::InvalidConfig(format!("UTC offset out of range: {}h", hours)))?;
        Ok(self)
    }

    pub fn with_worst_days(mut self, n: usize) -> Self {
        self.worst_days = n;
        self
    }

    pub fn with_days(mut self, days: u32) -> Self {
        self.days = Some(days);
        self
    }

    pub fn with_as_of(mut self, as_of: DateTime<Utc>) -> Self {
        self.as_of = Some(as_of);
        self
    }

    pub fn with_weekday(mut self, weekday: Weekday) -> Self {
        self.weekday = Some(weekday);
        self
    }

    pub fn with_hours(mut self, hours: HourRange) -> Self {
        self.hours = Some(hours);
        self
    }

    /// Human-readable description of the weekday and hour filters
    pub fn filter_label(&self) -> Option<String> {
        let mut parts = Vec::new();
        if let Some(weekday) = self.weekday {
            parts.push(format!("day={}", weekday_name(weekday)));
        }
        if let Some(hours) = self.hours {
            parts.push(format!("hours={}", hours));
        }
        (!parts.is_empty()).then(|| parts.join(", "))
    }

    /// Readings that pass the lookback, weekday and hour filters
    pub fn select(&self, readings: &[Reading]) -> Vec<Reading> {
        let lookback = self.days.and_then(|days| {
            let end = self
                .as_of
                .or_else(|| readings.iter().map(Reading::timestamp).max())?;
            Some((end - Duration::days(i64::from(days)), end))
        });

        readings
            .iter()
            .filter(|r| {
                lookback.map_or(true, |(from, to)| r.timestamp() >= from && r.timestamp() <= to)
            })
            .filter(|r| {
                let local = r.timestamp().with_timezone(&self.utc_offset);
                self.weekday.map_or(true, |w| local.weekday() == w)
                    && self.hours.map_or(true, |h| h.contains(local.hour()))
            })
            .cloned()
            .collect()
    }
}

/// Basic distribution statistics (mg/dL)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    /// Sample standard deviation; 0 with fewer than two values
    pub std_dev: f64,
}

impl Statistics {
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let n = sorted.len();
        let mean = sorted.iter().sum::<f64>() / n as f64;
        let median = if n % 2 == 0 {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        } else {
            sorted[n / 2]
        };
        let std_dev = if n < 2 {
            0.0
        } else {
            let var = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
            var.sqrt()
        };

        Some(Self {
            count: n,
            mean,
            median,
            min: sorted[0],
            max: sorted[n - 1],
            std_dev,
        })
    }
}

/// Report range bucket
///
/// Boundaries differ from [`crate::models::Classification`]: the target
/// limits and the urgent high limit count toward the milder bucket, while a
/// value at the urgent low limit is already low rather than very low.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeBucket {
    VeryLow,
    Low,
    InRange,
    High,
    VeryHigh,
}

impl RangeBucket {
    pub fn of(value: f64, thresholds: &Thresholds) -> Self {
        if value < thresholds.hypo_urgent() {
            Self::VeryLow
        } else if value < thresholds.hypo_warning() {
            Self::Low
        } else if value <= thresholds.hyper_warning() {
            Self::InRange
        } else if value <= thresholds.hyper_urgent() {
            Self::High
        } else {
            Self::VeryHigh
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VeryLow => "very_low",
            Self::Low => "low",
            Self::InRange => "in_range",
            Self::High => "high",
            Self::VeryHigh => "very_high",
        }
    }

    pub fn is_low(&self) -> bool {
        matches!(self, Self::VeryLow | Self::Low)
    }

    pub fn is_high(&self) -> bool {
        matches!(self, Self::High | Self::VeryHigh)
    }
}

impl fmt::Display for RangeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Percentage of readings per bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeInRange {
    pub very_low_pct: f64,
    pub low_pct: f64,
    pub in_range_pct: f64,
    pub high_pct: f64,
    pub very_high_pct: f64,
}

impl TimeInRange {
    pub fn from_values(values: &[f64], thresholds: &Thresholds) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let mut counts = [0usize; 5];
        for &v in values {
            let idx = match RangeBucket::of(v, thresholds) {
                RangeBucket::VeryLow => 0,
                RangeBucket::Low => 1,
                RangeBucket::InRange => 2,
                RangeBucket::High => 3,
                RangeBucket::VeryHigh => 4,
            };
            counts[idx] += 1;
        }

        let pct = |c: usize| c as f64 / values.len() as f64 * 100.0;
        Some(Self {
            very_low_pct: pct(counts[0]),
            low_pct: pct(counts[1]),
            in_range_pct: pct(counts[2]),
            high_pct: pct(counts[3]),
            very_high_pct: pct(counts[4]),
        })
    }

    pub fn total(&self) -> f64 {
        self.very_low_pct + self.low_pct + self.in_range_pct + self.high_pct + self.very_high_pct
    }

    pub fn below_pct(&self) -> f64 {
        self.very_low_pct + self.low_pct
    }

    pub fn above_pct(&self) -> f64 {
        self.high_pct + self.very_high_pct
    }
}

/// Glucose Management Indicator (estimated A1c, %) from a mean in mg/dL
pub fn gmi(mean_mg_dl: f64) -> f64 {
    3.31 + 0.02392 * mean_mg_dl
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariabilityStatus {
    Stable,
    HighVariability,
}

impl VariabilityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stable => "stable",
            Self::HighVariability => "high variability",
        }
    }
}

impl fmt::Display for VariabilityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Coefficient of variation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variability {
    pub cv_percent: f64,
    pub status: VariabilityStatus,
}

impl Variability {
    pub fn from_statistics(stats: &Statistics) -> Self {
        let cv_percent = if stats.mean > 0.0 {
            stats.std_dev / stats.mean * 100.0
        } else {
            0.0
        };
        let status = if cv_percent < CV_STABLE_BELOW {
            VariabilityStatus::Stable
        } else {
            VariabilityStatus::HighVariability
        };
        Self { cv_percent, status }
    }
}

/// Average glucose for one local hour of the day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyAverage {
    /// 0..=23 in the report's offset
    pub hour: u32,
    pub mean: f64,
    pub count: usize,
    pub in_range_pct: f64,
}

/// Average glucose for one local weekday
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekdayAverage {
    pub weekday: Weekday,
    pub mean: f64,
    pub count: usize,
    pub in_range_pct: f64,
}

/// A weekday and hour that is regularly out of range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemTime {
    pub weekday: Weekday,
    pub hour: u32,
    pub readings: usize,
    pub mean: f64,
    pub in_range_pct: f64,
    pub low_pct: f64,
    pub high_pct: f64,
}

impl ProblemTime {
    /// Lows outnumber highs in this slot
    pub fn is_mostly_low(&self) -> bool {
        self.low_pct > self.high_pct
    }
}

/// Summary of one local day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub peak: f64,
    pub trough: f64,
    pub average: f64,
    pub in_range_pct: f64,
    pub high_count: usize,
    pub low_count: usize,
    pub readings: usize,
}

/// Full retrospective report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Weekday and hour filters that narrowed the readings
    pub filter: Option<String>,
    pub statistics: Statistics,
    pub time_in_range: TimeInRange,
    pub gmi: f64,
    pub variability: Variability,
    /// Only hours that have readings, ascending
    pub hourly: Vec<HourlyAverage>,
    pub best_hour: Option<u32>,
    pub worst_hour: Option<u32>,
    /// Only weekdays that have readings, Monday first
    pub weekdays: Vec<WeekdayAverage>,
    pub best_weekday: Option<Weekday>,
    pub worst_weekday: Option<Weekday>,
    /// Lowest time in range first
    pub problem_times: Vec<ProblemTime>,
    /// Highest peak first
    pub worst_days: Vec<DaySummary>,
}

/// Build a report; `None` when no readings pass the options' filters
pub fn build_report(
    readings: &[Reading],
    thresholds: &Thresholds,
    options: &ReportOptions,
) -> Option<Report> {
    let readings = options.select(readings);
    let values: Vec<f64> = readings.iter().map(Reading::value).collect();
    let statistics = Statistics::from_values(&values)?;
    let time_in_range = TimeInRange::from_values(&values, thresholds)?;
    let start = readings.iter().map(Reading::timestamp).min()?;
    let end = readings.iter().map(Reading::timestamp).max()?;
    let offset = options.utc_offset;

    let hourly = hourly_averages(&readings, thresholds, offset);
    // Ties resolve to the earliest hour
    let best_hour = hourly
        .iter()
        .rev()
        .max_by(|a, b| a.in_range_pct.total_cmp(&b.in_range_pct))
        .map(|h| h.hour);
    let worst_hour = hourly
        .iter()
        .min_by(|a, b| a.in_range_pct.total_cmp(&b.in_range_pct))
        .map(|h| h.hour);

    let weekdays = weekday_averages(&readings, thresholds, offset);
    let best_weekday = weekdays
        .iter()
        .rev()
        .max_by(|a, b| a.in_range_pct.total_cmp(&b.in_range_pct))
        .map(|d| d.weekday);
    let worst_weekday = weekdays
        .iter()
        .min_by(|a, b| a.in_range_pct.total_cmp(&b.in_range_pct))
        .map(|d| d.weekday);

    let problem_times = problem_times(&readings, thresholds, offset);

    let mut worst_days = day_summaries(&readings, thresholds, offset);
    worst_days.sort_by(|a, b| b.peak.total_cmp(&a.peak).then_with(|| a.date.cmp(&b.date)));
    worst_days.truncate(options.worst_days);

    debug!(
        readings = statistics.count,
        mean = statistics.mean,
        hours = hourly.len(),
        problem_times = problem_times.len(),
        "Built glucose report"
    );

    Some(Report {
        start,
        end,
        filter: options.filter_label(),
        gmi: gmi(statistics.mean),
        variability: Variability::from_statistics(&statistics),
        statistics,
        time_in_range,
        hourly,
        best_hour,
        worst_hour,
        weekdays,
        best_weekday,
        worst_weekday,
        problem_times,
        worst_days,
    })
}

fn in_range_pct(values: &[f64], thresholds: &Thresholds) -> f64 {
    TimeInRange::from_values(values, thresholds).map_or(0.0, |t| t.in_range_pct)
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

pub fn hourly_averages(
    readings: &[Reading],
    thresholds: &Thresholds,
    offset: FixedOffset,
) -> Vec<HourlyAverage> {
    let mut by_hour: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
    for r in readings {
        let hour = r.timestamp().with_timezone(&offset).hour();
        by_hour.entry(hour).or_default().push(r.value());
    }

    by_hour
        .into_iter()
        .map(|(hour, values)| HourlyAverage {
            hour,
            mean: mean(&values),
            count: values.len(),
            in_range_pct: in_range_pct(&values, thresholds),
        })
        .collect()
}

pub fn weekday_averages(
    readings: &[Reading],
    thresholds: &Thresholds,
    offset: FixedOffset,
) -> Vec<WeekdayAverage> {
    let mut by_day: BTreeMap<u32, (Weekday, Vec<f64>)> = BTreeMap::new();
    for r in readings {
        let weekday = r.timestamp().with_timezone(&offset).weekday();
        by_day
            .entry(weekday.num_days_from_monday())
            .or_insert_with(|| (weekday, Vec::new()))
            .1
            .push(r.value());
    }

    by_day
        .into_values()
        .map(|(weekday, values)| WeekdayAverage {
            weekday,
            mean: mean(&values),
            count: values.len(),
            in_range_pct: in_range_pct(&values, thresholds),
        })
        .collect()
}

/// Weekday/hour slots with enough readings and a poor time in range
pub fn problem_times(
    readings: &[Reading],
    thresholds: &Thresholds,
    offset: FixedOffset,
) -> Vec<ProblemTime> {
    let mut slots: BTreeMap<(u32, u32), (Weekday, Vec<f64>)> = BTreeMap::new();
    for r in readings {
        let local = r.timestamp().with_timezone(&offset);
        let weekday = local.weekday();
        slots
            .entry((weekday.num_days_from_monday(), local.hour()))
            .or_insert_with(|| (weekday, Vec::new()))
            .1
            .push(r.value());
    }

    let mut problems: Vec<ProblemTime> = slots
        .into_iter()
        .filter(|(_, (_, values))| values.len() >= PROBLEM_MIN_READINGS)
        .filter_map(|((_, hour), (weekday, values))| {
            let tir = TimeInRange::from_values(&values, thresholds)?;
            (tir.in_range_pct < PROBLEM_TIR_BELOW).then(|| ProblemTime {
                weekday,
                hour,
                readings: values.len(),
                mean: mean(&values),
                in_range_pct: tir.in_range_pct,
                low_pct: tir.below_pct(),
                high_pct: tir.above_pct(),
            })
        })
        .collect();

    // Stable sort keeps weekday/hour order among equal slots
    problems.sort_by(|a, b| a.in_range_pct.total_cmp(&b.in_range_pct));
    problems.truncate(MAX_PROBLEM_TIMES);
    problems
}

pub fn day_summaries(
    readings: &[Reading],
    thresholds: &Thresholds,
    offset: FixedOffset,
) -> Vec<DaySummary> {
    let mut by_day: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
    for r in readings {
        let date = r.timestamp().with_timezone(&offset).date_naive();
        by_day.entry(date).or_default().push(r.value());
    }

    by_day
        .into_iter()
        .map(|(date, values)| {
            let buckets: Vec<RangeBucket> =
                values.iter().map(|&v| RangeBucket::of(v, thresholds)).collect();
            DaySummary {
                date,
                peak: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                trough: values.iter().copied().fold(f64::INFINITY, f64::min),
                average: mean(&values),
                in_range_pct: in_range_pct(&values, thresholds),
                high_count: buckets.iter().filter(|b| b.is_high()).count(),
                low_count: buckets.iter().filter(|b| b.is_low()).count(),
                readings: values.len(),
            }
        })
        .collect()
}

/// One reading in a day view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayReading {
    /// Local time of day
    pub time: NaiveTime,
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    pub status: RangeBucket,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayStatistics {
    pub count: usize,
    pub average: f64,
    pub min: f64,
    pub max: f64,
    pub in_range_pct: f64,
    /// Local time of the first reading at the maximum
    pub peak_time: NaiveTime,
    /// Local time of the first reading at the minimum
    pub trough_time: NaiveTime,
}

/// Readings of a single local day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayView {
    pub date: NaiveDate,
    pub filter: Option<String>,
    /// Oldest first
    pub readings: Vec<DayReading>,
    /// `None` when the day has no readings
    pub statistics: Option<DayStatistics>,
}

/// List one local day, optionally narrowed to a range of hours
pub fn day_view(
    readings: &[Reading],
    date: NaiveDate,
    thresholds: &Thresholds,
    offset: FixedOffset,
    hours: Option<HourRange>,
) -> DayView {
    let mut day: Vec<DayReading> = readings
        .iter()
        .filter_map(|r| {
            let local = r.timestamp().with_timezone(&offset);
            let wanted = local.date_naive() == date
                && hours.map_or(true, |h| h.contains(local.hour()));
            wanted.then(|| DayReading {
                time: local.time(),
                timestamp: r.timestamp(),
                value: r.value(),
                status: RangeBucket::of(r.value(), thresholds),
            })
        })
        .collect();
    day.sort_by_key(|r| r.timestamp);

    let statistics = day_statistics(&day, thresholds);
    debug!(%date, readings = day.len(), "Built day view");

    DayView {
        date,
        filter: hours.map(|h| format!("hours={}", h)),
        readings: day,
        statistics,
    }
}

fn day_statistics(day: &[DayReading], thresholds: &Thresholds) -> Option<DayStatistics> {
    let first = day.first()?;
    let mut peak = first;
    let mut trough = first;
    for r in day {
        if r.value > peak.value {
            peak = r;
        }
        if r.value < trough.value {
            trough = r;
        }
    }

    let values: Vec<f64> = day.iter().map(|r| r.value).collect();
    Some(DayStatistics {
        count: values.len(),
        average: mean(&values),
        min: trough.value,
        max: peak.value,
        in_range_pct: in_range_pct(&values, thresholds),
        peak_time: peak.time,
        trough_time: trough.time,
    })
}

/// Resolve a day argument against `today`
///
/// Accepts `today`, `yesterday`, `YYYY-MM-DD`, `MM/DD/YYYY`, `MM/DD`,
/// `Jan 15` and `January 15`, case-insensitively. Dates without a year take
/// the most recent occurrence that is not after `today`.
pub fn parse_day(input: &str, today: NaiveDate) -> Result<NaiveDate> {
    let s = input.trim().to_lowercase();
    let invalid = || Error::InvalidDate(input.trim().to_string());

    match s.as_str() {
        "today" => return Ok(today),
        "yesterday" => return today.pred_opt().ok_or_else(invalid),
        _ => {}
    }

    for format in ["%Y-%m-%d", "%m/%d/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(&s, format) {
            return Ok(date);
        }
    }

    let with_year = format!("{} {}", s, today.year());
    for format in ["%b %d %Y", "%B %d %Y", "%m/%d %Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(&with_year, format) {
            if date > today {
                return Ok(date.with_year(today.year() - 1).unwrap_or(date));
            }
            return Ok(date);
        }
    }

    Err(invalid())
}

/// One block character per value, scaled between the series min and max
pub fn sparkline(values: &[f64]) -> String {
    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let span = max - min;

    values
        .iter()
        .map(|&v| {
            if span <= 0.0 {
                SPARK_CHARS[SPARK_CHARS.len() / 2]
            } else {
                let idx = ((v - min) / span * (SPARK_CHARS.len() - 1) as f64).round() as usize;
                SPARK_CHARS[idx.min(SPARK_CHARS.len() - 1)]
            }
        })
        .collect()
}
