//! Event detection
//!
//! Classifies the latest reading against the thresholds and emits:
//! - `hypo` / `hyper` with warning or urgent severity (never both)
//! - `rapid_rise` / `rapid_fall` from a confident rapid trend, regardless of value
//! - `recovered` when the previous cycle was out of range and this one is not
//!
//! The detector keeps no state; the previous classification is an argument.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Classification, Reading, Thresholds};
use crate::trend::{Direction, TrendResult};

/// Detection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Minimum trend confidence for rapid-change events
    pub rapid_min_confidence: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            rapid_min_confidence: 0.5,
        }
    }
}

/// Kind of glucose event
///
/// Declaration order is the presentation order within one severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Hypo,
    Hyper,
    RapidRise,
    RapidFall,
    Recovered,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hypo => "hypo",
            Self::Hyper => "hyper",
            Self::RapidRise => "rapid_rise",
            Self::RapidFall => "rapid_fall",
            Self::Recovered => "recovered",
        }
    }

    pub fn all() -> &'static [EventKind] {
        &[
            Self::Hypo,
            Self::Hyper,
            Self::RapidRise,
            Self::RapidFall,
            Self::Recovered,
        ]
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hypo" => Ok(Self::Hypo),
            "hyper" => Ok(Self::Hyper),
            "rapid_rise" => Ok(Self::RapidRise),
            "rapid_fall" => Ok(Self::RapidFall),
            "recovered" => Ok(Self::Recovered),
            _ => Err(format!("Unknown event kind: {}", s)),
        }
    }
}

/// Severity of an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Urgent,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Urgent => "urgent",
        }
    }

    /// Numeric priority for sorting (higher = more urgent)
    pub fn priority(&self) -> u8 {
        match self {
            Self::Warning => 1,
            Self::Urgent => 2,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "warning" => Ok(Self::Warning),
            "urgent" => Ok(Self::Urgent),
            _ => Err(format!("Unknown severity: {}", s)),
        }
    }
}

/// A detected event; recomputed every cycle, never stored by the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub kind: EventKind,
    pub severity: Severity,
    /// mg/dL value that triggered the event
    pub value: f64,
    pub timestamp: DateTime<Utc>,
}

impl Event {
    pub fn new(kind: EventKind, severity: Severity, value: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            kind,
            severity,
            value,
            timestamp,
        }
    }
}

/// Sort events urgent-first, then by kind
pub fn sort_events(events: &mut [Event]) {
    events.sort_by(|a, b| {
        b.severity
            .priority()
            .cmp(&a.severity.priority())
            .then_with(|| a.kind.cmp(&b.kind))
    });
}

/// Output of one detection pass
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub events: Vec<Event>,
    /// Classification of the latest reading; feed it back as `previous` next cycle
    pub classification: Classification,
}

#[derive(Debug, Clone, Default)]
pub struct EventDetector {
    config: DetectionConfig,
}

impl EventDetector {
    pub fn new(config: DetectionConfig) -> Self {
        Self { config }
    }

    pub fn detect(
        &self,
        latest: &Reading,
        trend: &TrendResult,
        thresholds: &Thresholds,
        previous: Option<Classification>,
    ) -> Detection {
        let value = latest.value();
        let ts = latest.timestamp();
        let classification = thresholds.classify(value);
        let mut events = Vec::new();

        match classification {
            Classification::VeryLow => {
                events.push(Event::new(EventKind::Hypo, Severity::Urgent, value, ts))
            }
            Classification::Low => {
                events.push(Event::new(EventKind::Hypo, Severity::Warning, value, ts))
            }
            Classification::High => {
                events.push(Event::new(EventKind::Hyper, Severity::Warning, value, ts))
            }
            Classification::VeryHigh => {
                events.push(Event::new(EventKind::Hyper, Severity::Urgent, value, ts))
            }
            Classification::InRange => {}
        }

        if trend.confidence >= self.config.rapid_min_confidence {
            match trend.direction {
                Direction::RisingRapidly => {
                    events.push(Event::new(EventKind::RapidRise, Severity::Warning, value, ts))
                }
                Direction::FallingRapidly => {
                    events.push(Event::new(EventKind::RapidFall, Severity::Warning, value, ts))
                }
                _ => {}
            }
        }

        let was_out_of_range = previous.is_some_and(|p| p.is_low() || p.is_high());
        if was_out_of_range && classification.is_in_range() {
            events.push(Event::new(EventKind::Recovered, Severity::Warning, value, ts));
        }

        sort_events(&mut events);

        Detection {
            events,
            classification,
        }
    }
}
