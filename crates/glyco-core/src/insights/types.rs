//! Core types for the Insight Engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::detect::{Event, EventKind, Severity};
use crate::forecast::{Boundary, Projection};
use crate::models::Classification;
use crate::trend::TrendResult;

/// Record of an event that was surfaced to the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub kind: EventKind,
    pub severity: Severity,
    pub notified_at: DateTime<Utc>,
}

/// State carried from one analysis cycle to the next
///
/// The engine never stores this; callers pass the previous cycle's state in
/// and keep the one returned in [`Insight::state`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CycleState {
    /// Classification of the latest reading in the previous cycle
    #[serde(default)]
    pub classification: Option<Classification>,
    /// Events present in the previous cycle and when they were last notified
    #[serde(default)]
    pub notifications: Vec<Notification>,
}

impl CycleState {
    /// State with only a previous classification
    pub fn with_classification(classification: Classification) -> Self {
        Self {
            classification: Some(classification),
            notifications: Vec::new(),
        }
    }

    pub fn notification(&self, kind: EventKind) -> Option<&Notification> {
        self.notifications.iter().find(|n| n.kind == kind)
    }
}

/// An event as it appears in an insight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightEvent {
    #[serde(flatten)]
    pub event: Event,
    /// Presentation hint: already notified within the cool-down
    pub suppressed: bool,
}

/// A threshold the projection says will be crossed soon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProactiveAlert {
    pub boundary: Boundary,
    pub threshold: f64,
    pub minutes_to_cross: f64,
    pub projected_value: f64,
}

/// Output of one analysis cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub generated_at: DateTime<Utc>,
    /// The window was empty; everything else is a safe default
    pub no_data: bool,
    pub trend: TrendResult,
    /// Latest glucose value in mg/dL
    pub latest_value: Option<f64>,
    pub latest_at: Option<DateTime<Utc>>,
    /// Minutes between the latest reading and `generated_at`
    pub data_age_minutes: Option<f64>,
    /// The latest reading is older than the window horizon
    #[serde(default)]
    pub stale: bool,
    pub classification: Option<Classification>,
    /// Urgent first, then hypo, hyper, rapid rise, rapid fall, recovered
    pub events: Vec<InsightEvent>,
    pub prediction: Option<Projection>,
    pub proactive: Vec<ProactiveAlert>,
    /// Pass this back as the previous state next cycle
    pub state: CycleState,
}

impl Insight {
    /// Insight for an empty window; the previous state carries over unchanged
    pub fn no_data(generated_at: DateTime<Utc>, previous: &CycleState) -> Self {
        Self {
            generated_at,
            no_data: true,
            trend: TrendResult::insufficient(0),
            latest_value: None,
            latest_at: None,
            data_age_minutes: None,
            stale: false,
            classification: None,
            events: Vec::new(),
            prediction: None,
            proactive: Vec::new(),
            state: previous.clone(),
        }
    }

    /// Projected value at the forecast horizon
    pub fn predicted_value(&self) -> Option<f64> {
        self.prediction.as_ref().map(|p| p.value)
    }

    /// Events that should be surfaced to the user now
    pub fn notifiable(&self) -> impl Iterator<Item = &Event> {
        self.events
            .iter()
            .filter(|e| !e.suppressed)
            .map(|e| &e.event)
    }

    pub fn has_urgent(&self) -> bool {
        self.events
            .iter()
            .any(|e| e.event.severity == Severity::Urgent)
    }

    pub fn event(&self, kind: EventKind) -> Option<&InsightEvent> {
        self.events.iter().find(|e| e.event.kind == kind)
    }
}
