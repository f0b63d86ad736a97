//! Insight Engine - runs one analysis cycle over a window

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::detect::EventDetector;
use crate::forecast::Extrapolator;
use crate::models::Thresholds;
use crate::trend::TrendEstimator;
use crate::window::Window;

use super::types::{CycleState, Insight, InsightEvent, Notification, ProactiveAlert};

/// Aggregator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightConfig {
    /// Identical events notified within this many minutes are marked suppressed
    pub cooldown_minutes: u32,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            cooldown_minutes: 15,
        }
    }
}

impl InsightConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::minutes(i64::from(self.cooldown_minutes))
    }
}

/// Inputs for one analysis cycle
pub struct AnalysisContext<'a> {
    /// Normalized readings for the cycle
    pub window: &'a Window,
    pub thresholds: &'a Thresholds,
    /// State returned by the previous cycle (default for the first one)
    pub previous: &'a CycleState,
    /// Wall clock for this cycle
    pub now: DateTime<Utc>,
}

impl<'a> AnalysisContext<'a> {
    pub fn new(
        window: &'a Window,
        thresholds: &'a Thresholds,
        previous: &'a CycleState,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            window,
            thresholds,
            previous,
            now,
        }
    }
}

/// Composes trend, detection and forecast into a single insight
///
/// The engine holds configuration only, so one instance can serve any number
/// of independent streams concurrently.
#[derive(Debug, Clone, Default)]
pub struct InsightEngine {
    trend: TrendEstimator,
    detector: EventDetector,
    extrapolator: Extrapolator,
    config: InsightConfig,
}

impl InsightEngine {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            trend: TrendEstimator::new(config.trend.clone()),
            detector: EventDetector::new(config.detection.clone()),
            extrapolator: Extrapolator::new(config.forecast.clone()),
            config: config.insights.clone(),
        }
    }

    pub fn analyze(&self, ctx: &AnalysisContext<'_>) -> Insight {
        let Some(latest) = ctx.window.latest() else {
            tracing::debug!("Empty window, emitting no-data insight");
            return Insight::no_data(ctx.now, ctx.previous);
        };

        let trend = self.trend.estimate(ctx.window);
        let detection = self.detector.detect(
            latest,
            &trend,
            ctx.thresholds,
            ctx.previous.classification,
        );
        let prediction = self
            .extrapolator
            .project(&trend, latest.value(), ctx.thresholds);

        let cooldown = self.config.cooldown();
        let mut notifications = Vec::with_capacity(detection.events.len());
        let events: Vec<InsightEvent> = detection
            .events
            .into_iter()
            .map(|event| {
                let recent = ctx.previous.notification(event.kind).filter(|n| {
                    n.severity == event.severity && ctx.now - n.notified_at < cooldown
                });
                let (suppressed, notified_at) = match recent {
                    Some(n) => (true, n.notified_at),
                    None => (false, ctx.now),
                };
                notifications.push(Notification {
                    kind: event.kind,
                    severity: event.severity,
                    notified_at,
                });
                InsightEvent { event, suppressed }
            })
            .collect();

        let age = ctx.now - latest.timestamp();
        let stale = age > ctx.window.horizon();
        if stale {
            tracing::warn!(
                latest_at = %latest.timestamp(),
                age_minutes = age.num_minutes(),
                "Latest reading is older than the analysis window"
            );
        }

        // Low-confidence or stale projections are informational only
        let proactive: Vec<ProactiveAlert> = if prediction.low_confidence || stale {
            Vec::new()
        } else {
            prediction
                .crossings
                .iter()
                .map(|c| ProactiveAlert {
                    boundary: c.boundary,
                    threshold: c.threshold,
                    minutes_to_cross: c.minutes_to_cross,
                    projected_value: prediction.value,
                })
                .collect()
        };

        let data_age = age.num_milliseconds() as f64 / 60_000.0;

        tracing::debug!(
            value = latest.value(),
            direction = trend.direction.as_str(),
            classification = detection.classification.as_str(),
            events = events.len(),
            suppressed = events.iter().filter(|e| e.suppressed).count(),
            proactive = proactive.len(),
            stale,
            "Analysis cycle complete"
        );

        Insight {
            generated_at: ctx.now,
            no_data: false,
            trend,
            latest_value: Some(latest.value()),
            latest_at: Some(latest.timestamp()),
            data_age_minutes: Some(data_age),
            stale,
            classification: Some(detection.classification),
            events,
            prediction: Some(prediction),
            proactive,
            state: CycleState {
                classification: Some(detection.classification),
                notifications,
            },
        }
    }
}

/// Run one analysis cycle with a throwaway engine
pub fn analyze(
    window: &Window,
    thresholds: &Thresholds,
    previous: &CycleState,
    config: &EngineConfig,
    now: DateTime<Utc>,
) -> Insight {
    InsightEngine::new(config).analyze(&AnalysisContext::new(window, thresholds, previous, now))
}
