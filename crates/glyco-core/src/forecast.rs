//! Predictive extrapolation
//!
//! Projects the latest value forward along the current rate and reports which
//! thresholds the projection crosses and roughly when.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::Thresholds;
use crate::trend::TrendResult;

/// Extrapolator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    pub horizon_minutes: f64,
    /// Lower bound of the physiologically plausible range (mg/dL)
    pub plausible_min: f64,
    /// Upper bound of the physiologically plausible range (mg/dL)
    pub plausible_max: f64,
    /// Trend confidence below which a projection is tagged low-confidence
    pub low_confidence_below: f64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            horizon_minutes: 20.0,
            plausible_min: 20.0,
            plausible_max: 600.0,
            low_confidence_below: 0.3,
        }
    }
}

/// A threshold that can be crossed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Boundary {
    HypoUrgent,
    HypoWarning,
    HyperWarning,
    HyperUrgent,
}

impl Boundary {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HypoUrgent => "hypo_urgent",
            Self::HypoWarning => "hypo_warning",
            Self::HyperWarning => "hyper_warning",
            Self::HyperUrgent => "hyper_urgent",
        }
    }

    pub fn all() -> &'static [Boundary] {
        &[
            Self::HypoUrgent,
            Self::HypoWarning,
            Self::HyperWarning,
            Self::HyperUrgent,
        ]
    }

    pub fn is_hypo(&self) -> bool {
        matches!(self, Self::HypoUrgent | Self::HypoWarning)
    }

    pub fn value(&self, thresholds: &Thresholds) -> f64 {
        match self {
            Self::HypoUrgent => thresholds.hypo_urgent(),
            Self::HypoWarning => thresholds.hypo_warning(),
            Self::HyperWarning => thresholds.hyper_warning(),
            Self::HyperUrgent => thresholds.hyper_urgent(),
        }
    }

    /// Whether `value` is already past this boundary
    fn is_crossed_by(&self, value: f64, thresholds: &Thresholds) -> bool {
        let limit = self.value(thresholds);
        if self.is_hypo() {
            value <= limit
        } else {
            value >= limit
        }
    }
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A boundary the projection is expected to cross within the horizon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdCrossing {
    pub boundary: Boundary,
    pub threshold: f64,
    /// Linear estimate of time until the boundary is reached
    pub minutes_to_cross: f64,
}

/// Projected glucose at the forecast horizon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    /// Projected value clamped to the plausible range (mg/dL)
    pub value: f64,
    /// Unclamped projection
    pub raw_value: f64,
    pub horizon_minutes: f64,
    /// Raw projection fell outside the plausible range and was clamped
    pub out_of_plausible_range: bool,
    /// Trend confidence was too low to trust the projection
    pub low_confidence: bool,
    /// Crossings ordered by time to cross
    pub crossings: Vec<ThresholdCrossing>,
}

impl Projection {
    pub fn will_cross(&self, boundary: Boundary) -> bool {
        self.crossings.iter().any(|c| c.boundary == boundary)
    }

    pub fn crossing(&self, boundary: Boundary) -> Option<&ThresholdCrossing> {
        self.crossings.iter().find(|c| c.boundary == boundary)
    }

    pub fn earliest_crossing(&self) -> Option<&ThresholdCrossing> {
        self.crossings.first()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Extrapolator {
    config: ForecastConfig,
}

impl Extrapolator {
    pub fn new(config: ForecastConfig) -> Self {
        Self { config }
    }

    pub fn project(&self, trend: &TrendResult, latest: f64, thresholds: &Thresholds) -> Projection {
        let horizon = self.config.horizon_minutes;
        let low_confidence = trend.confidence < self.config.low_confidence_below;

        let Some(rate) = trend.rate else {
            return Projection {
                value: latest.clamp(self.config.plausible_min, self.config.plausible_max),
                raw_value: latest,
                horizon_minutes: horizon,
                out_of_plausible_range: !self.is_plausible(latest),
                low_confidence: true,
                crossings: Vec::new(),
            };
        };

        let raw_value = latest + rate * horizon;
        let value = raw_value.clamp(self.config.plausible_min, self.config.plausible_max);

        let mut crossings: Vec<ThresholdCrossing> = Boundary::all()
            .iter()
            .filter(|b| !b.is_crossed_by(latest, thresholds) && b.is_crossed_by(raw_value, thresholds))
            .filter_map(|&boundary| {
                let threshold = boundary.value(thresholds);
                let minutes = (threshold - latest) / rate;
                (minutes.is_finite() && minutes >= 0.0).then_some(ThresholdCrossing {
                    boundary,
                    threshold,
                    minutes_to_cross: minutes,
                })
            })
            .collect();
        crossings.sort_by(|a, b| a.minutes_to_cross.total_cmp(&b.minutes_to_cross));

        Projection {
            value,
            raw_value,
            horizon_minutes: horizon,
            out_of_plausible_range: !self.is_plausible(raw_value),
            low_confidence,
            crossings,
        }
    }

    fn is_plausible(&self, value: f64) -> bool {
        (self.config.plausible_min..=self.config.plausible_max).contains(&value)
    }
}
