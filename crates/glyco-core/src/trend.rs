//! Trend estimation
//!
//! Rate of change is the least-squares slope (mg/dL per minute) of the
//! non-calibrating readings in the last `lookback_minutes` of the window.
//! The slope is mapped to a [`Direction`] with two breakpoints:
//!
//! ```text
//! |rate| <  stable_below             -> stable
//! stable_below <= |rate| <= rapid_above -> rising / falling
//! |rate| >  rapid_above              -> rising_rapidly / falling_rapidly
//! ```
//!
//! With fewer than two usable samples the rate is undefined, confidence is 0
//! and the direction is reported as stable.

use std::fmt;
use std::str::FromStr;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::models::Reading;
use crate::window::Window;

/// Trend estimator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendConfig {
    /// Only readings this recent (relative to the newest) feed the slope
    pub lookback_minutes: u32,
    /// Below this |rate| the trend is stable (mg/dL/min)
    pub stable_below: f64,
    /// Above this |rate| the trend is rapid (mg/dL/min)
    pub rapid_above: f64,
    /// Sample count at which confidence reaches 1.0
    pub min_required_samples: usize,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            lookback_minutes: 15,
            stable_below: 1.0,
            rapid_above: 2.0,
            min_required_samples: 3,
        }
    }
}

impl TrendConfig {
    pub fn lookback(&self) -> Duration {
        Duration::minutes(i64::from(self.lookback_minutes))
    }
}

/// Direction of the glucose trend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    Stable,
    Rising,
    Falling,
    RisingRapidly,
    FallingRapidly,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stable => "stable",
            Self::Rising => "rising",
            Self::Falling => "falling",
            Self::RisingRapidly => "rising_rapidly",
            Self::FallingRapidly => "falling_rapidly",
        }
    }

    pub fn is_rapid(&self) -> bool {
        matches!(self, Self::RisingRapidly | Self::FallingRapidly)
    }

    /// Nightscout arrow name for this direction
    pub fn nightscout_arrow(&self) -> &'static str {
        match self {
            Self::Stable => "Flat",
            Self::Rising => "FortyFiveUp",
            Self::Falling => "FortyFiveDown",
            Self::RisingRapidly => "SingleUp",
            Self::FallingRapidly => "SingleDown",
        }
    }

    /// Parse a Nightscout arrow name
    ///
    /// `NONE`, `NOT COMPUTABLE` and `RATE OUT OF RANGE` have no direction.
    pub fn from_nightscout(arrow: &str) -> Option<Self> {
        match arrow {
            "Flat" => Some(Self::Stable),
            "FortyFiveUp" => Some(Self::Rising),
            "FortyFiveDown" => Some(Self::Falling),
            "SingleUp" | "DoubleUp" | "TripleUp" => Some(Self::RisingRapidly),
            "SingleDown" | "DoubleDown" | "TripleDown" => Some(Self::FallingRapidly),
            _ => None,
        }
    }

    /// Unicode arrow for compact display
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Stable => "→",
            Self::Rising => "↗",
            Self::Falling => "↘",
            Self::RisingRapidly => "↑",
            Self::FallingRapidly => "↓",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stable" => Ok(Self::Stable),
            "rising" => Ok(Self::Rising),
            "falling" => Ok(Self::Falling),
            "rising_rapidly" => Ok(Self::RisingRapidly),
            "falling_rapidly" => Ok(Self::FallingRapidly),
            _ => Err(format!("Unknown direction: {}", s)),
        }
    }
}

/// Output of the trend estimator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendResult {
    pub direction: Direction,
    /// mg/dL per minute; `None` when fewer than two usable samples exist
    pub rate: Option<f64>,
    /// 0.0..=1.0, derived from the number of usable samples
    pub confidence: f64,
    /// Number of readings that fed the rate
    pub sample_count: usize,
}

impl TrendResult {
    /// Result for a window without enough data
    pub fn insufficient(sample_count: usize) -> Self {
        Self {
            direction: Direction::Stable,
            rate: None,
            confidence: 0.0,
            sample_count,
        }
    }

    pub fn has_rate(&self) -> bool {
        self.rate.is_some()
    }
}

/// Stateless trend estimator
#[derive(Debug, Clone, Default)]
pub struct TrendEstimator {
    config: TrendConfig,
}

impl TrendEstimator {
    pub fn new(config: TrendConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrendConfig {
        &self.config
    }

    pub fn estimate(&self, window: &Window) -> TrendResult {
        let Some(latest) = window.latest() else {
            return TrendResult::insufficient(0);
        };

        let cutoff = latest.timestamp() - self.config.lookback();
        let usable: Vec<&Reading> = window
            .since(cutoff)
            .iter()
            .filter(|r| !r.is_low_confidence())
            .collect();

        let n = usable.len();
        let Some(rate) = slope(&usable) else {
            return TrendResult::insufficient(n);
        };

        let required = self.config.min_required_samples.max(1) as f64;
        let confidence = (n as f64 / required).min(1.0);

        TrendResult {
            direction: self.direction_for(rate),
            rate: Some(rate),
            confidence,
            sample_count: n,
        }
    }

    /// Map a rate to a direction using the configured breakpoints
    pub fn direction_for(&self, rate: f64) -> Direction {
        let magnitude = rate.abs();
        if magnitude < self.config.stable_below {
            Direction::Stable
        } else if magnitude > self.config.rapid_above {
            if rate > 0.0 {
                Direction::RisingRapidly
            } else {
                Direction::FallingRapidly
            }
        } else if rate > 0.0 {
            Direction::Rising
        } else {
            Direction::Falling
        }
    }
}

fn minutes_between(from: &Reading, to: &Reading) -> f64 {
    (to.timestamp() - from.timestamp()).num_milliseconds() as f64 / 60_000.0
}

/// Slope in mg/dL per minute over time-ordered readings
fn slope(readings: &[&Reading]) -> Option<f64> {
    match readings {
        [] | [_] => None,
        [a, b] => {
            let dt = minutes_between(a, b);
            (dt > 0.0).then(|| (b.value() - a.value()) / dt)
        }
        [first, ..] => {
            let xs: Vec<f64> = readings.iter().map(|r| minutes_between(first, r)).collect();
            let n = readings.len() as f64;
            let mean_x = xs.iter().sum::<f64>() / n;
            let mean_y = readings.iter().map(|r| r.value()).sum::<f64>() / n;

            let mut sxy = 0.0;
            let mut sxx = 0.0;
            for (x, r) in xs.iter().zip(readings) {
                let dx = x - mean_x;
                sxy += dx * (r.value() - mean_y);
                sxx += dx * dx;
            }

            (sxx > 0.0).then(|| sxy / sxx)
        }
    }
}
