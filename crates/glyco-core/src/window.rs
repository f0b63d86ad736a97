//! Analysis window
//!
//! An immutable, strictly time-ordered slice of recent readings, rebuilt for
//! every analysis cycle. Readings older than `horizon` relative to the newest
//! reading are evicted at construction.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Reading;

/// Window configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Maximum span of the window
    pub horizon_minutes: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            horizon_minutes: 30,
        }
    }
}

impl WindowConfig {
    pub fn horizon(&self) -> Duration {
        Duration::minutes(i64::from(self.horizon_minutes))
    }
}

#[derive(Debug, Clone)]
pub struct Window {
    readings: Vec<Reading>,
    horizon: Duration,
}

impl Window {
    /// Build a window from readings in any order
    ///
    /// Duplicate timestamps keep the reading that appears last in the input.
    pub fn new(readings: impl IntoIterator<Item = Reading>, horizon: Duration) -> Self {
        let mut readings: Vec<Reading> = readings.into_iter().collect();
        readings.sort_by_key(|r| r.timestamp());

        let mut ordered: Vec<Reading> = Vec::with_capacity(readings.len());
        for reading in readings {
            match ordered.last_mut() {
                Some(last) if last.timestamp() == reading.timestamp() => *last = reading,
                _ => ordered.push(reading),
            }
        }

        if let Some(newest) = ordered.last().map(|r| r.timestamp()) {
            let cutoff = newest - horizon;
            ordered.retain(|r| r.timestamp() >= cutoff);
        }

        Self {
            readings: ordered,
            horizon,
        }
    }

    pub fn from_config(readings: impl IntoIterator<Item = Reading>, config: &WindowConfig) -> Self {
        Self::new(readings, config.horizon())
    }

    pub fn empty(horizon: Duration) -> Self {
        Self {
            readings: Vec::new(),
            horizon,
        }
    }

    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    pub fn latest(&self) -> Option<&Reading> {
        self.readings.last()
    }

    pub fn oldest(&self) -> Option<&Reading> {
        self.readings.first()
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn horizon(&self) -> Duration {
        self.horizon
    }

    /// Time between the oldest and newest reading
    pub fn span(&self) -> Duration {
        match (self.oldest(), self.latest()) {
            (Some(a), Some(b)) => b.timestamp() - a.timestamp(),
            _ => Duration::zero(),
        }
    }

    /// Readings at or after `since`
    pub fn since(&self, since: DateTime<Utc>) -> &[Reading] {
        let start = self.readings.partition_point(|r| r.timestamp() < since);
        &self.readings[start..]
    }
}
