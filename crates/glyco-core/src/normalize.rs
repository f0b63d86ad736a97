//! Reading normalizer
//!
//! Turns raw samples into validated [`Reading`]s in canonical mg/dL:
//! - non-positive or non-finite values are rejected as `InvalidReading`
//! - timestamps too far ahead of `now` are rejected as `ClockSkewReading`
//! - `calibrating` samples pass through flagged low-confidence
//! - duplicate timestamps in a batch are merged, last one wins

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::models::{RawSample, Reading};

/// Normalizer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// How far ahead of "now" a timestamp may be before it is rejected
    pub max_clock_skew_minutes: u32,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            max_clock_skew_minutes: 10,
        }
    }
}

impl NormalizerConfig {
    pub fn max_clock_skew(&self) -> Duration {
        Duration::minutes(i64::from(self.max_clock_skew_minutes))
    }
}

/// A sample the normalizer refused, with its position in the input batch
#[derive(Debug)]
pub struct Rejection {
    pub index: usize,
    pub error: Error,
}

/// Result of normalizing a batch
#[derive(Debug, Default)]
pub struct Normalized {
    /// Accepted readings, strictly increasing by timestamp
    pub readings: Vec<Reading>,
    pub rejected: Vec<Rejection>,
    /// Number of accepted samples that replaced an earlier one with the same timestamp
    pub merged_duplicates: usize,
}

/// Validate and canonicalize a single sample
pub fn normalize_sample(
    sample: &RawSample,
    now: DateTime<Utc>,
    config: &NormalizerConfig,
) -> Result<Reading> {
    if !sample.value.is_finite() || sample.value <= 0.0 {
        return Err(Error::InvalidReading(format!(
            "glucose value must be positive, got {} {}",
            sample.value, sample.unit
        )));
    }

    let max_skew = config.max_clock_skew();
    let ahead = sample.timestamp - now;
    if ahead > max_skew {
        return Err(Error::ClockSkewReading {
            timestamp: sample.timestamp,
            ahead_secs: ahead.num_seconds(),
            max_skew_secs: max_skew.num_seconds(),
        });
    }

    let value = sample.unit.to_mg_dl(sample.value);

    Ok(Reading::new(
        sample.timestamp,
        value,
        sample.device.clone(),
        sample.quality.unwrap_or_default(),
    ))
}

/// Normalize a batch of samples
///
/// Rejections never abort the batch; they are reported alongside the accepted
/// readings so the caller can surface them.
pub fn normalize(
    samples: &[RawSample],
    now: DateTime<Utc>,
    config: &NormalizerConfig,
) -> Normalized {
    let mut accepted: Vec<(usize, Reading)> = Vec::with_capacity(samples.len());
    let mut rejected = Vec::new();

    for (index, sample) in samples.iter().enumerate() {
        match normalize_sample(sample, now, config) {
            Ok(reading) => accepted.push((index, reading)),
            Err(error) => {
                warn!(index, error = %error, "Rejected glucose sample");
                rejected.push(Rejection { index, error });
            }
        }
    }

    // Stable sort keeps input order among equal timestamps, so the last
    // sample of a duplicate run is the one that survives.
    accepted.sort_by_key(|(_, r)| r.timestamp());

    let mut readings: Vec<Reading> = Vec::with_capacity(accepted.len());
    let mut merged_duplicates = 0;
    for (_, reading) in accepted {
        match readings.last_mut() {
            Some(last) if last.timestamp() == reading.timestamp() => {
                *last = reading;
                merged_duplicates += 1;
            }
            _ => readings.push(reading),
        }
    }

    debug!(
        accepted = readings.len(),
        rejected = rejected.len(),
        merged = merged_duplicates,
        "Normalized sample batch"
    );

    Normalized {
        readings,
        rejected,
        merged_duplicates,
    }
}
