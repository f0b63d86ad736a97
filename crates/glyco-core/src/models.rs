//! Domain models for glyco

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// mg/dL per mmol/L
pub const MG_DL_PER_MMOL: f64 = 18.0182;

/// Glucose unit tag carried by raw samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GlucoseUnit {
    #[serde(rename = "mg/dL", alias = "mg/dl", alias = "mgdl")]
    #[default]
    MgDl,
    #[serde(rename = "mmol/L", alias = "mmol/l", alias = "mmol")]
    MmolL,
}

impl GlucoseUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MgDl => "mg/dL",
            Self::MmolL => "mmol/L",
        }
    }

    /// Convert a value in this unit to canonical mg/dL
    pub fn to_mg_dl(self, value: f64) -> f64 {
        match self {
            Self::MgDl => value,
            Self::MmolL => value * MG_DL_PER_MMOL,
        }
    }

    /// Convert a canonical mg/dL value into this unit (for display)
    pub fn from_mg_dl(self, mg_dl: f64) -> f64 {
        match self {
            Self::MgDl => mg_dl,
            Self::MmolL => mg_dl / MG_DL_PER_MMOL,
        }
    }

    /// Format a canonical mg/dL value in this unit with its suffix
    pub fn format(self, mg_dl: f64) -> String {
        match self {
            Self::MgDl => format!("{:.0} {}", mg_dl, self.as_str()),
            Self::MmolL => format!("{:.1} {}", self.from_mg_dl(mg_dl), self.as_str()),
        }
    }
}

impl FromStr for GlucoseUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mg/dl" | "mgdl" | "mg" => Ok(Self::MgDl),
            "mmol/l" | "mmol" => Ok(Self::MmolL),
            _ => Err(format!("Unknown glucose unit: {}", s)),
        }
    }
}

impl fmt::Display for GlucoseUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Source-reported quality of a sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quality {
    #[default]
    Ok,
    Noisy,
    /// Sensor is calibrating; the value enters the window but not the rate
    Calibrating,
}

impl Quality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Noisy => "noisy",
            Self::Calibrating => "calibrating",
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A raw glucose sample as handed over by the ingestion layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSample {
    pub value: f64,
    #[serde(default)]
    pub unit: GlucoseUnit,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<Quality>,
}

impl RawSample {
    pub fn new(value: f64, unit: GlucoseUnit, timestamp: DateTime<Utc>) -> Self {
        Self {
            value,
            unit,
            timestamp,
            device: None,
            quality: None,
        }
    }

    pub fn mg_dl(value: f64, timestamp: DateTime<Utc>) -> Self {
        Self::new(value, GlucoseUnit::MgDl, timestamp)
    }

    pub fn with_device(mut self, device: impl Into<String>) -> Self {
        self.device = Some(device.into());
        self
    }

    pub fn with_quality(mut self, quality: Quality) -> Self {
        self.quality = Some(quality);
        self
    }
}

/// A validated reading in canonical mg/dL
///
/// Only the normalizer constructs these; fields are read through accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    timestamp: DateTime<Utc>,
    value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    device: Option<String>,
    quality: Quality,
}

impl Reading {
    pub(crate) fn new(
        timestamp: DateTime<Utc>,
        value: f64,
        device: Option<String>,
        quality: Quality,
    ) -> Self {
        Self {
            timestamp,
            value,
            device,
            quality,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Glucose in mg/dL
    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn device(&self) -> Option<&str> {
        self.device.as_deref()
    }

    pub fn quality(&self) -> Quality {
        self.quality
    }

    /// Calibrating readings are kept but never feed the rate estimate
    pub fn is_low_confidence(&self) -> bool {
        self.quality == Quality::Calibrating
    }
}

impl From<&Reading> for RawSample {
    fn from(reading: &Reading) -> Self {
        Self {
            value: reading.value,
            unit: GlucoseUnit::MgDl,
            timestamp: reading.timestamp,
            device: reading.device.clone(),
            quality: Some(reading.quality),
        }
    }
}

/// Glucose thresholds in mg/dL
///
/// Always strictly increasing: `hypo_urgent < hypo_warning < hyper_warning < hyper_urgent`.
/// Construction and deserialization both go through [`Thresholds::new`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawThresholds")]
pub struct Thresholds {
    hypo_urgent: f64,
    hypo_warning: f64,
    hyper_warning: f64,
    hyper_urgent: f64,
}

/// Thresholds as written in a document, before the ordering check
#[derive(Debug, Clone, Copy, Deserialize)]
pub(crate) struct RawThresholds {
    #[serde(alias = "urgent_low")]
    hypo_urgent: f64,
    #[serde(alias = "target_low")]
    hypo_warning: f64,
    #[serde(alias = "target_high")]
    hyper_warning: f64,
    #[serde(alias = "urgent_high")]
    hyper_urgent: f64,
}

impl TryFrom<RawThresholds> for Thresholds {
    type Error = Error;

    fn try_from(raw: RawThresholds) -> Result<Self, Self::Error> {
        Thresholds::new(
            raw.hypo_urgent,
            raw.hypo_warning,
            raw.hyper_warning,
            raw.hyper_urgent,
        )
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            hypo_urgent: 55.0,
            hypo_warning: 70.0,
            hyper_warning: 180.0,
            hyper_urgent: 250.0,
        }
    }
}

impl Thresholds {
    pub fn new(
        hypo_urgent: f64,
        hypo_warning: f64,
        hyper_warning: f64,
        hyper_urgent: f64,
    ) -> crate::Result<Self> {
        let values = [hypo_urgent, hypo_warning, hyper_warning, hyper_urgent];
        if values.iter().any(|v| !v.is_finite() || *v <= 0.0) {
            return Err(Error::InvalidThresholdConfig(format!(
                "thresholds must be positive finite values, got {:?}",
                values
            )));
        }
        if !(hypo_urgent < hypo_warning
            && hypo_warning < hyper_warning
            && hyper_warning < hyper_urgent)
        {
            return Err(Error::InvalidThresholdConfig(format!(
                "expected hypo_urgent < hypo_warning < hyper_warning < hyper_urgent, got {} / {} / {} / {}",
                hypo_urgent, hypo_warning, hyper_warning, hyper_urgent
            )));
        }
        Ok(Self {
            hypo_urgent,
            hypo_warning,
            hyper_warning,
            hyper_urgent,
        })
    }

    pub fn hypo_urgent(&self) -> f64 {
        self.hypo_urgent
    }

    pub fn hypo_warning(&self) -> f64 {
        self.hypo_warning
    }

    pub fn hyper_warning(&self) -> f64 {
        self.hyper_warning
    }

    pub fn hyper_urgent(&self) -> f64 {
        self.hyper_urgent
    }

    /// Classify a mg/dL value against these thresholds
    pub fn classify(&self, value: f64) -> Classification {
        if value <= self.hypo_urgent {
            Classification::VeryLow
        } else if value <= self.hypo_warning {
            Classification::Low
        } else if value >= self.hyper_urgent {
            Classification::VeryHigh
        } else if value >= self.hyper_warning {
            Classification::High
        } else {
            Classification::InRange
        }
    }
}

/// Where a value sits relative to the thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    VeryLow,
    Low,
    InRange,
    High,
    VeryHigh,
}

impl Classification {
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

    pub fn is_in_range(&self) -> bool {
        *self == Self::InRange
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Classification {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "very_low" => Ok(Self::VeryLow),
            "low" => Ok(Self::Low),
            "in_range" => Ok(Self::InRange),
            "high" => Ok(Self::High),
            "very_high" => Ok(Self::VeryHigh),
            _ => Err(format!("Unknown classification: {}", s)),
        }
    }
}
