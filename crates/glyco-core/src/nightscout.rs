//! Nightscout document adapters
//!
//! Maps the `entries` and `settings` JSON documents served by Nightscout onto
//! [`RawSample`] and [`Thresholds`]. Unknown fields are ignored.

use std::io::Read;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::models::{GlucoseUnit, Quality, RawSample, Thresholds};
use crate::trend::Direction;

/// Noise level at or above which a sample is tagged noisy
const NOISY_FROM: i64 = 3;

/// One document from `/api/v1/entries.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Sensor glucose value, always mg/dL
    #[serde(default)]
    pub sgv: Option<f64>,
    /// Epoch milliseconds
    #[serde(default)]
    pub date: Option<i64>,
    #[serde(rename = "dateString", default, skip_serializing_if = "Option::is_none")]
    pub date_string: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trend: Option<i64>,
    /// Uploader arrow (`Flat`, `FortyFiveUp`, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    /// `sgv`, `mbg`, `cal`, ...
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub noise: Option<i64>,
}

impl Entry {
    pub fn is_sgv(&self) -> bool {
        self.kind.as_deref() == Some("sgv")
    }

    /// Reading time from `date`, falling back to `dateString`
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.date
            .and_then(DateTime::from_timestamp_millis)
            .or_else(|| {
                self.date_string
                    .as_deref()
                    .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                    .map(|dt| dt.with_timezone(&Utc))
            })
    }

    /// Direction reported by the uploader, if it uses a known arrow
    pub fn reported_direction(&self) -> Option<Direction> {
        self.direction.as_deref().and_then(Direction::from_nightscout)
    }

    /// Convert to a raw sample; `None` for non-sgv entries and missing values
    ///
    /// Non-positive sgv values are sensor error codes and are skipped here
    /// rather than handed to the normalizer.
    pub fn to_raw_sample(&self) -> Option<RawSample> {
        if !self.is_sgv() {
            return None;
        }
        let value = self.sgv.filter(|v| *v > 0.0)?;
        let timestamp = self.timestamp()?;

        let mut sample = RawSample::mg_dl(value, timestamp);
        if let Some(device) = &self.device {
            sample = sample.with_device(device.clone());
        }
        if self.noise.is_some_and(|n| n >= NOISY_FROM) {
            sample = sample.with_quality(Quality::Noisy);
        }
        Some(sample)
    }
}

/// Parse an entries array
pub fn parse_entries<R: Read>(reader: R) -> Result<Vec<Entry>> {
    let entries: Vec<Entry> = serde_json::from_reader(reader)?;
    debug!(count = entries.len(), "Parsed Nightscout entries");
    Ok(entries)
}

/// Raw samples for every usable entry, in input order
pub fn to_raw_samples(entries: &[Entry]) -> Vec<RawSample> {
    let samples: Vec<RawSample> = entries.iter().filter_map(Entry::to_raw_sample).collect();
    if samples.len() < entries.len() {
        debug!(
            skipped = entries.len() - samples.len(),
            "Skipped non-sgv or incomplete entries"
        );
    }
    samples
}

/// Threshold block of the Nightscout settings document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsThresholds {
    pub bg_low: Option<f64>,
    pub bg_target_bottom: Option<f64>,
    pub bg_target_top: Option<f64>,
    pub bg_high: Option<f64>,
}

/// Subset of the Nightscout `settings` document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub units: Option<String>,
    #[serde(default)]
    pub thresholds: Option<SettingsThresholds>,
}

impl Settings {
    pub fn parse<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Display unit; anything other than mmol means mg/dL
    pub fn units(&self) -> GlucoseUnit {
        match self.units.as_deref().map(str::parse::<GlucoseUnit>) {
            Some(Ok(unit)) => unit,
            _ => GlucoseUnit::MgDl,
        }
    }

    /// Validated thresholds; missing values take the defaults
    pub fn thresholds(&self) -> Result<Thresholds> {
        let defaults = Thresholds::default();
        let t = self.thresholds.clone().unwrap_or_default();
        Thresholds::new(
            t.bg_low.unwrap_or(defaults.hypo_urgent()),
            t.bg_target_bottom.unwrap_or(defaults.hypo_warning()),
            t.bg_target_top.unwrap_or(defaults.hyper_warning()),
            t.bg_high.unwrap_or(defaults.hyper_urgent()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    const ENTRIES: &str = r#"[
        {"_id": "a1", "sgv": 120, "date": 1768464000000, "dateString": "2026-01-15T08:00:00.000Z",
         "trend": 4, "direction": "Flat", "device": "xDrip-DexcomG6", "type": "sgv", "noise": 1,
         "utcOffset": 0, "sysTime": "2026-01-15T08:00:00.000Z"},
        {"_id": "a2", "sgv": 0, "date": 1768464300000, "type": "sgv"},
        {"_id": "a3", "mbg": 110, "date": 1768464300000, "type": "mbg"},
        {"_id": "a4", "sgv": 131, "dateString": "2026-01-15T08:10:00Z", "type": "sgv",
         "direction": "DoubleUp", "noise": 3}
    ]"#;

    #[test]
    fn test_parse_entries_ignores_unknown_fields() {
        let entries = parse_entries(ENTRIES.as_bytes()).unwrap();
        assert_eq!(entries.len(), 4);
        assert_eq!(entries[0].id.as_deref(), Some("a1"));
        assert_eq!(entries[0].sgv, Some(120.0));
        assert_eq!(entries[2].kind.as_deref(), Some("mbg"));
    }

    #[test]
    fn test_only_positive_sgv_entries_become_samples() {
        let entries = parse_entries(ENTRIES.as_bytes()).unwrap();
        let samples = to_raw_samples(&entries);
        assert_eq!(samples.len(), 2);

        assert_eq!(samples[0].value, 120.0);
        assert_eq!(samples[0].unit, GlucoseUnit::MgDl);
        assert_eq!(samples[0].device.as_deref(), Some("xDrip-DexcomG6"));
        assert_eq!(samples[0].quality, None);
        assert_eq!(
            samples[0].timestamp,
            DateTime::parse_from_rfc3339("2026-01-15T08:00:00Z").unwrap()
        );

        // dateString fallback and noisy tag
        assert_eq!(samples[1].value, 131.0);
        assert_eq!(samples[1].quality, Some(Quality::Noisy));
        assert_eq!(
            samples[1].timestamp,
            DateTime::parse_from_rfc3339("2026-01-15T08:10:00Z").unwrap()
        );
    }

    #[test]
    fn test_reported_direction() {
        let entries = parse_entries(ENTRIES.as_bytes()).unwrap();
        assert_eq!(entries[0].reported_direction(), Some(Direction::Stable));
        assert_eq!(entries[3].reported_direction(), Some(Direction::RisingRapidly));
        assert_eq!(entries[1].reported_direction(), None);
    }

    #[test]
    fn test_entry_without_time_is_skipped() {
        let entry = Entry {
            sgv: Some(100.0),
            kind: Some("sgv".into()),
            ..Default::default()
        };
        assert!(entry.to_raw_sample().is_none());
    }

    #[test]
    fn test_malformed_entries_document() {
        let err = parse_entries("{not json".as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_settings_units() {
        for (units, expected) in [
            (Some("mg/dl"), GlucoseUnit::MgDl),
            (Some("mmol"), GlucoseUnit::MmolL),
            (Some("mmol/L"), GlucoseUnit::MmolL),
            (Some("furlongs"), GlucoseUnit::MgDl),
            (None, GlucoseUnit::MgDl),
        ] {
            let settings = Settings {
                units: units.map(String::from),
                thresholds: None,
            };
            assert_eq!(settings.units(), expected, "{:?}", units);
        }
    }

    #[test]
    fn test_settings_default_thresholds() {
        let settings = Settings::parse("{}".as_bytes()).unwrap();
        let t = settings.thresholds().unwrap();
        assert_eq!(t.hypo_urgent(), 55.0);
        assert_eq!(t.hypo_warning(), 70.0);
        assert_eq!(t.hyper_warning(), 180.0);
        assert_eq!(t.hyper_urgent(), 250.0);
    }

    #[test]
    fn test_settings_custom_thresholds() {
        let settings = Settings::parse(
            r#"{"units": "mg/dl", "thresholds": {"bgLow": 50, "bgTargetBottom": 80,
                "bgTargetTop": 160, "bgHigh": 220}, "theme": "colors"}"#
                .as_bytes(),
        )
        .unwrap();
        let t = settings.thresholds().unwrap();
        assert_eq!(t.hypo_urgent(), 50.0);
        assert_eq!(t.hypo_warning(), 80.0);
        assert_eq!(t.hyper_warning(), 160.0);
        assert_eq!(t.hyper_urgent(), 220.0);
    }

    #[test]
    fn test_settings_with_unordered_thresholds_fail() {
        let settings = Settings::parse(
            r#"{"thresholds": {"bgLow": 90, "bgTargetBottom": 80}}"#.as_bytes(),
        )
        .unwrap();
        assert!(matches!(
            settings.thresholds(),
            Err(Error::InvalidThresholdConfig(_))
        ));
    }
}
