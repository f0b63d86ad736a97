//! Engine configuration
//!
//! Every knob has a default and can be overridden per invocation.
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a two-layer resolution:
//! 1. Explicit path, or the override in the data dir
//!    (~/.local/share/glyco/config/engine.toml)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! Files only need to name the values they change.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::detect::DetectionConfig;
use crate::error::{Error, Result};
use crate::forecast::ForecastConfig;
use crate::insights::InsightConfig;
use crate::models::{RawThresholds, Thresholds};
use crate::normalize::NormalizerConfig;
use crate::trend::TrendConfig;
use crate::window::WindowConfig;

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/engine.toml");

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub normalizer: NormalizerConfig,
    pub window: WindowConfig,
    pub trend: TrendConfig,
    pub detection: DetectionConfig,
    pub forecast: ForecastConfig,
    pub insights: InsightConfig,
    pub thresholds: Thresholds,
}

/// On-disk shape; thresholds are checked explicitly after parsing
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct EngineConfigFile {
    normalizer: NormalizerConfig,
    window: WindowConfig,
    trend: TrendConfig,
    detection: DetectionConfig,
    forecast: ForecastConfig,
    insights: InsightConfig,
    thresholds: Option<RawThresholds>,
}

impl EngineConfig {
    /// Load from an explicit path, the default override location, or the embedded defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let content = match path {
            Some(path) => fs::read_to_string(path).map_err(|e| {
                Error::Config(format!("Failed to read {}: {}", path.display(), e))
            })?,
            None => match default_config_path().filter(|p| p.exists()) {
                Some(default_path) => {
                    debug!(path = %default_path.display(), "Using config override");
                    fs::read_to_string(&default_path).map_err(|e| {
                        Error::Config(format!("Failed to read {}: {}", default_path.display(), e))
                    })?
                }
                None => DEFAULT_CONFIG.to_string(),
            },
        };

        Self::parse(&content)
    }

    /// Embedded defaults
    pub fn embedded() -> Result<Self> {
        Self::parse(DEFAULT_CONFIG)
    }

    /// Parse TOML and validate
    pub fn parse(content: &str) -> Result<Self> {
        let file: EngineConfigFile = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

        let thresholds = match file.thresholds {
            Some(raw) => Thresholds::try_from(raw)?,
            None => Thresholds::default(),
        };

        let config = EngineConfig {
            normalizer: file.normalizer,
            window: file.window,
            trend: file.trend,
            detection: file.detection,
            forecast: file.forecast,
            insights: file.insights,
            thresholds,
        };
        config.validate()?;
        Ok(config)
    }

    /// Serialize back to TOML (for `glyco config`)
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.window.horizon_minutes == 0 {
            return Err(invalid("window.horizon_minutes must be > 0"));
        }
        if self.trend.lookback_minutes == 0 {
            return Err(invalid("trend.lookback_minutes must be > 0"));
        }
        if self.trend.min_required_samples == 0 {
            return Err(invalid("trend.min_required_samples must be >= 1"));
        }
        if !(self.trend.stable_below >= 0.0 && self.trend.stable_below < self.trend.rapid_above) {
            return Err(invalid(format!(
                "trend breakpoints must satisfy 0 <= stable_below < rapid_above, got {} / {}",
                self.trend.stable_below, self.trend.rapid_above
            )));
        }
        if !(0.0..=1.0).contains(&self.detection.rapid_min_confidence) {
            return Err(invalid("detection.rapid_min_confidence must be within 0..=1"));
        }
        if !(self.forecast.horizon_minutes > 0.0 && self.forecast.horizon_minutes.is_finite()) {
            return Err(invalid("forecast.horizon_minutes must be > 0"));
        }
        if !(self.forecast.plausible_min < self.forecast.plausible_max) {
            return Err(invalid(format!(
                "forecast plausible range is empty: {} .. {}",
                self.forecast.plausible_min, self.forecast.plausible_max
            )));
        }
        if !(0.0..=1.0).contains(&self.forecast.low_confidence_below) {
            return Err(invalid("forecast.low_confidence_below must be within 0..=1"));
        }

        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> Error {
    Error::InvalidConfig(message.into())
}

/// Default override location for the config file
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("glyco").join("config").join("engine.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_embedded_matches_defaults() {
        let embedded = EngineConfig::embedded().unwrap();
        assert_eq!(embedded, EngineConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config = EngineConfig::parse(
            r#"
            [trend]
            lookback_minutes = 20

            [insights]
            cooldown_minutes = 30
            "#,
        )
        .unwrap();

        assert_eq!(config.trend.lookback_minutes, 20);
        assert_eq!(config.trend.min_required_samples, 3);
        assert_eq!(config.insights.cooldown_minutes, 30);
        assert_eq!(config.forecast.horizon_minutes, 20.0);
    }

    #[test]
    fn test_thresholds_table() {
        let config = EngineConfig::parse(
            r#"
            [thresholds]
            hypo_urgent = 54
            hypo_warning = 70
            hyper_warning = 200
            hyper_urgent = 300
            "#,
        )
        .unwrap();
        assert_eq!(config.thresholds.hyper_warning(), 200.0);
    }

    #[test]
    fn test_malformed_thresholds_fail_fast() {
        let err = EngineConfig::parse(
            r#"
            [thresholds]
            hypo_urgent = 54
            hypo_warning = 70
            hyper_warning = 40
            hyper_urgent = 250
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidThresholdConfig(_)), "{err}");
    }

    #[test]
    fn test_threshold_errors_keep_their_detail() {
        let err = EngineConfig::parse(
            r#"
            [thresholds]
            urgent_low = 80
            target_low = 70
            target_high = 180
            urgent_high = 250
            "#,
        )
        .unwrap_err();
        match err {
            Error::InvalidThresholdConfig(detail) => {
                assert!(!detail.starts_with("Invalid threshold config"), "{detail}");
            }
            other => panic!("unexpected error: {other}"),
        }

        let partial = EngineConfig::parse("[thresholds]\nhypo_urgent = 54\n").unwrap_err();
        assert!(matches!(partial, Error::Config(_)), "{partial}");
    }

    #[test]
    fn test_invalid_breakpoints() {
        let err = EngineConfig::parse(
            r#"
            [trend]
            stable_below = 3.0
            rapid_above = 2.0
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_garbage_toml() {
        let err = EngineConfig::parse("this is = = not toml").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_load_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[forecast]\nhorizon_minutes = 30.0").unwrap();

        let config = EngineConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.forecast.horizon_minutes, 30.0);
    }

    #[test]
    fn test_load_missing_path_is_an_error() {
        let err = EngineConfig::load(Some(Path::new("/nonexistent/glyco.toml"))).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_to_toml_round_trips() {
        let config = EngineConfig::default();
        let text = config.to_toml().unwrap();
        assert_eq!(EngineConfig::parse(&text).unwrap(), config);
    }
}
