//! Shared loaders used by the commands
//!
//! This module contains:
//! - `load_config` - Engine config with the usual resolution order
//! - `load_samples` - Nightscout entries file to raw samples
//! - `load_settings` - Optional Nightscout settings file
//! - `load_inputs` - Config, settings, thresholds and display unit in one pass
//! - `load_state` / `save_state` - Cycle state persistence between runs

use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use glyco_core::nightscout::{self, Settings};
use glyco_core::{CycleState, EngineConfig, GlucoseUnit, RawSample, Thresholds};

pub fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    EngineConfig::load(path).context("Failed to load engine config")
}

pub fn load_samples(file: &Path) -> Result<Vec<RawSample>> {
    let reader = BufReader::new(
        File::open(file).with_context(|| format!("Failed to open {}", file.display()))?,
    );
    let entries = nightscout::parse_entries(reader)
        .with_context(|| format!("Failed to parse Nightscout entries in {}", file.display()))?;
    Ok(nightscout::to_raw_samples(&entries))
}

pub fn load_settings(path: Option<&Path>) -> Result<Option<Settings>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let reader = BufReader::new(
        File::open(path).with_context(|| format!("Failed to open {}", path.display()))?,
    );
    let settings = Settings::parse(reader)
        .with_context(|| format!("Failed to parse Nightscout settings in {}", path.display()))?;
    Ok(Some(settings))
}

/// Settings thresholds win over the config file when a settings file is given
pub fn resolve_thresholds(config: &EngineConfig, settings: Option<&Settings>) -> Result<Thresholds> {
    match settings {
        Some(s) => s
            .thresholds()
            .context("Nightscout settings contain invalid thresholds"),
        None => Ok(config.thresholds),
    }
}

pub fn display_unit(settings: Option<&Settings>) -> GlucoseUnit {
    settings.map(Settings::units).unwrap_or_default()
}

/// Everything a command needs besides the entries file
#[derive(Debug, Clone)]
pub struct Inputs {
    pub config: EngineConfig,
    pub thresholds: Thresholds,
    pub unit: GlucoseUnit,
}

pub fn load_inputs(config_path: Option<&Path>, settings_path: Option<&Path>) -> Result<Inputs> {
    let config = load_config(config_path)?;
    let settings = load_settings(settings_path)?;
    let thresholds = resolve_thresholds(&config, settings.as_ref())?;
    Ok(Inputs {
        unit: display_unit(settings.as_ref()),
        config,
        thresholds,
    })
}

/// Previous cycle state; a missing file means a first run
pub fn load_state(path: &Path) -> Result<CycleState> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "No state file, starting fresh");
        return Ok(CycleState::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read state file {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Invalid state file {}", path.display()))
}

pub fn save_state(path: &Path, state: &CycleState) -> Result<()> {
    let json = serde_json::to_string_pretty(state)?;
    fs::write(path, json).with_context(|| format!("Failed to write state file {}", path.display()))
}
