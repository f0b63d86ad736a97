//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Shared loaders (config, entries, settings, cycle state)
//! - `analyze` - One analysis cycle over the latest data
//! - `report` - Retrospective report with lookback, weekday and hour filters
//! - `day` - Readings of a single day
//! - `config` - Effective configuration

pub mod analyze;
pub mod config;
pub mod core;
pub mod day;
pub mod report;

// Re-export command functions for main.rs
pub use analyze::*;
pub use config::*;
pub use core::*;
pub use day::*;
pub use report::*;

/// Render a percentage as a fixed-width bar
pub fn bar(pct: f64, width: usize) -> String {
    let filled = ((pct / 100.0) * width as f64).round().clamp(0.0, width as f64) as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}
