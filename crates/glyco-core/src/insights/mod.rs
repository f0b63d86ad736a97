//! Insight Engine - one snapshot per analysis cycle
//!
//! The aggregator composes the trend estimator, event detector and
//! extrapolator into a single [`Insight`] describing the current glucose state.
//!
//! ## Cycle state
//!
//! The engine is stateless. Everything that has to survive between cycles
//! (the previous classification for `recovered`, notification times for the
//! cool-down) lives in [`CycleState`], which the caller passes in and gets
//! back on every insight.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use glyco_core::insights::{AnalysisContext, CycleState, InsightEngine};
//!
//! let engine = InsightEngine::new(&config);
//! let mut state = CycleState::default();
//! let insight = engine.analyze(&AnalysisContext::new(&window, &thresholds, &state, now));
//! state = insight.state.clone();
//! ```

pub mod engine;
pub mod types;

pub use engine::{analyze, AnalysisContext, InsightConfig, InsightEngine};
pub use types::{CycleState, Insight, InsightEvent, Notification, ProactiveAlert};
