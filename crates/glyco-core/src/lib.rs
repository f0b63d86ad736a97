//! Glyco Core Library
//!
//! Real-time glucose insight engine for continuous glucose monitor data:
//! - Reading normalizer (units, validation, clock skew, duplicates)
//! - Sliding window over recent readings
//! - Trend estimation (rate of change, direction, confidence)
//! - Event detection against configurable thresholds
//! - Short-horizon extrapolation with threshold crossings
//! - Insight aggregation with explicit cross-cycle state
//! - Nightscout document adapters, a retrospective report and a day view
//!
//! Every component is pure and synchronous; callers own all I/O and state.

pub mod config;
pub mod detect;
pub mod error;
pub mod forecast;
pub mod insights;
pub mod models;
pub mod nightscout;
pub mod normalize;
pub mod report;
pub mod trend;
pub mod window;

pub use config::{default_config_path, EngineConfig};
pub use detect::{Detection, DetectionConfig, Event, EventDetector, EventKind, Severity};
pub use error::{Error, Result};
pub use forecast::{Boundary, Extrapolator, ForecastConfig, Projection, ThresholdCrossing};
pub use insights::{
    analyze, AnalysisContext, CycleState, Insight, InsightConfig, InsightEngine, InsightEvent,
    Notification, ProactiveAlert,
};
pub use models::{
    Classification, GlucoseUnit, Quality, RawSample, Reading, Thresholds, MG_DL_PER_MMOL,
};
pub use normalize::{normalize, normalize_sample, Normalized, NormalizerConfig, Rejection};
pub use report::{build_report, day_view, parse_day, DayView, HourRange, Report, ReportOptions};
pub use trend::{Direction, TrendConfig, TrendEstimator, TrendResult};
pub use window::{Window, WindowConfig};
