mod engine;
mod laps;
mod thresholds;

pub use engine::{TimerEngine, TimerPhase};
pub use laps::LapRecorder;
pub use thresholds::{
    bell_count_for, is_valid_count, is_valid_seconds, preset_default_secs, ThresholdPolicy,
    Warning, WarningThresholds, DEFAULT_WARNING_COUNT, MAX_SECONDS, MAX_WARNING_COUNT,
    MIN_WARNING_COUNT,
};
