//! Timer engine implementation.
//!
//! The engine is a tick-driven state machine. It owns no threads and reads
//! no clock: the caller (a [`ClockDriver`](crate::clock::ClockDriver) or a
//! test) calls `tick()` once per second while the timer runs.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> Idle (paused, elapsed kept)
//! any  -> reset   -> Idle (elapsed 0)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(WarningThresholds::default());
//! engine.start();
//! // Once per second:
//! for event in engine.tick() { /* ring bells on WarningFired */ }
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::laps::LapRecorder;
use super::thresholds::{bell_count_for, is_valid_count, ThresholdPolicy, WarningThresholds};
use crate::error::TimerError;
use crate::events::Event;
use crate::preset::Preset;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerPhase {
    /// Not consuming ticks. Elapsed time may be non-zero when paused.
    #[default]
    Idle,
    Running,
}

/// Core timer engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimerEngine {
    phase: TimerPhase,
    elapsed_secs: u64,
    warnings: WarningThresholds,
    laps: LapRecorder,
    #[serde(default)]
    policy: ThresholdPolicy,
}

impl TimerEngine {
    /// Create an idle engine with the given warnings.
    pub fn new(warnings: WarningThresholds) -> Self {
        Self {
            warnings,
            ..Self::default()
        }
    }

    /// Create an idle engine configured from a preset.
    pub fn from_preset(preset: &Preset) -> Self {
        let mut engine = Self::default();
        engine.initialize_from(preset);
        engine
    }

    pub fn with_policy(mut self, policy: ThresholdPolicy) -> Self {
        self.policy = policy;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> TimerPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == TimerPhase::Running
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    pub fn warnings(&self) -> &WarningThresholds {
        &self.warnings
    }

    pub fn thresholds(&self) -> Vec<u64> {
        self.warnings.thresholds()
    }

    pub fn fired(&self) -> Vec<bool> {
        self.warnings.fired()
    }

    pub fn laps(&self) -> &LapRecorder {
        &self.laps
    }

    pub fn policy(&self) -> ThresholdPolicy {
        self.policy
    }

    /// Whether warning `index` has been reached, whether or not it fired.
    pub fn reached(&self, index: usize) -> bool {
        self.warnings
            .get(index)
            .is_some_and(|w| w.is_reached(self.elapsed_secs))
    }

    pub fn reached_indices(&self) -> Vec<usize> {
        self.warnings.reached_indices(self.elapsed_secs)
    }

    /// "+" button enablement.
    pub fn can_increase(&self) -> bool {
        !self.is_running() && self.warnings.can_grow()
    }

    /// "-" button enablement.
    pub fn can_decrease(&self) -> bool {
        !self.is_running() && self.warnings.can_shrink()
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            phase: self.phase,
            elapsed_secs: self.elapsed_secs,
            warnings: self.warnings.as_slice().to_vec(),
            laps: self.laps.as_vec(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        match self.phase {
            TimerPhase::Idle => {
                self.phase = TimerPhase::Running;
                info!(elapsed_secs = self.elapsed_secs, "timer started");
                Some(Event::TimerStarted {
                    elapsed_secs: self.elapsed_secs,
                    at: Utc::now(),
                })
            }
            TimerPhase::Running => None, // Already running.
        }
    }

    pub fn pause(&mut self) -> Option<Event> {
        match self.phase {
            TimerPhase::Running => {
                self.phase = TimerPhase::Idle;
                info!(elapsed_secs = self.elapsed_secs, "timer paused");
                Some(Event::TimerPaused {
                    elapsed_secs: self.elapsed_secs,
                    at: Utc::now(),
                })
            }
            TimerPhase::Idle => None,
        }
    }

    /// Stop, zero the elapsed time, clear fired flags and laps.
    pub fn reset(&mut self) -> Vec<Event> {
        self.phase = TimerPhase::Idle;
        self.elapsed_secs = 0;
        self.warnings.clear_fired();
        self.laps.clear();
        info!("timer reset");
        let at = Utc::now();
        vec![
            Event::TimerReset { at },
            Event::LapsChanged {
                laps: Vec::new(),
                at,
            },
        ]
    }

    /// Advance one second. Ignored unless running.
    ///
    /// Returns `ElapsedChanged` followed by one `WarningFired` per warning
    /// crossed on this tick, ascending by index.
    pub fn tick(&mut self) -> Vec<Event> {
        if self.phase != TimerPhase::Running {
            return Vec::new();
        }
        self.elapsed_secs = self.elapsed_secs.saturating_add(1);
        debug!(elapsed_secs = self.elapsed_secs, "tick");

        let at = Utc::now();
        let mut events = vec![Event::ElapsedChanged {
            elapsed_secs: self.elapsed_secs,
            at,
        }];
        for index in self.warnings.evaluate(self.elapsed_secs) {
            let threshold_secs = self
                .warnings
                .get(index)
                .map(|w| w.threshold_secs)
                .unwrap_or_default();
            let bell_count = bell_count_for(index);
            info!(index, threshold_secs, bell_count, "warning fired");
            events.push(Event::WarningFired {
                index,
                threshold_secs,
                bell_count,
                at,
            });
        }
        events
    }

    pub fn record_lap(&mut self) -> Event {
        self.laps.record(self.elapsed_secs);
        debug!(elapsed_secs = self.elapsed_secs, laps = self.laps.len(), "lap recorded");
        self.laps_changed()
    }

    pub fn clear_laps(&mut self) -> Event {
        self.laps.clear();
        self.laps_changed()
    }

    /// Resize the warning list. Rejected while running or out of bounds.
    pub fn set_count(&mut self, count: usize) -> Result<Event, TimerError> {
        self.ensure_idle("change the warning count")?;
        self.warnings.resize(count).inspect_err(|err| {
            warn!(%err, "warning count change rejected");
        })?;
        Ok(self.count_changed())
    }

    pub fn increase_count(&mut self) -> Result<Event, TimerError> {
        self.set_count(self.warning_count() + 1)
    }

    pub fn decrease_count(&mut self) -> Result<Event, TimerError> {
        self.set_count(self.warning_count().saturating_sub(1))
    }

    /// Edit one threshold. Fired flags are left alone, so a warning that
    /// already rang does not ring again before a reset.
    pub fn set_threshold(&mut self, index: usize, seconds: i64) -> Result<Event, TimerError> {
        self.ensure_idle("edit a warning threshold")?;
        let threshold_secs = self
            .warnings
            .set_threshold(index, seconds, self.policy)
            .inspect_err(|err| warn!(%err, "threshold edit rejected"))?;
        Ok(Event::ThresholdChanged {
            index,
            threshold_secs,
            at: Utc::now(),
        })
    }

    /// Bulk-initialize warnings from a preset. Rejected while running.
    /// Invalid entries fall back to held values or defaults; warnings that
    /// survive keep their fired flag until the next reset.
    pub fn apply_preset(&mut self, preset: &Preset) -> Result<Event, TimerError> {
        self.ensure_idle("apply a preset")?;
        self.initialize_from(preset);
        Ok(self.count_changed())
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn initialize_from(&mut self, preset: &Preset) {
        let count = preset
            .bell_count
            .filter(|&n| is_valid_count(n))
            .unwrap_or_else(|| self.warning_count());
        if let Err(err) = self
            .warnings
            .initialize(count, |position| preset.warning(position))
        {
            warn!(%err, "preset ignored");
        }
    }

    fn ensure_idle(&self, operation: &'static str) -> Result<(), TimerError> {
        if self.is_running() {
            warn!(operation, "rejected while running");
            return Err(TimerError::PreconditionViolation { operation });
        }
        Ok(())
    }

    fn laps_changed(&self) -> Event {
        Event::LapsChanged {
            laps: self.laps.as_vec(),
            at: Utc::now(),
        }
    }

    fn count_changed(&self) -> Event {
        Event::WarningCountChanged {
            count: self.warning_count(),
            at: Utc::now(),
        }
    }
}
