//! Warning threshold store.
//!
//! Each warning is a `{threshold_secs, fired}` record, so the threshold list
//! and the fired flags can never drift apart in length. The warning at index
//! `i` rings `i + 1` bells.

use serde::{Deserialize, Serialize};

use crate::error::TimerError;

pub const MIN_WARNING_COUNT: usize = 1;
pub const MAX_WARNING_COUNT: usize = 10;
pub const DEFAULT_WARNING_COUNT: usize = 3;
/// Largest accepted threshold, in seconds.
pub const MAX_SECONDS: u64 = 99_999_999;

/// Seconds added per step when a warning is appended by a resize.
const GROW_STEP_SECS: u64 = 60;
/// Seconds per index for presets that leave a warning unset.
const PRESET_STEP_SECS: u64 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    pub threshold_secs: u64,
    #[serde(default)]
    pub fired: bool,
}

impl Warning {
    pub fn new(threshold_secs: u64) -> Self {
        Self {
            threshold_secs,
            fired: false,
        }
    }

    /// A zero threshold is disabled and is never reached.
    pub fn is_reached(&self, elapsed_secs: u64) -> bool {
        self.threshold_secs > 0 && elapsed_secs >= self.threshold_secs
    }
}

/// How out-of-range threshold input is handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdPolicy {
    /// Clamp into `0..=MAX_SECONDS`.
    #[default]
    Clamp,
    /// Refuse the edit with `InvalidThresholdValue`.
    Reject,
}

/// Number of bells rung by the warning at `index`.
pub fn bell_count_for(index: usize) -> u32 {
    u32::try_from(index).map_or(u32::MAX, |i| i.saturating_add(1))
}

/// Default threshold for 1-based preset slot `position`.
pub fn preset_default_secs(position: usize) -> u64 {
    (position as u64).saturating_mul(PRESET_STEP_SECS)
}

pub fn is_valid_count(count: usize) -> bool {
    (MIN_WARNING_COUNT..=MAX_WARNING_COUNT).contains(&count)
}

pub fn is_valid_seconds(seconds: i64) -> bool {
    seconds >= 0 && (seconds as u64) <= MAX_SECONDS
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarningThresholds {
    warnings: Vec<Warning>,
}

impl Default for WarningThresholds {
    /// Three warnings at 5, 10 and 15 minutes.
    fn default() -> Self {
        Self {
            warnings: (1..=DEFAULT_WARNING_COUNT)
                .map(|position| Warning::new(preset_default_secs(position)))
                .collect(),
        }
    }
}

impl WarningThresholds {
    /// Build a store from explicit threshold values, all unfired.
    pub fn from_thresholds(values: &[u64]) -> Result<Self, TimerError> {
        check_count(values.len())?;
        if let Some(&bad) = values.iter().find(|&&v| v > MAX_SECONDS) {
            return Err(TimerError::InvalidThresholdValue {
                value: i64::try_from(bad).unwrap_or(i64::MAX),
                max: MAX_SECONDS,
            });
        }
        Ok(Self {
            warnings: values.iter().copied().map(Warning::new).collect(),
        })
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Warning> {
        self.warnings.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Warning> {
        self.warnings.iter()
    }

    pub fn as_slice(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn thresholds(&self) -> Vec<u64> {
        self.warnings.iter().map(|w| w.threshold_secs).collect()
    }

    pub fn fired(&self) -> Vec<bool> {
        self.warnings.iter().map(|w| w.fired).collect()
    }

    /// Indices whose threshold is reached at `elapsed_secs`, fired or not.
    pub fn reached_indices(&self, elapsed_secs: u64) -> Vec<usize> {
        self.warnings
            .iter()
            .enumerate()
            .filter(|(_, w)| w.is_reached(elapsed_secs))
            .map(|(i, _)| i)
            .collect()
    }

    pub fn can_grow(&self) -> bool {
        self.len() < MAX_WARNING_COUNT
    }

    pub fn can_shrink(&self) -> bool {
        self.len() > MIN_WARNING_COUNT
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Append one unfired warning at `new_count * 60` seconds.
    pub fn grow(&mut self) -> Result<(), TimerError> {
        check_count(self.len() + 1)?;
        let new_count = self.len() as u64 + 1;
        self.warnings
            .push(Warning::new(new_count.saturating_mul(GROW_STEP_SECS)));
        Ok(())
    }

    /// Drop the last warning.
    pub fn shrink(&mut self) -> Result<(), TimerError> {
        check_count(self.len().saturating_sub(1))?;
        self.warnings.pop();
        Ok(())
    }

    /// Resize by repeated single steps. Validated up front, so a rejected
    /// resize changes nothing.
    pub fn resize(&mut self, count: usize) -> Result<(), TimerError> {
        check_count(count)?;
        while self.len() < count {
            self.grow()?;
        }
        while self.len() > count {
            self.shrink()?;
        }
        Ok(())
    }

    /// Set a threshold value. Returns the value actually stored.
    /// The fired flag is left alone.
    pub fn set_threshold(
        &mut self,
        index: usize,
        seconds: i64,
        policy: ThresholdPolicy,
    ) -> Result<u64, TimerError> {
        let count = self.len();
        let value = match policy {
            ThresholdPolicy::Clamp => seconds.clamp(0, MAX_SECONDS as i64) as u64,
            ThresholdPolicy::Reject if is_valid_seconds(seconds) => seconds as u64,
            ThresholdPolicy::Reject => {
                return Err(TimerError::InvalidThresholdValue {
                    value: seconds,
                    max: MAX_SECONDS,
                })
            }
        };
        let warning = self
            .warnings
            .get_mut(index)
            .ok_or(TimerError::InvalidIndex { index, count })?;
        warning.threshold_secs = value;
        Ok(value)
    }

    /// Replace the whole list from a preset lookup.
    ///
    /// For every 1-based slot: the candidate if present and in range, else the
    /// previously held non-zero value, else `slot * 300`. Slots that already
    /// existed keep their fired flag; new slots start unfired.
    pub fn initialize<F>(&mut self, count: usize, candidate: F) -> Result<(), TimerError>
    where
        F: Fn(usize) -> Option<u64>,
    {
        check_count(count)?;
        let warnings = (1..=count)
            .map(|position| {
                let previous = self.warnings.get(position - 1);
                let held = previous.map(|w| w.threshold_secs).filter(|&v| v > 0);
                let value = candidate(position)
                    .filter(|&v| v <= MAX_SECONDS)
                    .or(held)
                    .unwrap_or_else(|| preset_default_secs(position));
                Warning {
                    threshold_secs: value,
                    fired: previous.is_some_and(|w| w.fired),
                }
            })
            .collect();
        self.warnings = warnings;
        Ok(())
    }

    pub fn clear_fired(&mut self) {
        for warning in &mut self.warnings {
            warning.fired = false;
        }
    }

    /// Mark every newly reached warning as fired, ascending by index.
    /// Returns the indices that fired on this call.
    pub fn evaluate(&mut self, elapsed_secs: u64) -> Vec<usize> {
        let mut fired = Vec::new();
        for (index, warning) in self.warnings.iter_mut().enumerate() {
            if !warning.fired && warning.is_reached(elapsed_secs) {
                warning.fired = true;
                fired.push(index);
            }
        }
        fired
    }
}

fn check_count(count: usize) -> Result<(), TimerError> {
    if is_valid_count(count) {
        Ok(())
    } else {
        Err(TimerError::InvalidCount {
            requested: count,
            min: MIN_WARNING_COUNT,
            max: MAX_WARNING_COUNT,
        })
    }
}
