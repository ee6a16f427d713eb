use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Elapsed-time snapshots, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LapRecorder {
    laps: VecDeque<u64>,
}

impl LapRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend a lap. Duplicates are kept.
    pub fn record(&mut self, elapsed_secs: u64) {
        self.laps.push_front(elapsed_secs);
    }

    pub fn clear(&mut self) {
        self.laps.clear();
    }

    pub fn len(&self) -> usize {
        self.laps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.laps.is_empty()
    }

    pub fn latest(&self) -> Option<u64> {
        self.laps.front().copied()
    }

    /// Newest first.
    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.laps.iter().copied()
    }

    pub fn as_vec(&self) -> Vec<u64> {
        self.iter().collect()
    }

    /// `(lap_number, elapsed_secs)` newest first; the oldest lap is number 1.
    pub fn numbered(&self) -> Vec<(usize, u64)> {
        let len = self.len();
        self.iter()
            .enumerate()
            .map(|(position, elapsed)| (len - position, elapsed))
            .collect()
    }
}
