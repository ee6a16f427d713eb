use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{TimerPhase, Warning};

/// Every state change in the timer produces an Event.
/// Views render from them; the runner rings bells on `WarningFired`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        elapsed_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        elapsed_secs: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        at: DateTime<Utc>,
    },
    ElapsedChanged {
        elapsed_secs: u64,
        at: DateTime<Utc>,
    },
    /// A warning threshold was crossed for the first time since reset.
    WarningFired {
        index: usize,
        threshold_secs: u64,
        bell_count: u32,
        at: DateTime<Utc>,
    },
    WarningCountChanged {
        count: usize,
        at: DateTime<Utc>,
    },
    ThresholdChanged {
        index: usize,
        threshold_secs: u64,
        at: DateTime<Utc>,
    },
    LapsChanged {
        /// Newest first.
        laps: Vec<u64>,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        phase: TimerPhase,
        elapsed_secs: u64,
        warnings: Vec<Warning>,
        laps: Vec<u64>,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Short machine name, matching the serialized `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::TimerStarted { .. } => "TimerStarted",
            Event::TimerPaused { .. } => "TimerPaused",
            Event::TimerReset { .. } => "TimerReset",
            Event::ElapsedChanged { .. } => "ElapsedChanged",
            Event::WarningFired { .. } => "WarningFired",
            Event::WarningCountChanged { .. } => "WarningCountChanged",
            Event::ThresholdChanged { .. } => "ThresholdChanged",
            Event::LapsChanged { .. } => "LapsChanged",
            Event::StateSnapshot { .. } => "StateSnapshot",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_type_tag() {
        let event = Event::WarningFired {
            index: 1,
            threshold_secs: 600,
            bell_count: 2,
            at: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "WarningFired");
        assert_eq!(json["bell_count"], 2);
        assert_eq!(event.kind(), "WarningFired");
    }
}
