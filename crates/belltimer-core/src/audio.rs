//! Bell tone description and the built-in bell players.
//!
//! One bell is two sine partials under an exponential decay envelope. The
//! library only describes the tone; how it sounds is the player's business.

use std::io::Write;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::bells::BellPlayer;

pub const BASE_FREQUENCY: f32 = 880.0;
pub const HARMONIC_FREQUENCY: f32 = 1320.0;
pub const BELL_DURATION: Duration = Duration::from_secs(1);

/// Envelope floor reached at the end of the tone.
const ENVELOPE_FLOOR: f32 = 0.0001;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BellTone {
    pub base_hz: f32,
    pub harmonic_hz: f32,
    #[serde(with = "duration_ms")]
    pub duration: Duration,
}

impl Default for BellTone {
    fn default() -> Self {
        Self {
            base_hz: BASE_FREQUENCY,
            harmonic_hz: HARMONIC_FREQUENCY,
            duration: BELL_DURATION,
        }
    }
}

impl BellTone {
    /// Gain at `t` seconds: 1.0 at the start, decaying exponentially to the
    /// floor at `duration`, silent afterwards.
    pub fn envelope(&self, t: f32) -> f32 {
        let length = self.duration.as_secs_f32();
        if t < 0.0 || t > length || length == 0.0 {
            return 0.0;
        }
        ENVELOPE_FLOOR.powf(t / length)
    }
}

/// Rings the terminal bell (BEL, 0x07) on stderr, keeping stdout for events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalBell;

impl BellPlayer for TerminalBell {
    fn play_bell(&self) {
        let mut out = std::io::stderr().lock();
        if let Err(err) = out.write_all(b"\x07").and_then(|_| out.flush()) {
            warn!(%err, "failed to ring terminal bell");
        }
    }
}

/// Logs each bell instead of making a sound.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingBell {
    pub tone: Option<BellTone>,
}

impl BellPlayer for TracingBell {
    fn play_bell(&self) {
        let tone = self.tone.unwrap_or_default();
        info!(
            base_hz = tone.base_hz,
            harmonic_hz = tone.harmonic_hz,
            duration_ms = tone.duration.as_millis() as u64,
            "bell"
        );
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
