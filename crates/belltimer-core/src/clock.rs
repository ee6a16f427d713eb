//! Clock driver: one tick per period while started.
//!
//! The driver only produces ticks; it never touches the engine. Each start
//! opens a new generation so a consumer can drop ticks that were already in
//! flight when the clock was stopped.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockTick {
    pub generation: u64,
}

/// Cancellable periodic task. Dropping the handle stops the ticks.
#[derive(Debug)]
pub struct ClockHandle {
    generation: u64,
    task: JoinHandle<()>,
}

impl ClockHandle {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Drop for ClockHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[derive(Debug)]
pub struct ClockDriver {
    period: Duration,
    generation: u64,
    handle: Option<ClockHandle>,
}

impl Default for ClockDriver {
    fn default() -> Self {
        Self::new(TICK_INTERVAL)
    }
}

impl ClockDriver {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            generation: 0,
            handle: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Generation of the running clock, if any.
    pub fn current_generation(&self) -> Option<u64> {
        self.handle.as_ref().map(ClockHandle::generation)
    }

    /// Start ticking into `tx`. The first tick arrives one period after
    /// start. Returns false if the clock was already running.
    pub fn start(&mut self, tx: UnboundedSender<ClockTick>) -> bool {
        if self.handle.is_some() {
            return false;
        }
        self.generation += 1;
        let generation = self.generation;
        let period = self.period;
        let task = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);
            loop {
                ticker.tick().await;
                if tx.send(ClockTick { generation }).is_err() {
                    break;
                }
            }
        });
        debug!(generation, ?period, "clock started");
        self.handle = Some(ClockHandle { generation, task });
        true
    }

    /// Stop ticking. Returns false if the clock was not running.
    pub fn stop(&mut self) -> bool {
        match self.handle.take() {
            Some(handle) => {
                debug!(generation = handle.generation, "clock stopped");
                true
            }
            None => false,
        }
    }

    /// Whether `tick` came from the clock as currently running.
    pub fn accepts(&self, tick: ClockTick) -> bool {
        self.current_generation() == Some(tick.generation)
    }
}
