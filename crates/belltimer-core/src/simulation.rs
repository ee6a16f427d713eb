//! Deterministic, single-threaded session on a virtual clock.
//!
//! Drives the same engine and command set as [`TimerRunner`](crate::runtime::TimerRunner)
//! but advances time by explicit calls, queueing bells in a [`BellQueue`].
//! Used by `belltimer simulate` and by tests that must not wait on real time.

use std::time::Duration;

use crate::bells::{BellPlayer, BellQueue};
use crate::clock::TICK_INTERVAL;
use crate::error::TimerError;
use crate::events::Event;
use crate::runtime::Command;
use crate::timer::TimerEngine;

#[derive(Debug)]
pub struct Simulation<P> {
    engine: TimerEngine,
    bells: BellQueue,
    player: P,
    now: Duration,
    tick_period: Duration,
}

impl<P: BellPlayer> Simulation<P> {
    pub fn new(engine: TimerEngine, player: P) -> Self {
        Self {
            engine,
            bells: BellQueue::default(),
            player,
            now: Duration::ZERO,
            tick_period: TICK_INTERVAL,
        }
    }

    pub fn with_bell_queue(mut self, bells: BellQueue) -> Self {
        self.bells = bells;
        self
    }

    /// Virtual time between ticks. Defaults to one second.
    pub fn with_tick_period(mut self, period: Duration) -> Self {
        self.tick_period = period;
        self
    }

    pub fn engine(&self) -> &TimerEngine {
        &self.engine
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    pub fn bells(&self) -> &BellQueue {
        &self.bells
    }

    /// Virtual time since the simulation began.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Apply one user command. `Quit` is accepted and does nothing.
    pub fn apply(&mut self, command: Command) -> Result<Vec<Event>, TimerError> {
        let engine = &mut self.engine;
        let events = match command {
            Command::Start => engine.start().into_iter().collect(),
            Command::Pause => engine.pause().into_iter().collect(),
            Command::Reset => engine.reset(),
            Command::Lap => vec![engine.record_lap()],
            Command::ClearLaps => vec![engine.clear_laps()],
            Command::SetCount(n) => vec![engine.set_count(n)?],
            Command::IncreaseCount => vec![engine.increase_count()?],
            Command::DecreaseCount => vec![engine.decrease_count()?],
            Command::SetThreshold { index, seconds } => vec![engine.set_threshold(index, seconds)?],
            Command::Snapshot => vec![engine.snapshot()],
            Command::Quit => Vec::new(),
        };
        Ok(events)
    }

    /// Advance virtual time by `ticks` tick periods, ticking the engine at
    /// each boundary and playing bells as they fall due.
    pub fn advance(&mut self, ticks: u64) -> Vec<Event> {
        let mut events = Vec::new();
        for _ in 0..ticks {
            self.now += self.tick_period;
            self.bells.run_due(self.now, &self.player);
            for event in self.engine.tick() {
                if let Event::WarningFired { bell_count, .. } = event {
                    self.bells.schedule(bell_count, self.now);
                }
                events.push(event);
            }
            self.bells.run_due(self.now, &self.player);
        }
        events
    }

    /// Play every bell still queued, moving the clock past the last one.
    pub fn flush_bells(&mut self) -> usize {
        match self.bells.pending().iter().map(|b| b.due).max() {
            Some(last) => {
                self.now = self.now.max(last);
                self.bells.run_due(self.now, &self.player)
            }
            None => 0,
        }
    }
}
