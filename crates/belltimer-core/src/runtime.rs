//! Runner that wires the engine to a clock, bells and a view.
//!
//! All timer state lives in the single task running [`TimerRunner::run`].
//! Clock ticks and user commands arrive on channels and are handled one at a
//! time; bells run in their own detached tasks and never touch the engine.

use std::io::Write;
use std::str::FromStr;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::bells::BellScheduler;
use crate::clock::{ClockDriver, ClockTick};
use crate::error::TimerError;
use crate::events::Event;
use crate::timer::TimerEngine;

/// User actions accepted by the runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Pause,
    Reset,
    Lap,
    ClearLaps,
    SetCount(usize),
    IncreaseCount,
    DecreaseCount,
    /// `index` is 0-based.
    SetThreshold { index: usize, seconds: i64 },
    Snapshot,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized command '{0}'")]
pub struct ParseCommandError(pub String);

impl FromStr for Command {
    type Err = ParseCommandError;

    /// Parse a line such as `start`, `count 4` or `set 2 600`. Warning
    /// positions in `set` are 1-based, matching the bell labels.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let err = || ParseCommandError(line.trim().to_string());
        let mut words = line.split_whitespace();
        let name = words.next().ok_or_else(err)?;
        let number = |words: &mut std::str::SplitWhitespace<'_>| -> Result<i64, ParseCommandError> {
            words
                .next()
                .and_then(|w| w.parse::<i64>().ok())
                .ok_or_else(err)
        };

        let command = match name.to_ascii_lowercase().as_str() {
            "start" | "s" => Command::Start,
            "pause" | "p" => Command::Pause,
            "reset" | "r" => Command::Reset,
            "lap" | "l" => Command::Lap,
            "clear" => Command::ClearLaps,
            "+" | "more" => Command::IncreaseCount,
            "-" | "less" => Command::DecreaseCount,
            "count" => {
                let n = number(&mut words)?;
                Command::SetCount(usize::try_from(n).map_err(|_| err())?)
            }
            "set" => {
                let position = number(&mut words)?;
                let seconds = number(&mut words)?;
                let index = usize::try_from(position)
                    .ok()
                    .and_then(|p| p.checked_sub(1))
                    .ok_or_else(err)?;
                Command::SetThreshold { index, seconds }
            }
            "status" => Command::Snapshot,
            "quit" | "q" | "exit" => Command::Quit,
            _ => return Err(err()),
        };
        if words.next().is_some() {
            return Err(err());
        }
        Ok(command)
    }
}

/// Rendering/notification sink.
pub trait EventSink: Send {
    fn emit(&mut self, event: &Event);

    /// A command was refused. State is unchanged.
    fn rejected(&mut self, err: &TimerError) {
        warn!(%err, "command rejected");
    }
}

/// Writes each event as one JSON line.
#[derive(Debug)]
pub struct JsonLinesSink<W> {
    out: W,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> EventSink for JsonLinesSink<W> {
    fn emit(&mut self, event: &Event) {
        let written = serde_json::to_writer(&mut self.out, event)
            .map_err(std::io::Error::from)
            .and_then(|_| self.out.write_all(b"\n"))
            .and_then(|_| self.out.flush());
        if let Err(err) = written {
            warn!(%err, "failed to write event");
        }
    }
}

/// Collects events in memory.
#[derive(Debug, Default)]
pub struct VecSink {
    pub events: Vec<Event>,
    pub rejections: Vec<TimerError>,
}

impl EventSink for VecSink {
    fn emit(&mut self, event: &Event) {
        self.events.push(event.clone());
    }

    fn rejected(&mut self, err: &TimerError) {
        self.rejections.push(err.clone());
    }
}

pub struct TimerRunner<S> {
    engine: TimerEngine,
    clock: ClockDriver,
    bells: BellScheduler,
    sink: S,
}

impl<S: EventSink> TimerRunner<S> {
    pub fn new(engine: TimerEngine, bells: BellScheduler, sink: S) -> Self {
        Self {
            engine,
            clock: ClockDriver::default(),
            bells,
            sink,
        }
    }

    pub fn with_tick_period(mut self, period: Duration) -> Self {
        self.clock = ClockDriver::new(period);
        self
    }

    pub fn engine(&self) -> &TimerEngine {
        &self.engine
    }

    /// Handle commands until `Quit` or until the sender is dropped.
    /// Returns the final engine and the sink.
    pub async fn run(mut self, mut commands: mpsc::Receiver<Command>) -> (TimerEngine, S) {
        let (tick_tx, mut tick_rx) = mpsc::unbounded_channel::<ClockTick>();
        self.sink.emit(&self.engine.snapshot());

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    None | Some(Command::Quit) => break,
                    Some(command) => self.handle(command, &tick_tx),
                },
                Some(tick) = tick_rx.recv() => {
                    if self.clock.accepts(tick) {
                        self.on_tick();
                    } else {
                        debug!(generation = tick.generation, "dropping stale tick");
                    }
                }
            }
        }

        self.clock.stop();
        (self.engine, self.sink)
    }

    fn handle(&mut self, command: Command, tick_tx: &mpsc::UnboundedSender<ClockTick>) {
        let result = match command {
            Command::Start => {
                if let Some(event) = self.engine.start() {
                    self.clock.start(tick_tx.clone());
                    self.sink.emit(&event);
                }
                Ok(())
            }
            Command::Pause => {
                if let Some(event) = self.engine.pause() {
                    self.clock.stop();
                    self.sink.emit(&event);
                }
                Ok(())
            }
            Command::Reset => {
                self.clock.stop();
                for event in self.engine.reset() {
                    self.sink.emit(&event);
                }
                Ok(())
            }
            Command::Lap => {
                let event = self.engine.record_lap();
                self.sink.emit(&event);
                Ok(())
            }
            Command::ClearLaps => {
                let event = self.engine.clear_laps();
                self.sink.emit(&event);
                Ok(())
            }
            Command::SetCount(n) => self.engine.set_count(n).map(|e| self.sink.emit(&e)),
            Command::IncreaseCount => self.engine.increase_count().map(|e| self.sink.emit(&e)),
            Command::DecreaseCount => self.engine.decrease_count().map(|e| self.sink.emit(&e)),
            Command::SetThreshold { index, seconds } => self
                .engine
                .set_threshold(index, seconds)
                .map(|e| self.sink.emit(&e)),
            Command::Snapshot => {
                self.sink.emit(&self.engine.snapshot());
                Ok(())
            }
            Command::Quit => Ok(()),
        };
        if let Err(err) = result {
            self.sink.rejected(&err);
        }
    }

    fn on_tick(&mut self) {
        for event in self.engine.tick() {
            if let Event::WarningFired { bell_count, .. } = event {
                // Fire and forget; pause/reset leave the rings alone.
                drop(self.bells.schedule(bell_count));
            }
            self.sink.emit(&event);
        }
    }
}
