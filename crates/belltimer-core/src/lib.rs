//! # Belltimer Core Library
//!
//! Business logic for an interval timer that rings escalating warning bells:
//! the first warning rings once, the second twice, and so on. The CLI is a
//! thin layer over the same library.
//!
//! ## Architecture
//!
//! - **Timer Engine**: tick-driven state machine owning elapsed time, the
//!   warning thresholds and the lap list. The caller invokes `tick()`.
//! - **Clock Driver**: tokio interval producing one tick per second
//! - **Bells**: fire-and-forget ring sequences, on tokio or a virtual clock
//! - **Presets**: `bell_count`/`w1..wN` query strings for shareable setups
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core timer state machine
//! - [`BellScheduler`] / [`BellQueue`]: Bell sequencing
//! - [`TimerRunner`]: Async glue between clock, engine, bells and a view
//! - [`Config`]: Application configuration management

pub mod audio;
pub mod bells;
pub mod clock;
pub mod config;
pub mod error;
pub mod events;
pub mod format;
pub mod preset;
pub mod runtime;
pub mod simulation;
pub mod timer;

pub use audio::{BellTone, TerminalBell, TracingBell};
pub use bells::{BellHandle, BellPlayer, BellQueue, BellScheduler, BELL_INTERVAL};
pub use clock::{ClockDriver, ClockTick, TICK_INTERVAL};
pub use config::Config;
pub use error::{ConfigError, CoreError, TimerError};
pub use events::Event;
pub use preset::Preset;
pub use runtime::{Command, EventSink, JsonLinesSink, TimerRunner, VecSink};
pub use simulation::Simulation;
pub use timer::{LapRecorder, ThresholdPolicy, TimerEngine, TimerPhase, Warning, WarningThresholds};
