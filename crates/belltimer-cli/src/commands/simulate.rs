use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use belltimer_core::{BellPlayer, BellQueue, Command, Simulation, TimerEngine};
use clap::Args;
use serde::Serialize;

use super::{load_config, resolve_preset};

#[derive(Args)]
pub struct SimulateArgs {
    /// Preset query string
    #[arg(long)]
    preset: Option<String>,
    /// Full URL carrying a preset query
    #[arg(long, conflicts_with = "preset")]
    url: Option<String>,
    /// Steps separated by ';', e.g. "start; tick 300; lap; pause"
    script: String,
    /// Print only the final summary
    #[arg(long)]
    quiet: bool,
}

#[derive(Default)]
struct RingCounter(AtomicUsize);

impl BellPlayer for RingCounter {
    fn play_bell(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }
}

#[derive(Serialize)]
struct Summary {
    elapsed_secs: u64,
    virtual_ms: u64,
    running: bool,
    thresholds: Vec<u64>,
    fired: Vec<bool>,
    laps: Vec<u64>,
    bells_rung: usize,
    rejected: usize,
}

enum Step {
    Tick(u64),
    Command(Command),
}

fn parse_step(text: &str) -> Result<Step, Box<dyn std::error::Error>> {
    let mut words = text.split_whitespace();
    match words.next() {
        Some("tick") | Some("wait") => {
            let n = match words.next() {
                Some(n) => n.parse::<u64>()?,
                None => 1,
            };
            Ok(Step::Tick(n))
        }
        _ => Ok(Step::Command(text.parse::<Command>()?)),
    }
}

pub fn run(args: SimulateArgs, config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path)?;
    let preset = resolve_preset(&config, args.preset.as_deref(), args.url.as_deref());
    let engine = TimerEngine::from_preset(&preset).with_policy(config.timer.threshold_policy);

    let steps = args
        .script
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(parse_step)
        .collect::<Result<Vec<_>, _>>()?;

    let mut sim = Simulation::new(engine, RingCounter::default())
        .with_bell_queue(BellQueue::new(config.bells.interval()))
        .with_tick_period(config.timer.tick_period());
    let mut rejected = 0;

    for step in steps {
        let events = match step {
            Step::Tick(n) => sim.advance(n),
            Step::Command(Command::Quit) => break,
            Step::Command(command) => match sim.apply(command) {
                Ok(events) => events,
                Err(err) => {
                    eprintln!("warning: {err}");
                    rejected += 1;
                    Vec::new()
                }
            },
        };
        if !args.quiet {
            for event in events {
                println!("{}", serde_json::to_string(&event)?);
            }
        }
    }
    sim.flush_bells();

    let engine = sim.engine();
    let summary = Summary {
        elapsed_secs: engine.elapsed_secs(),
        virtual_ms: u64::try_from(sim.now().as_millis()).unwrap_or(u64::MAX),
        running: engine.is_running(),
        thresholds: engine.thresholds(),
        fired: engine.fired(),
        laps: engine.laps().as_vec(),
        bells_rung: sim.player().0.load(Ordering::Relaxed),
        rejected,
    };
    println!("{}", serde_json::to_string(&summary)?);
    Ok(())
}
