//! End-to-end scenarios for the timer engine, presets and bells.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use belltimer_core::{
    BellPlayer, BellQueue, Command, Event, Preset, Simulation, TimerEngine, TimerError,
    WarningThresholds,
};

#[derive(Default)]
struct CountingPlayer(AtomicUsize);

impl BellPlayer for CountingPlayer {
    fn play_bell(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

fn bell_counts(events: &[Event]) -> Vec<u32> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::WarningFired { bell_count, .. } => Some(*bell_count),
            _ => None,
        })
        .collect()
}

#[test]
fn test_escalating_warnings() {
    let mut engine = TimerEngine::new(WarningThresholds::from_thresholds(&[5, 10, 15]).unwrap());
    engine.start();

    let first: Vec<Event> = (0..5).flat_map(|_| engine.tick()).collect();
    assert_eq!(bell_counts(&first), vec![1]);

    let second: Vec<Event> = (5..10).flat_map(|_| engine.tick()).collect();
    assert_eq!(bell_counts(&second), vec![2]);
    assert_eq!(engine.fired(), vec![true, true, false]);
}

#[test]
fn test_shrink_while_paused_and_reject_while_running() {
    let mut engine = TimerEngine::new(WarningThresholds::from_thresholds(&[5, 10, 15]).unwrap());
    engine.set_count(2).unwrap();
    assert_eq!(engine.thresholds(), vec![5, 10]);
    assert_eq!(engine.fired().len(), 2);

    engine.start();
    assert!(matches!(
        engine.set_count(3),
        Err(TimerError::PreconditionViolation { .. })
    ));
    assert_eq!(engine.warning_count(), 2);
}

#[test]
fn test_laps_newest_first() {
    let mut engine = TimerEngine::default();
    engine.start();
    (0..30).for_each(|_| {
        engine.tick();
    });
    engine.record_lap();
    (30..75).for_each(|_| {
        engine.tick();
    });
    engine.record_lap();
    assert_eq!(engine.laps().as_vec(), vec![75, 30]);
}

#[test]
fn test_preset_with_invalid_value_falls_back() {
    let preset = Preset::from_query("bell_count=2&w1=60&w2=abc");
    let engine = TimerEngine::from_preset(&preset);
    assert_eq!(engine.warning_count(), 2);
    assert_eq!(engine.thresholds(), vec![60, 2 * 300]);
    assert_eq!(engine.fired(), vec![false, false]);
}

#[test]
fn test_preset_grows_past_held_values() {
    let preset = Preset::from_query("bell_count=5&w5=42");
    let engine = TimerEngine::from_preset(&preset);
    assert_eq!(engine.thresholds(), vec![300, 600, 900, 1200, 42]);
}

#[test]
fn test_simulated_session_rings_every_bell() {
    let engine = TimerEngine::from_preset(&Preset::from_query("bell_count=3&w1=2&w2=4&w3=6"));
    let mut sim = Simulation::new(engine, CountingPlayer::default())
        .with_bell_queue(BellQueue::new(Duration::from_millis(80)));

    sim.apply(Command::Start).unwrap();
    let events = sim.advance(6);
    assert_eq!(bell_counts(&events), vec![1, 2, 3]);

    sim.flush_bells();
    assert_eq!(sim.player().0.load(Ordering::SeqCst), 6);

    sim.apply(Command::Reset).unwrap();
    assert_eq!(sim.engine().elapsed_secs(), 0);
    assert!(sim.engine().fired().iter().all(|f| !f));
}

#[test]
fn test_threshold_edit_below_elapsed_rings_once_per_cycle() {
    let mut engine = TimerEngine::new(WarningThresholds::from_thresholds(&[100]).unwrap());
    engine.start();
    (0..10).for_each(|_| {
        engine.tick();
    });
    engine.pause();
    engine.set_threshold(0, 3).unwrap();
    engine.start();

    // Newly reached and unfired: it rings once on the next tick, not on every tick.
    let events: Vec<Event> = (0..5).flat_map(|_| engine.tick()).collect();
    assert_eq!(bell_counts(&events), vec![1]);

    engine.reset();
    engine.start();
    let events: Vec<Event> = (0..3).flat_map(|_| engine.tick()).collect();
    assert_eq!(bell_counts(&events), vec![1]);
}
