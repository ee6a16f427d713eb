//! Bell scheduling.
//!
//! A bell event asks for `count` rings spaced `interval` apart, measured from
//! the moment of the request. Requests are independent: two warnings fired on
//! the same tick produce two interleaved sequences, neither waiting for the
//! other.
//!
//! Two schedulers share that contract:
//!
//! - [`BellQueue`] keeps pending rings in a list and plays them when the
//!   caller advances a virtual clock. Deterministic; no runtime needed.
//! - [`BellScheduler`] spawns one detached tokio task per request.
//!
//! Neither touches timer state. Pausing or resetting the timer does not cancel
//! bells already scheduled.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::debug;

/// Spacing between consecutive rings of one request.
pub const BELL_INTERVAL: Duration = Duration::from_millis(80);

/// Audio capability: play one bell sound, without blocking.
pub trait BellPlayer: Send + Sync {
    fn play_bell(&self);
}

impl<T: BellPlayer + ?Sized> BellPlayer for Arc<T> {
    fn play_bell(&self) {
        (**self).play_bell()
    }
}

/// One pending ring in a [`BellQueue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledBell {
    /// Identifies the request this ring belongs to.
    pub sequence: u64,
    /// 1-based position within the request.
    pub ring: u32,
    /// Virtual time at which the ring is due.
    pub due: Duration,
}

/// Virtual-clock bell queue.
#[derive(Debug, Clone)]
pub struct BellQueue {
    interval: Duration,
    next_sequence: u64,
    pending: Vec<ScheduledBell>,
}

impl Default for BellQueue {
    fn default() -> Self {
        Self::new(BELL_INTERVAL)
    }
}

impl BellQueue {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_sequence: 0,
            pending: Vec::new(),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Queue `count` rings starting at `now`. Returns the request's sequence id.
    pub fn schedule(&mut self, count: u32, now: Duration) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.pending.extend((0..count).map(|offset| ScheduledBell {
            sequence,
            ring: offset + 1,
            due: now + self.interval * offset,
        }));
        debug!(sequence, count, "bells queued");
        sequence
    }

    /// Play and drop every ring due at or before `now`, earliest first.
    /// Returns the number of rings played.
    pub fn run_due(&mut self, now: Duration, player: &dyn BellPlayer) -> usize {
        let (mut due, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|bell| bell.due <= now);
        self.pending = pending;
        due.sort_by_key(|bell| (bell.due, bell.sequence, bell.ring));
        for _ in &due {
            player.play_bell();
        }
        due.len()
    }

    pub fn pending(&self) -> &[ScheduledBell] {
        &self.pending
    }

    pub fn next_due(&self) -> Option<Duration> {
        self.pending.iter().map(|bell| bell.due).min()
    }

    /// Drop the remaining rings of one request.
    pub fn cancel(&mut self, sequence: u64) -> usize {
        let before = self.pending.len();
        self.pending.retain(|bell| bell.sequence != sequence);
        before - self.pending.len()
    }

    pub fn cancel_all(&mut self) -> usize {
        let dropped = self.pending.len();
        self.pending.clear();
        dropped
    }
}

/// Tokio-backed fire-and-forget scheduler.
#[derive(Clone)]
pub struct BellScheduler {
    player: Arc<dyn BellPlayer>,
    interval: Duration,
}

impl std::fmt::Debug for BellScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BellScheduler")
            .field("interval", &self.interval)
            .finish_non_exhaustive()
    }
}

impl BellScheduler {
    pub fn new(player: Arc<dyn BellPlayer>) -> Self {
        Self::with_interval(player, BELL_INTERVAL)
    }

    pub fn with_interval(player: Arc<dyn BellPlayer>, interval: Duration) -> Self {
        Self { player, interval }
    }

    /// Ring `count` times, spaced from now. Must be called inside a tokio
    /// runtime. Dropping the handle does not cancel the rings.
    pub fn schedule(&self, count: u32) -> BellHandle {
        let player = Arc::clone(&self.player);
        let interval = self.interval;
        let start = Instant::now();
        debug!(count, "bells scheduled");
        let task = tokio::spawn(async move {
            for offset in 0..count {
                sleep_until(start + interval * offset).await;
                player.play_bell();
            }
        });
        BellHandle { task }
    }
}

/// Handle to one scheduled bell sequence.
#[derive(Debug)]
pub struct BellHandle {
    task: JoinHandle<()>,
}

impl BellHandle {
    /// Stop the rings that have not played yet.
    pub fn abort(&self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait until every ring of this sequence has played.
    pub async fn finished(self) {
        let _ = self.task.await;
    }
}
