//! Shared scheduling clock for per-planet repeating events.
//!
//! Events live on a grid `first_at + k * interval` measured in transport
//! seconds, so firing times never accumulate timer drift. Starting and
//! stopping the transport pauses or resumes every event at once.

use smallvec::SmallVec;
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventId(u64);

#[derive(Clone, Debug, PartialEq)]
struct RepeatingEvent {
    id: EventId,
    key: String,
    interval: f64,
    next_at: f64,
}

/// One firing of a repeating event.
#[derive(Clone, Debug, PartialEq)]
pub struct Fired {
    pub id: EventId,
    pub key: String,
    /// Grid time the event was due, in transport seconds.
    pub at: f64,
}

pub type FiredEvents = SmallVec<[Fired; 8]>;

#[derive(Debug, Default)]
pub struct Transport {
    position: f64,
    running: bool,
    next_id: u64,
    events: Vec<RepeatingEvent>,
}

impl Transport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Current transport time in seconds.
    pub fn position(&self) -> f64 {
        self.position
    }

    /// Schedule `key` to fire every `interval` seconds, first after `offset`.
    ///
    /// A key has at most one event: scheduling it again replaces the old one.
    pub fn schedule_repeat(&mut self, key: &str, interval: f64, offset: f64) -> EventId {
        self.cancel(key);
        let id = EventId(self.next_id);
        self.next_id += 1;
        self.events.push(RepeatingEvent {
            id,
            key: key.to_string(),
            interval: interval.max(f64::EPSILON),
            next_at: self.position + offset.max(0.0),
        });
        id
    }

    /// Returns true if an event for `key` was removed.
    pub fn cancel(&mut self, key: &str) -> bool {
        let before = self.events.len();
        self.events.retain(|e| e.key != key);
        self.events.len() != before
    }

    /// Drop every scheduled event.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn is_scheduled(&self, key: &str) -> bool {
        self.events.iter().any(|e| e.key == key)
    }

    pub fn interval_of(&self, key: &str) -> Option<f64> {
        self.events.iter().find(|e| e.key == key).map(|e| e.interval)
    }

    pub fn scheduled_count(&self) -> usize {
        self.events.len()
    }

    /// Advance by `dt` and collect due events, in due-time order.
    ///
    /// Each event fires at most once per call; if several grid points were
    /// skipped (a stalled frame loop) it re-aligns to the next point ahead
    /// instead of bursting.
    pub fn advance(&mut self, dt: Duration, out: &mut FiredEvents) {
        if !self.running {
            return;
        }
        self.position += dt.as_secs_f64();
        for ev in self.events.iter_mut() {
            if ev.next_at > self.position {
                continue;
            }
            out.push(Fired {
                id: ev.id,
                key: ev.key.clone(),
                at: ev.next_at,
            });
            let behind = self.position - ev.next_at;
            let steps = (behind / ev.interval).floor() + 1.0;
            ev.next_at += steps * ev.interval;
        }
        out.sort_by(|a, b| a.at.total_cmp(&b.at));
    }
}
