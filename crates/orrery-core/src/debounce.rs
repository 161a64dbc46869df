use instant::Instant;
use std::time::Duration;

/// Trailing-edge debouncer for continuous UI controls.
///
/// Every `push` restarts the quiet window; `poll` yields the latest value
/// once the window has passed with no new pushes.
#[derive(Clone, Debug)]
pub struct Debouncer<T> {
    window: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    pub fn push(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now));
    }

    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let ready = match &self.pending {
            Some((_, at)) => now >= *at + self.window,
            None => false,
        };
        if ready {
            self.pending.take().map(|(v, _)| v)
        } else {
            None
        }
    }

    /// Take the pending value immediately, ignoring the window.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(v, _)| v)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
