use std::time::{Duration, Instant};

/// Delay between the last keystroke and the search filter being applied
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Debounces a text input: a value is released once it has been stable for the delay
#[derive(Debug)]
pub struct SearchDebouncer {
    pending: Option<String>,
    /// Track last change for settle detection
    last_change: Option<Instant>,
    delay: Duration,
}

impl Default for SearchDebouncer {
    fn default() -> Self {
        Self::new(SEARCH_DEBOUNCE)
    }
}

impl SearchDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            pending: None,
            last_change: None,
            delay,
        }
    }

    /// Record new input text at `now`, restarting the timer
    pub fn input(&mut self, text: impl Into<String>, now: Instant) {
        self.pending = Some(text.into());
        self.last_change = Some(now);
    }

    /// Take the pending value if it has settled. Each value is released once.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        let last_change = self.last_change?;
        if now.duration_since(last_change) < self.delay {
            return None;
        }
        self.last_change = None;
        self.pending.take()
    }

    /// Time left before the pending value settles
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.last_change
            .map(|last| self.delay.saturating_sub(now.duration_since(last)))
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
