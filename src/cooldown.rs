//! Cooldown tracking for greeting dispatch
//!
//! Each identity moves through three states: never greeted, recently
//! greeted (suppressed), and eligible again once the window has elapsed.
//! Eligible behaves exactly like never greeted. State is confined to the
//! detection loop's thread; time is passed in so tests stay deterministic.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Tracks the last-greeted time per identity
#[derive(Debug)]
pub struct CooldownTracker {
    window: Duration,
    last_greeted: HashMap<String, Instant>,
}

impl CooldownTracker {
    /// Create a tracker with the given suppression window
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_greeted: HashMap::new(),
        }
    }

    /// Decide whether `key` may be greeted at `now`, recording the greeting
    /// if so.
    ///
    /// Returns true for an identity never seen before, or one whose last
    /// greeting is strictly older than the window. Within the window
    /// (inclusive of the boundary) the greeting is suppressed and the
    /// recorded timestamp is left untouched.
    pub fn try_greet(&mut self, key: &str, now: Instant) -> bool {
        if let Some(&last) = self.last_greeted.get(key) {
            if now.saturating_duration_since(last) <= self.window {
                return false;
            }
        }
        self.last_greeted.insert(key.to_string(), now);
        true
    }

    /// The configured suppression window
    #[must_use]
    pub const fn window(&self) -> Duration {
        self.window
    }

    /// Number of identities that have ever been greeted
    #[must_use]
    pub fn tracked(&self) -> usize {
        self.last_greeted.len()
    }
}
