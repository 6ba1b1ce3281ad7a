//! Per-identifier sliding-window admission control.
//!
//! Each identifier owns an ordered window of admission timestamps behind its own lock; the outer
//! map lock is only held long enough to find (or create) that window. Windows that have aged out
//! empty are swept from the map at most once per window width.


use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::debug;

/// Default admissions per window.
pub const DEFAULT_MAX_CALLS: usize = 1000;

/// Default window width.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(3600);

type Window = Arc<Mutex<VecDeque<Instant>>>;

#[derive(Default)]
struct Windows {
    by_identifier: HashMap<String, Window>,
    last_sweep: Option<Instant>,
}

/// Sliding-window rate limiter keyed by caller identifier.
pub struct RateLimiter {
    max_calls: usize,
    window: Duration,
    windows: Mutex<Windows>,
}

impl RateLimiter {
    /// Creates a limiter admitting `max_calls` per `window` for each identifier.
    pub fn new(max_calls: usize, window: Duration) -> Self {
        Self {
            max_calls,
            window,
            windows: Mutex::new(Windows::default()),
        }
    }

    /// Returns the admission ceiling per window.
    pub fn max_calls(&self) -> usize {
        self.max_calls
    }

    /// Returns the window width.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Checks (and on success records) a call for `identifier` at the current instant.
    pub fn is_allowed(&self, identifier: &str) -> bool {
        self.try_acquire(identifier).is_ok()
    }

    /// Checks (and on success records) a call for `identifier` at `now`.
    pub fn is_allowed_at(&self, identifier: &str, now: Instant) -> bool {
        self.try_acquire_at(identifier, now).is_ok()
    }

    /// Like [`RateLimiter::is_allowed`], but a denial carries the time until a slot frees up.
    pub fn try_acquire(&self, identifier: &str) -> Result<(), Duration> {
        self.try_acquire_at(identifier, Instant::now())
    }

    /// Records a call for `identifier` at `now` if the window has room.
    ///
    /// Timestamps older than `now - window` are pruned first; the call is admitted iff fewer
    /// than `max_calls` remain. Only admitted calls are recorded. A `now` earlier than the most
    /// recent recorded admission is clamped to it so the window stays ordered. On denial the
    /// returned delay is computed under the same lock and from the same instant as the decision.
    pub fn try_acquire_at(&self, identifier: &str, now: Instant) -> Result<(), Duration> {
        let window = self.window_for(identifier, now);
        let mut calls = window.lock();

        let now = calls.back().map_or(now, |&last| now.max(last));
        self.prune(&mut calls, now);

        if calls.len() >= self.max_calls {
            return Err(self.retry_delay(&calls, now));
        }

        calls.push_back(now);
        Ok(())
    }

    /// Returns how many more calls `identifier` could make at `now` (does not record anything).
    pub fn remaining_at(&self, identifier: &str, now: Instant) -> usize {
        let Some(window) = self.existing_window(identifier) else {
            return self.max_calls;
        };
        let mut calls = window.lock();
        self.prune(&mut calls, now);
        self.max_calls.saturating_sub(calls.len())
    }

    /// Returns how many more calls `identifier` could make right now.
    pub fn remaining(&self, identifier: &str) -> usize {
        self.remaining_at(identifier, Instant::now())
    }

    /// Time until `identifier` regains at least one admission, measured from `now`.
    ///
    /// Returns [`Duration::ZERO`] when a call would be admitted immediately.
    pub fn retry_after_at(&self, identifier: &str, now: Instant) -> Duration {
        let Some(window) = self.existing_window(identifier) else {
            return Duration::ZERO;
        };
        let mut calls = window.lock();
        self.prune(&mut calls, now);
        self.retry_delay(&calls, now)
    }

    /// Returns the number of identifiers with a window.
    pub fn tracked_identifiers(&self) -> usize {
        self.windows.lock().by_identifier.len()
    }

    fn window_for(&self, identifier: &str, now: Instant) -> Window {
        let mut windows = self.windows.lock();

        let sweep_due = windows
            .last_sweep
            .is_none_or(|last| now.saturating_duration_since(last) >= self.window);
        if sweep_due {
            self.sweep(&mut windows, now);
        }

        match windows.by_identifier.get(identifier) {
            Some(window) => Arc::clone(window),
            None => {
                let window = Window::default();
                windows
                    .by_identifier
                    .insert(identifier.to_string(), Arc::clone(&window));
                window
            }
        }
    }

    /// Drops windows that are empty at `now` and not held by an in-flight check.
    fn sweep(&self, windows: &mut Windows, now: Instant) {
        let before = windows.by_identifier.len();
        windows.by_identifier.retain(|_, window| {
            if Arc::strong_count(window) > 1 {
                return true;
            }
            let mut calls = window.lock();
            self.prune(&mut calls, now);
            !calls.is_empty()
        });
        windows.last_sweep = Some(now);

        let removed = before - windows.by_identifier.len();
        if removed > 0 {
            debug!(
                removed,
                remaining = windows.by_identifier.len(),
                "Swept idle rate-limit windows"
            );
        }
    }

    fn existing_window(&self, identifier: &str) -> Option<Window> {
        self.windows.lock().by_identifier.get(identifier).cloned()
    }

    /// Zero while a slot is free, else the time until the oldest blocking entry ages out.
    fn retry_delay(&self, calls: &VecDeque<Instant>, now: Instant) -> Duration {
        if calls.len() < self.max_calls {
            return Duration::ZERO;
        }
        let excess = calls.len() - self.max_calls;
        calls.get(excess).map_or(Duration::ZERO, |&oldest| {
            (oldest + self.window).saturating_duration_since(now)
        })
    }

    fn prune(&self, calls: &mut VecDeque<Instant>, now: Instant) {
        while let Some(&oldest) = calls.front() {
            if now.saturating_duration_since(oldest) >= self.window {
                calls.pop_front();
            } else {
                break;
            }
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CALLS, DEFAULT_WINDOW)
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("max_calls", &self.max_calls)
            .field("window", &self.window)
            .field("tracked_identifiers", &self.tracked_identifiers())
            .finish()
    }
}
