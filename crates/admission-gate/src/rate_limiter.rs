use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};
use tracing::debug;

/// Requester count above which a check first drops idle windows.
pub const SWEEP_THRESHOLD: usize = 10_000;

/// Sliding-window rate limiter keyed by requester id.
///
/// Admits at most `limit` requests per requester in any trailing `window`.
/// A timestamp exactly `window` old has expired. Pruning and the
/// check-and-record step happen under one lock, so two racing requests can
/// never both take the last free slot.
#[derive(Debug)]
pub struct RateLimiter {
    limit: usize,
    window: Duration,
    windows: Mutex<Windows>,
}

#[derive(Debug)]
struct Windows {
    by_requester: HashMap<i64, VecDeque<Instant>>,
    /// Map size that triggers the next idle sweep.
    next_sweep_at: usize,
}

impl Windows {
    fn new() -> Self {
        Self {
            by_requester: HashMap::new(),
            next_sweep_at: SWEEP_THRESHOLD,
        }
    }

    /// Drop idle windows, then wait for the map to double before sweeping again.
    fn sweep(&mut self, cutoff: Option<Instant>) {
        let before = self.by_requester.len();
        self.by_requester.retain(|_, stamps| {
            prune(stamps, cutoff);
            !stamps.is_empty()
        });
        let remaining = self.by_requester.len();
        self.next_sweep_at = SWEEP_THRESHOLD.max(remaining.saturating_mul(2));
        debug!(
            dropped = before - remaining,
            remaining,
            next_sweep_at = self.next_sweep_at,
            "Swept idle rate-limit windows"
        );
    }
}

impl RateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit: limit as usize,
            window,
            windows: Mutex::new(Windows::new()),
        }
    }

    /// `limit` requests per minute.
    pub fn per_minute(limit: u32) -> Self {
        Self::new(limit, Duration::from_secs(60))
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Record a request from `requester` at `now`. Returns false when over the limit.
    pub fn check_at(&self, requester: i64, now: Instant) -> bool {
        let cutoff = now.checked_sub(self.window);
        let mut windows = self.windows.lock();

        if windows.by_requester.len() > windows.next_sweep_at {
            windows.sweep(cutoff);
        }

        let stamps = windows.by_requester.entry(requester).or_default();
        prune(stamps, cutoff);

        if stamps.len() >= self.limit {
            return false;
        }
        stamps.push_back(now);
        true
    }

    /// Number of requesters currently tracked.
    pub fn tracked(&self) -> usize {
        self.windows.lock().by_requester.len()
    }
}

fn prune(stamps: &mut VecDeque<Instant>, cutoff: Option<Instant>) {
    let Some(cutoff) = cutoff else {
        return;
    };
    while stamps.front().is_some_and(|t| *t <= cutoff) {
        stamps.pop_front();
    }
}
