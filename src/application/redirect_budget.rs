//! Per-link redirect quota.
//!
//! One fixed-window token bucket per hash. Buckets live in a sharded
//! [`DashMap`], each behind its own mutex, so admitting a redirect on one
//! link never contends with another.

use dashmap::DashMap;
use parking_lot::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// Default length of one quota window.
pub const DEFAULT_REFILL_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug)]
struct Bucket {
    /// `0` means unlimited.
    capacity: u32,
    tokens: u32,
    last_refill: Instant,
}

impl Bucket {
    fn full(capacity: u32, now: Instant) -> Self {
        Self {
            capacity,
            tokens: capacity,
            last_refill: now,
        }
    }

    fn is_unlimited(&self) -> bool {
        self.capacity == 0
    }

    /// Restores the bucket to capacity if at least one whole interval elapsed.
    ///
    /// `last_refill` moves forward by whole intervals only, so window
    /// boundaries stay aligned to the registration instant.
    fn refill(&mut self, now: Instant, interval: Duration) {
        let elapsed = now.saturating_duration_since(self.last_refill);
        if elapsed < interval {
            return;
        }

        let partial = elapsed.as_nanos() % interval.as_nanos();
        self.last_refill = now - Duration::from_nanos(partial as u64);
        self.tokens = self.capacity;
    }

    fn until_next_refill(&self, now: Instant, interval: Duration) -> Duration {
        interval.saturating_sub(now.saturating_duration_since(self.last_refill))
    }
}

/// Token buckets keyed by link hash.
///
/// Buckets are process-local and start full. After a restart they are
/// re-created lazily from the persisted limit (see
/// [`crate::application::services::RedirectGate`]).
#[derive(Debug)]
pub struct RedirectBudget {
    buckets: DashMap<String, Mutex<Bucket>>,
    refill_interval: Duration,
}

impl Default for RedirectBudget {
    fn default() -> Self {
        Self::new(DEFAULT_REFILL_INTERVAL)
    }
}

impl RedirectBudget {
    /// Creates an empty budget. Intervals shorter than a millisecond are
    /// rounded up.
    pub fn new(refill_interval: Duration) -> Self {
        Self {
            buckets: DashMap::new(),
            refill_interval: refill_interval.max(Duration::from_millis(1)),
        }
    }

    pub fn refill_interval(&self) -> Duration {
        self.refill_interval
    }

    /// Installs a full bucket for `hash`. An existing bucket is kept as is.
    pub fn register(&self, hash: &str, capacity: u32) {
        if self.buckets.contains_key(hash) {
            return;
        }
        self.buckets
            .entry(hash.to_string())
            .or_insert_with(|| Mutex::new(Bucket::full(capacity, Instant::now())));
    }

    pub fn contains(&self, hash: &str) -> bool {
        self.buckets.contains_key(hash)
    }

    /// Takes one token for `hash`.
    ///
    /// Unlimited buckets always admit. Unknown hashes are refused.
    pub fn admit(&self, hash: &str) -> bool {
        let Some(entry) = self.buckets.get(hash) else {
            tracing::debug!(hash, "admit on unregistered bucket");
            return false;
        };

        let mut bucket = entry.lock();
        if bucket.is_unlimited() {
            return true;
        }

        bucket.refill(Instant::now(), self.refill_interval);
        if bucket.tokens == 0 {
            return false;
        }
        bucket.tokens -= 1;
        true
    }

    /// Tokens used in the current window. `0` for unlimited or unknown hashes.
    pub fn consumed(&self, hash: &str) -> u32 {
        let Some(entry) = self.buckets.get(hash) else {
            return 0;
        };

        let mut bucket = entry.lock();
        if bucket.is_unlimited() {
            return 0;
        }
        bucket.refill(Instant::now(), self.refill_interval);
        bucket.capacity - bucket.tokens
    }

    /// Time until an exhausted bucket refills.
    ///
    /// `None` when the bucket still has tokens, is unlimited or is unknown.
    pub fn retry_after(&self, hash: &str) -> Option<Duration> {
        let entry = self.buckets.get(hash)?;
        let mut bucket = entry.lock();
        if bucket.is_unlimited() {
            return None;
        }

        let now = Instant::now();
        bucket.refill(now, self.refill_interval);
        (bucket.tokens == 0).then(|| bucket.until_next_refill(now, self.refill_interval))
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}
