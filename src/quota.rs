use dashmap::DashMap;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

// Per-route quota settings, fixed at deploy time
#[derive(Clone, Copy, Debug)]
pub struct QuotaConfig {
    pub max_uses: u32,
    pub window: Duration,
}

impl QuotaConfig {
    pub fn new(max_uses: u32, window: Duration) -> Self {
        assert!(max_uses > 0, "max_uses must be positive");
        assert!(!window.is_zero(), "window must be non-zero");
        Self { max_uses, window }
    }
}

/// Outcome of a quota check. `Allowed` carries how many uses are left in the
/// current window after this one; `Denied` carries how long until the window
/// opens again.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    Allowed { remaining: u32 },
    Denied { retry_after: Duration },
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed { .. })
    }
}

/// A quota strategy: decide whether one unit of a metered action may proceed
/// for `key` right now and, if so, record the consumption in the same step.
///
/// Implementations never suspend and never fail; denial is a normal return
/// value. All state is in-process and volatile — a restart resets every
/// counter, which is accepted behavior here.
pub trait QuotaPolicy: Send + Sync {
    fn check_and_consume(&self, key: &str) -> Decision;

    /// Drop records whose window has already elapsed. Purely a memory
    /// optimization; must not change any quota decision.
    fn evict_expired(&self);

    /// Number of client keys currently tracked (for the metrics gauge).
    fn tracked_clients(&self) -> usize;
}

// Usage within the current window for one client key
struct UsageRecord {
    count: u32,
    window_start: Instant,
}

/// Fixed-window guard: a single counter per key plus the window start time,
/// reset lazily on the next check after the window elapses. This is the
/// reference semantics — exactly `max_uses` calls succeed per window, the
/// next one is denied, and denial never mutates the record.
pub struct FixedWindowGuard {
    config: QuotaConfig,
    table: DashMap<String, UsageRecord>,
}

impl FixedWindowGuard {
    pub fn new(config: QuotaConfig) -> Self {
        Self {
            config,
            table: DashMap::new(),
        }
    }

    // The DashMap entry holds its shard lock for the whole read-modify-write,
    // so two concurrent checks for the same key cannot both see count < max
    // and both increment. Work under the lock is O(1) with no await points.
    fn check_and_consume_at(&self, key: &str, now: Instant) -> Decision {
        let mut entry = self
            .table
            .entry(key.to_string())
            .or_insert_with(|| UsageRecord {
                count: 0,
                window_start: now,
            });

        let mut elapsed = now.saturating_duration_since(entry.window_start);

        // Lazy reset. `>=` so a call exactly one window after window_start
        // already lands in a fresh window.
        if elapsed >= self.config.window {
            entry.count = 0;
            entry.window_start = now;
            elapsed = Duration::ZERO;
        }

        if entry.count >= self.config.max_uses {
            return Decision::Denied {
                retry_after: self.config.window - elapsed,
            };
        }

        entry.count += 1;
        Decision::Allowed {
            remaining: self.config.max_uses - entry.count,
        }
    }
}

impl QuotaPolicy for FixedWindowGuard {
    fn check_and_consume(&self, key: &str) -> Decision {
        self.check_and_consume_at(key, Instant::now())
    }

    fn evict_expired(&self) {
        let now = Instant::now();
        self.table
            .retain(|_, rec| now.saturating_duration_since(rec.window_start) < self.config.window);
    }

    fn tracked_clients(&self) -> usize {
        self.table.len()
    }
}

/// Sliding-log guard: a per-key log of request timestamps, pruned on each
/// check. Smoother under bursty traffic than the fixed window (a burst at the
/// end of one window cannot be followed by a full burst at the start of the
/// next), at the cost of one Instant per allowed request. A distinct strategy
/// with different boundary behavior, not a drop-in for the fixed window.
pub struct SlidingLogGuard {
    config: QuotaConfig,
    table: DashMap<String, VecDeque<Instant>>,
}

impl SlidingLogGuard {
    pub fn new(config: QuotaConfig) -> Self {
        Self {
            config,
            table: DashMap::new(),
        }
    }

    fn check_and_consume_at(&self, key: &str, now: Instant) -> Decision {
        let mut log = self.table.entry(key.to_string()).or_default();

        // Drop timestamps that have aged out of the window
        while let Some(oldest) = log.front() {
            if now.saturating_duration_since(*oldest) >= self.config.window {
                log.pop_front();
            } else {
                break;
            }
        }

        if log.len() as u32 >= self.config.max_uses {
            // Oldest entry survived the prune, so its age is < window
            let oldest = *log.front().expect("log is non-empty when at capacity");
            return Decision::Denied {
                retry_after: self.config.window - now.saturating_duration_since(oldest),
            };
        }

        log.push_back(now);
        Decision::Allowed {
            remaining: self.config.max_uses - log.len() as u32,
        }
    }
}

impl QuotaPolicy for SlidingLogGuard {
    fn check_and_consume(&self, key: &str) -> Decision {
        self.check_and_consume_at(key, Instant::now())
    }

    fn evict_expired(&self) {
        let now = Instant::now();
        self.table.retain(|_, log| {
            while let Some(oldest) = log.front() {
                if now.saturating_duration_since(*oldest) >= self.config.window {
                    log.pop_front();
                } else {
                    break;
                }
            }
            !log.is_empty()
        });
    }

    fn tracked_clients(&self) -> usize {
        self.table.len()
    }
}
