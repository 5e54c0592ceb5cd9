use chrono::{DateTime, Duration, NaiveTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Per-user usage record for the current daily window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserQuota {
    /// Conversions consumed in the current window. Never exceeds the
    /// store's configured limit.
    pub count: u32,
    /// Start of the next window; once `now` reaches this instant the
    /// record is rolled over on the next check.
    pub reset_at: DateTime<Utc>,
}

/// Returns the first UTC midnight strictly after `now`'s own midnight,
/// i.e. `now` truncated to midnight plus one day. When `now` is exactly
/// midnight the boundary is still a full day ahead.
pub fn next_window_boundary(now: DateTime<Utc>) -> DateTime<Utc> {
    let midnight = now.date_naive().and_time(NaiveTime::MIN).and_utc();
    midnight + Duration::days(1)
}

/// In-memory store of per-user daily conversion counters.
///
/// Records are created lazily on first check and live for the process
/// lifetime; the daily reset is computed opportunistically on each check
/// rather than by a background timer. Each operation takes the user's
/// entry under the map's per-shard lock, so the read-rollover-increment
/// sequence for one user is never interleaved with another operation on
/// the same user, while unrelated users proceed in parallel.
pub struct QuotaStore {
    entries: DashMap<i64, UserQuota>,
    limit: u32,
}

impl QuotaStore {
    pub fn new(limit: u32) -> Self {
        Self {
            entries: DashMap::new(),
            limit,
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Returns the user's record, creating it if absent and rolling the
    /// window over first if `now` has reached `reset_at`. Rollover is
    /// idempotent: repeated calls at the same instant reset at most once.
    pub fn get_or_init(&self, user_id: i64, now: DateTime<Utc>) -> UserQuota {
        let mut entry = self.entries.entry(user_id).or_insert_with(|| UserQuota {
            count: 0,
            reset_at: next_window_boundary(now),
        });

        if now >= entry.reset_at {
            debug!(user_id, "daily window elapsed, resetting counter");
            entry.count = 0;
            entry.reset_at = next_window_boundary(now);
        }

        entry.clone()
    }

    /// True iff the user still has conversions left in the current window.
    /// Performs the lazy rollover as a side effect: checking and repairing
    /// a stale window is a single atomic step.
    pub fn has_remaining(&self, user_id: i64, now: DateTime<Utc>) -> bool {
        self.get_or_init(user_id, now).count < self.limit
    }

    /// Records one consumed conversion. Callers invoke this only after the
    /// guarded action completed successfully, so a missing record indicates
    /// a caller-ordering bug; it is logged and ignored rather than failing
    /// the request. The increment never pushes `count` past the limit even
    /// when two requests for the same user both passed the check.
    pub fn consume(&self, user_id: i64) {
        match self.entries.get_mut(&user_id) {
            Some(mut entry) => {
                if entry.count >= self.limit {
                    warn!(
                        user_id,
                        limit = self.limit,
                        "consume would exceed the daily limit, racing checks suspected"
                    );
                    return;
                }
                entry.count += 1;
            }
            None => {
                warn!(user_id, "consume called before any quota check for this user");
            }
        }
    }
}
