use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::gate::subscription::SubscriptionChecker;
use crate::quota::QuotaStore;

/// Why a request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DenyReason {
    NotSubscribed,
    QuotaExhausted,
}

/// Outcome of authorizing one request. `Allowed` grants the conversion but
/// does not spend quota; callers consume only after successful delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Decision {
    Allowed,
    Denied(DenyReason),
}

/// Combines the external subscription check with the quota store into a
/// single allow/deny decision per request.
pub struct AccessGate<S> {
    subscription: S,
    quota: Arc<QuotaStore>,
    clock: Arc<dyn Clock>,
    check_timeout: Duration,
}

impl<S: SubscriptionChecker> AccessGate<S> {
    pub fn new(
        subscription: S,
        quota: Arc<QuotaStore>,
        clock: Arc<dyn Clock>,
        check_timeout: Duration,
    ) -> Self {
        Self {
            subscription,
            quota,
            clock,
            check_timeout,
        }
    }

    /// Single pass, no retries: subscription first, then quota. The
    /// subscription lookup is bounded by the configured timeout; an error
    /// or timeout denies the request (fail-closed) — a lookup failure must
    /// never silently grant access.
    pub async fn authorize(&self, user_id: i64) -> Decision {
        if !self.is_subscribed(user_id).await {
            return Decision::Denied(DenyReason::NotSubscribed);
        }

        let now = self.clock.now();
        if !self.quota.has_remaining(user_id, now) {
            debug!(user_id, limit = self.quota.limit(), "daily quota exhausted");
            return Decision::Denied(DenyReason::QuotaExhausted);
        }

        Decision::Allowed
    }

    async fn is_subscribed(&self, user_id: i64) -> bool {
        match timeout(self.check_timeout, self.subscription.is_member(user_id)).await {
            Ok(Ok(subscribed)) => subscribed,
            Ok(Err(err)) => {
                warn!(user_id, error = %err, "subscription check failed, denying");
                false
            }
            Err(_) => {
                warn!(
                    user_id,
                    timeout_ms = self.check_timeout.as_millis() as u64,
                    "subscription check timed out, denying"
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use chrono::Utc;

    use crate::clock::ManualClock;
    use crate::gate::subscription::SubscriptionError;

    use super::*;

    struct StaticChecker(Option<bool>);

    impl SubscriptionChecker for StaticChecker {
        async fn is_member(&self, _user_id: i64) -> Result<bool, SubscriptionError> {
            self.0.ok_or(SubscriptionError::UnexpectedPayload)
        }
    }

    struct StalledChecker;

    impl SubscriptionChecker for StalledChecker {
        async fn is_member(&self, _user_id: i64) -> Result<bool, SubscriptionError> {
            std::future::pending().await
        }
    }

    fn gate<S: SubscriptionChecker>(checker: S, limit: u32) -> AccessGate<S> {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 5, 14, 9, 0, 0).unwrap());
        AccessGate::new(
            checker,
            Arc::new(QuotaStore::new(limit)),
            Arc::new(clock),
            Duration::from_millis(100),
        )
    }

    #[tokio::test]
    async fn test_subscribed_user_with_quota_is_allowed() {
        let gate = gate(StaticChecker(Some(true)), 10);
        assert_eq!(gate.authorize(7).await, Decision::Allowed);
    }

    #[tokio::test]
    async fn test_unsubscribed_user_is_denied() {
        let gate = gate(StaticChecker(Some(false)), 10);
        assert_eq!(
            gate.authorize(7).await,
            Decision::Denied(DenyReason::NotSubscribed)
        );
    }

    #[tokio::test]
    async fn test_checker_error_fails_closed() {
        let gate = gate(StaticChecker(None), 10);
        assert_eq!(
            gate.authorize(7).await,
            Decision::Denied(DenyReason::NotSubscribed)
        );
    }

    #[tokio::test]
    async fn test_checker_timeout_fails_closed() {
        let gate = gate(StalledChecker, 10);
        assert_eq!(
            gate.authorize(7).await,
            Decision::Denied(DenyReason::NotSubscribed)
        );
    }

    #[tokio::test]
    async fn test_exhausted_quota_is_denied_even_for_subscribers() {
        let gate = gate(StaticChecker(Some(true)), 1);
        assert_eq!(gate.authorize(7).await, Decision::Allowed);
        gate.quota.consume(7);
        assert_eq!(
            gate.authorize(7).await,
            Decision::Denied(DenyReason::QuotaExhausted)
        );
    }
}
