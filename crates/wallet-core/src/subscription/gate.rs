//! ============================================================================
//! Subscription Gate - Premium feature gating
//! ============================================================================
//! Every check re-evaluates the stored record; there is no status cache.
//! ============================================================================

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::evaluator::{Clock, SubscriptionEvaluator, SystemClock};
use super::types::SubscriptionStatus;
use crate::store::KeyValueStore;

/// Why a premium feature was refused
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessDenied {
    #[error("{feature} requires a subscription")]
    NoSubscription { feature: String },

    #[error("{feature} requires an active subscription; yours ended {end_date}")]
    Expired { feature: String, end_date: DateTime<Utc> },

    #[error("{feature} requires an active subscription")]
    Inactive { feature: String },
}

/// Gates premium features on the persisted subscription
#[derive(Debug, Clone, Default)]
pub struct SubscriptionGate<C: Clock = SystemClock> {
    evaluator: SubscriptionEvaluator<C>,
}

impl SubscriptionGate<SystemClock> {
    pub fn new() -> Self {
        Self {
            evaluator: SubscriptionEvaluator::new(),
        }
    }
}

impl<C: Clock> SubscriptionGate<C> {
    pub fn with_evaluator(evaluator: SubscriptionEvaluator<C>) -> Self {
        Self { evaluator }
    }

    /// Ok(status) if `feature` may be used, otherwise the denial reason
    pub fn require_active(
        &self,
        store: &dyn KeyValueStore,
        feature: &str,
    ) -> Result<SubscriptionStatus, AccessDenied> {
        let feature = feature.to_string();

        let Some(status) = self.evaluator.evaluate(store) else {
            warn!("Access denied for {}: no subscription", feature);
            return Err(AccessDenied::NoSubscription { feature });
        };

        if status.expired {
            warn!(
                "Access denied for {}: subscription expired {}",
                feature, status.record.end_date
            );
            return Err(AccessDenied::Expired {
                feature,
                end_date: status.record.end_date,
            });
        }

        if !status.record.active {
            warn!("Access denied for {}: subscription inactive", feature);
            return Err(AccessDenied::Inactive { feature });
        }

        debug!("Access granted for {}", feature);
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, KEY_SUBSCRIPTION};
    use crate::subscription::FixedClock;
    use chrono::TimeZone;

    fn gate_at(y: i32, m: u32, d: u32) -> SubscriptionGate<FixedClock> {
        let now = Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap();
        SubscriptionGate::with_evaluator(SubscriptionEvaluator::with_clock(FixedClock(now)))
    }

    fn store(active: bool) -> MemoryStore {
        let store = MemoryStore::new();
        store
            .set(
                KEY_SUBSCRIPTION,
                &format!(
                    r#"{{"startDate":"2024-01-01","endDate":"2024-02-01","isTrial":false,"active":{}}}"#,
                    active
                ),
            )
            .unwrap();
        store
    }

    #[test]
    fn test_granted_while_active() {
        let status = gate_at(2024, 1, 10).require_active(&store(true), "Strategies").unwrap();
        assert!(status.is_active());
    }

    #[test]
    fn test_denied_without_subscription() {
        let err = gate_at(2024, 1, 10)
            .require_active(&MemoryStore::new(), "Strategies")
            .unwrap_err();
        assert_eq!(
            err,
            AccessDenied::NoSubscription {
                feature: "Strategies".into()
            }
        );
        assert_eq!(err.to_string(), "Strategies requires a subscription");
    }

    #[test]
    fn test_denied_after_expiry() {
        let err = gate_at(2024, 3, 1).require_active(&store(true), "Strategies").unwrap_err();
        assert!(matches!(err, AccessDenied::Expired { .. }));
    }

    #[test]
    fn test_denied_when_inactive() {
        let err = gate_at(2024, 1, 10).require_active(&store(false), "Strategies").unwrap_err();
        assert!(matches!(err, AccessDenied::Inactive { .. }));
    }
}
