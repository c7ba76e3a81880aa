//! ============================================================================
//! Subscription Evaluator - Derive activity/expiry from the stored record
//! ============================================================================
//! A pure read: the stored record is never rewritten, even once it is found
//! to have expired. Expiry is recomputed on every call.
//! ============================================================================

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::types::{SubscriptionRecord, SubscriptionStatus};
use crate::store::{KeyValueStore, KEY_SUBSCRIPTION};

/// Source of the current instant
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Reads the `subscription` key and derives its current status
#[derive(Debug, Clone, Default)]
pub struct SubscriptionEvaluator<C: Clock = SystemClock> {
    clock: C,
}

impl SubscriptionEvaluator<SystemClock> {
    pub fn new() -> Self {
        Self { clock: SystemClock }
    }
}

impl<C: Clock> SubscriptionEvaluator<C> {
    pub fn with_clock(clock: C) -> Self {
        Self { clock }
    }

    /// Current status of the stored subscription, or `None` when there is
    /// none. Unreadable or malformed records count as no subscription.
    pub fn evaluate(&self, store: &dyn KeyValueStore) -> Option<SubscriptionStatus> {
        let raw = match store.get(KEY_SUBSCRIPTION) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("No subscription stored");
                return None;
            }
            Err(e) => {
                warn!("Failed to read subscription: {}", e);
                return None;
            }
        };

        let record: SubscriptionRecord = match serde_json::from_str(&raw) {
            Ok(record) => record,
            Err(e) => {
                warn!("Ignoring malformed subscription record: {}", e);
                return None;
            }
        };

        let status = SubscriptionStatus::at(record, self.clock.now());
        debug!(
            "Subscription ends {}: active={} expired={} trial={}",
            status.record.end_date, status.record.active, status.expired, status.record.is_trial
        );
        Some(status)
    }

    /// True only when a subscription exists, is flagged active and has not expired
    pub fn is_active(&self, store: &dyn KeyValueStore) -> bool {
        self.evaluate(store).is_some_and(|status| status.is_active())
    }
}
