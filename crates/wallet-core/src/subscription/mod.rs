//! ============================================================================
//! Subscription Module - Locally persisted subscription status
//! ============================================================================
//! Derives whether the stored subscription is live and gates premium
//! features on it.
//!
//! ## Rules
//! - No `subscription` key means no subscription (never an error)
//! - Past `endDate` the status is expired and inactive
//! - Trials expire by the same rule as paid subscriptions
//!
//! ## Usage
//! ```rust,ignore
//! use wallet_core::subscription::{SubscriptionEvaluator, SubscriptionGate};
//!
//! let status = SubscriptionEvaluator::new().evaluate(&store);
//! let status = SubscriptionGate::new().require_active(&store, "Strategies")?;
//! ```
//! ============================================================================

mod evaluator;
mod gate;
mod types;

pub use evaluator::{Clock, FixedClock, SubscriptionEvaluator, SystemClock};
pub use gate::{AccessDenied, SubscriptionGate};
pub use types::{parse_timestamp, SubscriptionBadge, SubscriptionRecord, SubscriptionStatus};
