//! ============================================================================
//! Subscription Types - Persisted record and derived status
//! ============================================================================
//! The record is written by the billing flow as camelCase JSON under the
//! `subscription` key. The status is derived from it on every read.
//! ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Subscription record as persisted by the billing flow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionRecord {
    /// Informational only; expiry is decided by `end_date`
    #[serde(default, with = "optional_timestamp", skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(with = "timestamp")]
    pub end_date: DateTime<Utc>,
    #[serde(default)]
    pub is_trial: bool,
    #[serde(default)]
    pub active: bool,
    /// Any other fields the billing flow stored (plan, price, ...)
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl SubscriptionRecord {
    pub fn new(start_date: DateTime<Utc>, end_date: DateTime<Utc>, is_trial: bool, active: bool) -> Self {
        Self {
            start_date: Some(start_date),
            end_date,
            is_trial,
            active,
            extra: serde_json::Map::new(),
        }
    }
}

/// Record as seen at a given instant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionStatus {
    #[serde(flatten)]
    pub record: SubscriptionRecord,
    pub expired: bool,
}

impl SubscriptionStatus {
    /// Derive the status of `record` at `now`. Past `endDate` the status is
    /// expired and inactive whatever the stored `active` flag says.
    pub fn at(mut record: SubscriptionRecord, now: DateTime<Utc>) -> Self {
        // A stored `expired` field would shadow the derived one
        record.extra.remove("expired");

        let expired = now > record.end_date;
        if expired {
            record.active = false;
        }
        Self { record, expired }
    }

    pub fn is_active(&self) -> bool {
        self.record.active && !self.expired
    }

    pub fn is_trial(&self) -> bool {
        self.record.is_trial
    }

    /// Badge shown next to the user's name while the subscription is live
    pub fn badge(&self) -> Option<SubscriptionBadge> {
        if !self.is_active() {
            return None;
        }
        Some(if self.record.is_trial {
            SubscriptionBadge::FreeTrial
        } else {
            SubscriptionBadge::Premium
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionBadge {
    FreeTrial,
    Premium,
}

impl SubscriptionBadge {
    pub fn label(&self) -> &'static str {
        match self {
            SubscriptionBadge::FreeTrial => "Free Trial",
            SubscriptionBadge::Premium => "Premium",
        }
    }
}

/// Parse the timestamp forms the billing flow is known to write:
/// RFC 3339 date-times, bare `YYYY-MM-DD` dates and naive date-times
/// (both read as UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(date) = chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt.and_utc());
        }
    }
    None
}

/// Serde adapter: accepts strings understood by [`parse_timestamp`] or epoch
/// milliseconds, writes RFC 3339.
mod timestamp {
    use chrono::{DateTime, TimeZone, Utc};
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    pub(super) enum Raw {
        Text(String),
        Millis(i64),
    }

    pub(super) fn resolve<E: Error>(raw: Raw) -> Result<DateTime<Utc>, E> {
        match raw {
            Raw::Text(text) => super::parse_timestamp(&text)
                .ok_or_else(|| E::custom(format!("invalid timestamp: {}", text))),
            Raw::Millis(ms) => Utc
                .timestamp_millis_opt(ms)
                .single()
                .ok_or_else(|| E::custom(format!("timestamp out of range: {}", ms))),
        }
    }

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        resolve(Raw::deserialize(deserializer)?)
    }
}

/// Same as `timestamp`, but a missing or `null` value reads as `None`
mod optional_timestamp {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    use super::timestamp::{resolve, Raw};

    pub fn serialize<S: Serializer>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(value) => super::timestamp::serialize(value, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error> {
        Option::<Raw>::deserialize(deserializer)?.map(resolve).transpose()
    }
}
