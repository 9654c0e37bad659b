use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Canonical snapshot of one profile's Stripe subscription.
///
/// `is_active` is always derived from `status`; use
/// [`SubscriptionStatus::is_active`](super::enums::subscription_statuses::SubscriptionStatus::is_active)
/// when building one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubscriptionRecord {
    pub user_id: Uuid,
    pub stripe_customer_id: String,
    pub stripe_subscription_id: String,
    pub subscription_item_id: Option<String>,
    pub price_id: Option<String>,
    /// Major currency units (`399` minor units → `3.99`).
    pub price_amount: Option<f64>,
    pub currency: Option<String>,
    pub interval: Option<String>,
    pub interval_count: Option<i32>,
    pub subscription_period_start: Option<DateTime<Utc>>,
    pub subscription_period_end: Option<DateTime<Utc>>,
    pub billing_cycle_anchor: Option<DateTime<Utc>>,
    pub cancel_at: Option<DateTime<Utc>>,
    pub canceled_at: Option<DateTime<Utc>>,
    pub payment_method: Option<String>,
    pub status: String,
    pub is_active: bool,
    pub metadata: BTreeMap<String, String>,
    pub updated_at: DateTime<Utc>,
}

impl SubscriptionRecord {
    /// Equality ignoring the wall-clock `updated_at` stamp.
    pub fn same_state_as(&self, other: &SubscriptionRecord) -> bool {
        let mut other = other.clone();
        other.updated_at = self.updated_at;
        *self == other
    }
}
