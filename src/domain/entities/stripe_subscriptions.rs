use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::value_objects::stripe_subscriptions::SubscriptionRecord;
use crate::infrastructure::postgres::schema::stripe_subscriptions;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = stripe_subscriptions)]
pub struct StripeSubscriptionEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub stripe_customer_id: String,
    pub stripe_subscription_id: String,
    pub subscription_item_id: Option<String>,
    pub price_id: Option<String>,
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
    pub status: Option<String>,
    pub is_active: bool,
    pub metadata: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Full row written by the reconciler. Every column is overwritten on conflict,
/// including the ones that became `NULL`.
#[derive(Debug, Clone, PartialEq, Insertable, AsChangeset)]
#[diesel(table_name = stripe_subscriptions)]
#[diesel(treat_none_as_null = true)]
pub struct UpsertStripeSubscriptionEntity {
    pub user_id: Uuid,
    pub stripe_customer_id: String,
    pub stripe_subscription_id: String,
    pub subscription_item_id: Option<String>,
    pub price_id: Option<String>,
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
    pub status: Option<String>,
    pub is_active: bool,
    pub metadata: Value,
    pub updated_at: DateTime<Utc>,
}

/// Row created at checkout time, before any subscription exists.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = stripe_subscriptions)]
pub struct InsertCustomerPlaceholderEntity {
    pub user_id: Uuid,
    pub stripe_customer_id: String,
    pub stripe_subscription_id: String,
    pub is_active: bool,
    pub updated_at: DateTime<Utc>,
}

impl From<SubscriptionRecord> for UpsertStripeSubscriptionEntity {
    fn from(record: SubscriptionRecord) -> Self {
        let metadata = serde_json::to_value(&record.metadata).unwrap_or(Value::Object(Default::default()));

        Self {
            user_id: record.user_id,
            stripe_customer_id: record.stripe_customer_id,
            stripe_subscription_id: record.stripe_subscription_id,
            subscription_item_id: record.subscription_item_id,
            price_id: record.price_id,
            price_amount: record.price_amount,
            currency: record.currency,
            interval: record.interval,
            interval_count: record.interval_count,
            subscription_period_start: record.subscription_period_start,
            subscription_period_end: record.subscription_period_end,
            billing_cycle_anchor: record.billing_cycle_anchor,
            cancel_at: record.cancel_at,
            canceled_at: record.canceled_at,
            payment_method: record.payment_method,
            status: Some(record.status),
            is_active: record.is_active,
            metadata,
            updated_at: record.updated_at,
        }
    }
}
