use std::collections::BTreeMap;

use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use crate::{
    domain::value_objects::{
        enums::subscription_statuses::SubscriptionStatus, stripe_subscriptions::SubscriptionRecord,
    },
    payments::stripe_objects::{StripeCustomer, StripeSubscription},
};

/// Maps a Stripe subscription onto the canonical record. Pure: `updated_at` is the
/// only input that is not derived from the Stripe objects.
pub fn format_subscription_data(
    subscription: &StripeSubscription,
    customer: &StripeCustomer,
    user_id: Uuid,
    updated_at: DateTime<Utc>,
) -> SubscriptionRecord {
    let item = subscription.first_item();
    let price = item.and_then(|item| item.price.as_ref());
    let recurring = price.and_then(|price| price.recurring.as_ref());

    SubscriptionRecord {
        user_id,
        stripe_customer_id: customer.id.clone(),
        stripe_subscription_id: subscription.id.clone(),
        subscription_item_id: item.map(|item| item.id.clone()),
        price_id: price.map(|price| price.id.clone()),
        price_amount: price.and_then(|price| price.unit_amount).map(minor_to_major),
        currency: price
            .and_then(|price| price.currency.clone())
            .or_else(|| subscription.currency.clone()),
        interval: recurring.map(|recurring| recurring.interval.clone()),
        interval_count: recurring
            .and_then(|recurring| recurring.interval_count)
            .and_then(|count| i32::try_from(count).ok()),
        subscription_period_start: subscription.period_start().and_then(epoch_to_utc),
        subscription_period_end: subscription.period_end().and_then(epoch_to_utc),
        billing_cycle_anchor: subscription.billing_cycle_anchor.and_then(epoch_to_utc),
        cancel_at: subscription.cancel_at.and_then(epoch_to_utc),
        canceled_at: subscription.canceled_at.and_then(epoch_to_utc),
        payment_method: subscription.payment_method_kind(),
        status: subscription.status.clone(),
        is_active: SubscriptionStatus::from_str(&subscription.status).is_active(),
        metadata: subscription
            .metadata
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect::<BTreeMap<_, _>>(),
        updated_at,
    }
}

pub fn epoch_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(ts, 0).single()
}

pub fn minor_to_major(amount: i64) -> f64 {
    amount as f64 / 100.0
}
