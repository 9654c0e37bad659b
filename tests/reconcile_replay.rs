mod common;

use std::sync::Arc;

use common::{
    CUSTOMER_ID, FakeBillingProvider, InMemoryBillingStore, SUBSCRIPTION_ID, customer_json, event,
    subscription_json, webhook_usecase,
};
use serde_json::json;
use socialspark::{
    application::{errors::BillingError, usercases::stripe_webhook::ReconcileOutcome},
    domain::{
        entities::stripe_subscriptions::StripeSubscriptionEntity,
        repositories::stripe_subscriptions::StripeSubscriptionRepository,
    },
};
use uuid::Uuid;

const EMAIL: &str = "grace@example.com";

async fn stored_row(store: &InMemoryBillingStore, user_id: Uuid) -> StripeSubscriptionEntity {
    store.find_by_user_id(user_id).await.unwrap().unwrap()
}

/// Row contents that the reconciler controls; `updated_at` moves on every write.
fn reconciled_state(
    row: &StripeSubscriptionEntity,
) -> (String, String, Option<String>, Option<f64>, Option<String>, bool, serde_json::Value) {
    (
        row.stripe_customer_id.clone(),
        row.stripe_subscription_id.clone(),
        row.price_id.clone(),
        row.price_amount,
        row.status.clone(),
        row.is_active,
        row.metadata.clone(),
    )
}

#[tokio::test]
async fn replaying_an_event_leaves_the_same_state() {
    let user_id = Uuid::new_v4();
    let store = Arc::new(InMemoryBillingStore::with_profile(user_id, EMAIL));
    let provider = Arc::new(FakeBillingProvider::with_customer(customer_json(
        EMAIL,
        Some(user_id),
    )));
    let usecase = webhook_usecase(Arc::clone(&store), provider);
    let updated = event(
        "evt_updated",
        "customer.subscription.updated",
        subscription_json("active"),
    );

    let first = usecase.reconcile(&updated).await;
    let after_first = stored_row(&store, user_id).await;
    let second = usecase.reconcile(&updated).await;
    let after_second = stored_row(&store, user_id).await;

    assert!(matches!(first, ReconcileOutcome::Applied));
    assert!(matches!(second, ReconcileOutcome::Applied));
    assert_eq!(store.subscription_count(), 1);
    assert_eq!(after_first.id, after_second.id);
    assert_eq!(reconciled_state(&after_first), reconciled_state(&after_second));
    assert_eq!(after_second.price_amount, Some(9.99));
    assert_eq!(after_second.payment_method.as_deref(), Some("card"));
    assert!(store.profile(user_id).unwrap().is_premium);
}

#[tokio::test]
async fn deletion_and_its_duplicate_delivery_end_inactive() {
    let user_id = Uuid::new_v4();
    let store = Arc::new(InMemoryBillingStore::with_profile(user_id, EMAIL));
    let provider = Arc::new(FakeBillingProvider::with_customer(customer_json(
        EMAIL,
        Some(user_id),
    )));
    let usecase = webhook_usecase(Arc::clone(&store), provider);

    let created = event(
        "evt_created",
        "customer.subscription.created",
        subscription_json("active"),
    );
    let deleted = event(
        "evt_deleted",
        "customer.subscription.deleted",
        subscription_json("canceled"),
    );

    assert!(matches!(
        usecase.reconcile(&created).await,
        ReconcileOutcome::Applied
    ));
    assert!(store.profile(user_id).unwrap().is_premium);

    assert!(matches!(
        usecase.reconcile(&deleted).await,
        ReconcileOutcome::Applied
    ));
    let after_delete = stored_row(&store, user_id).await;

    assert!(matches!(
        usecase.reconcile(&deleted).await,
        ReconcileOutcome::Applied
    ));
    let after_duplicate = stored_row(&store, user_id).await;

    assert_eq!(store.subscription_count(), 1);
    assert_eq!(after_duplicate.status.as_deref(), Some("canceled"));
    assert!(!after_duplicate.is_active);
    assert!(after_duplicate.canceled_at.is_some());
    assert_eq!(reconciled_state(&after_delete), reconciled_state(&after_duplicate));
    assert!(!store.profile(user_id).unwrap().is_premium);
}

#[tokio::test]
async fn checkout_completion_resolves_profile_by_email() {
    let user_id = Uuid::new_v4();
    let store = Arc::new(InMemoryBillingStore::with_profile(user_id, EMAIL));
    let provider = Arc::new(FakeBillingProvider::with_customer(customer_json(EMAIL, None)));
    provider.put_subscription(subscription_json("trialing"));
    let usecase = webhook_usecase(Arc::clone(&store), provider);

    let completed = event(
        "evt_checkout",
        "checkout.session.completed",
        json!({
            "id": "cs_test_1",
            "object": "checkout.session",
            "mode": "subscription",
            "customer": CUSTOMER_ID,
            "subscription": SUBSCRIPTION_ID
        }),
    );

    let outcome = usecase.reconcile(&completed).await;

    assert!(matches!(outcome, ReconcileOutcome::Applied));
    let row = stored_row(&store, user_id).await;
    assert_eq!(row.stripe_subscription_id, SUBSCRIPTION_ID);
    assert_eq!(row.status.as_deref(), Some("trialing"));
    assert!(row.is_active);
    assert!(store.profile(user_id).unwrap().is_premium);
}

#[tokio::test]
async fn unmatched_customer_writes_nothing() {
    let user_id = Uuid::new_v4();
    let store = Arc::new(InMemoryBillingStore::with_profile(user_id, EMAIL));
    let provider = Arc::new(FakeBillingProvider::with_customer(customer_json(
        "stranger@example.com",
        None,
    )));
    provider.put_subscription(subscription_json("active"));
    let usecase = webhook_usecase(Arc::clone(&store), provider);

    let completed = event(
        "evt_checkout_unmatched",
        "checkout.session.completed",
        json!({
            "id": "cs_test_2",
            "customer": CUSTOMER_ID,
            "subscription": SUBSCRIPTION_ID
        }),
    );

    let outcome = usecase.reconcile(&completed).await;

    assert!(matches!(
        outcome,
        ReconcileOutcome::Failed(BillingError::ProfileNotFound(_))
    ));
    assert_eq!(store.subscription_count(), 0);
    assert!(!store.profile(user_id).unwrap().is_premium);
}

#[tokio::test]
async fn later_status_overwrites_earlier_row() {
    let user_id = Uuid::new_v4();
    let store = Arc::new(InMemoryBillingStore::with_profile(user_id, EMAIL));
    let provider = Arc::new(FakeBillingProvider::with_customer(customer_json(
        EMAIL,
        Some(user_id),
    )));
    let usecase = webhook_usecase(Arc::clone(&store), provider);

    usecase
        .reconcile(&event(
            "evt_1",
            "customer.subscription.created",
            subscription_json("active"),
        ))
        .await;
    usecase
        .reconcile(&event(
            "evt_2",
            "customer.subscription.updated",
            subscription_json("past_due"),
        ))
        .await;

    let row = stored_row(&store, user_id).await;
    assert_eq!(row.status.as_deref(), Some("past_due"));
    assert!(!row.is_active);
    assert!(!store.profile(user_id).unwrap().is_premium);
}
