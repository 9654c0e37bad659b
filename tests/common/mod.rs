#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde_json::{Value, json};
use sha2::Sha256;
use socialspark::{
    application::{
        interfaces::billing_provider::BillingProvider,
        usercases::stripe_webhook::StripeWebhookUseCase,
    },
    domain::{
        entities::{
            profiles::{InsertProfileEntity, ProfileEntity},
            stripe_subscriptions::{
                InsertCustomerPlaceholderEntity, StripeSubscriptionEntity,
                UpsertStripeSubscriptionEntity,
            },
        },
        repositories::{
            profiles::ProfileRepository, stripe_subscriptions::StripeSubscriptionRepository,
        },
    },
    payments::stripe_objects::{
        CheckoutSessionRequest, StripeCustomer, StripeEvent, StripeSubscription,
    },
};
use uuid::Uuid;

pub const WEBHOOK_SECRET: &str = "whsec_integration_secret";
pub const CUSTOMER_ID: &str = "cus_integration";
pub const SUBSCRIPTION_ID: &str = "sub_integration";

/// Both billing tables held in memory, with the same conflict rules as Postgres.
#[derive(Default)]
pub struct InMemoryBillingStore {
    profiles: Mutex<HashMap<Uuid, ProfileEntity>>,
    subscriptions: Mutex<HashMap<Uuid, StripeSubscriptionEntity>>,
}

impl InMemoryBillingStore {
    pub fn with_profile(user_id: Uuid, email: &str) -> Self {
        let store = Self::default();
        let now = Utc::now();
        store.profiles.lock().unwrap().insert(
            user_id,
            ProfileEntity {
                id: user_id,
                email: Some(email.to_string()),
                is_premium: false,
                created_at: now,
                updated_at: now,
            },
        );
        store
    }

    pub fn profile(&self, user_id: Uuid) -> Option<ProfileEntity> {
        self.profiles.lock().unwrap().get(&user_id).cloned()
    }

    pub fn subscription(&self, user_id: Uuid) -> Option<StripeSubscriptionEntity> {
        self.subscriptions.lock().unwrap().get(&user_id).cloned()
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.lock().unwrap().len()
    }
}

#[async_trait]
impl ProfileRepository for InMemoryBillingStore {
    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<ProfileEntity>> {
        Ok(self.profile(user_id))
    }

    async fn find_id_by_email(&self, email: String) -> Result<Option<Uuid>> {
        Ok(self
            .profiles
            .lock()
            .unwrap()
            .values()
            .find(|profile| profile.email.as_deref() == Some(email.as_str()))
            .map(|profile| profile.id))
    }

    async fn create_if_absent(&self, insert_profile_entity: InsertProfileEntity) -> Result<()> {
        let mut profiles = self.profiles.lock().unwrap();
        if profiles.contains_key(&insert_profile_entity.id) {
            return Ok(());
        }
        let email_taken = profiles
            .values()
            .any(|profile| profile.email.is_some() && profile.email == insert_profile_entity.email);
        if email_taken {
            return Err(anyhow!("unique violation: profiles_email_key"));
        }

        let now = Utc::now();
        profiles.insert(
            insert_profile_entity.id,
            ProfileEntity {
                id: insert_profile_entity.id,
                email: insert_profile_entity.email,
                is_premium: false,
                created_at: now,
                updated_at: now,
            },
        );
        Ok(())
    }

    async fn update_premium_status(&self, user_id: Uuid, is_premium: bool) -> Result<()> {
        if let Some(profile) = self.profiles.lock().unwrap().get_mut(&user_id) {
            profile.is_premium = is_premium;
            profile.updated_at = Utc::now();
        }
        Ok(())
    }
}

#[async_trait]
impl StripeSubscriptionRepository for InMemoryBillingStore {
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<StripeSubscriptionEntity>> {
        Ok(self.subscription(user_id))
    }

    async fn insert_customer_placeholder(
        &self,
        insert_customer_entity: InsertCustomerPlaceholderEntity,
    ) -> Result<()> {
        if !self
            .profiles
            .lock()
            .unwrap()
            .contains_key(&insert_customer_entity.user_id)
        {
            return Err(anyhow!("foreign key violation: profile missing"));
        }

        let mut subscriptions = self.subscriptions.lock().unwrap();
        if let Some(row) = subscriptions.get_mut(&insert_customer_entity.user_id) {
            row.stripe_customer_id = insert_customer_entity.stripe_customer_id;
            row.updated_at = insert_customer_entity.updated_at;
            return Ok(());
        }

        subscriptions.insert(
            insert_customer_entity.user_id,
            StripeSubscriptionEntity {
                id: Uuid::new_v4(),
                user_id: insert_customer_entity.user_id,
                stripe_customer_id: insert_customer_entity.stripe_customer_id,
                stripe_subscription_id: insert_customer_entity.stripe_subscription_id,
                subscription_item_id: None,
                price_id: None,
                price_amount: None,
                currency: None,
                interval: None,
                interval_count: None,
                subscription_period_start: None,
                subscription_period_end: None,
                billing_cycle_anchor: None,
                cancel_at: None,
                canceled_at: None,
                payment_method: None,
                status: None,
                is_active: insert_customer_entity.is_active,
                metadata: json!({}),
                created_at: insert_customer_entity.updated_at,
                updated_at: insert_customer_entity.updated_at,
            },
        );
        Ok(())
    }

    async fn upsert_subscription(
        &self,
        upsert_subscription_entity: UpsertStripeSubscriptionEntity,
    ) -> Result<()> {
        let entity = upsert_subscription_entity;
        let mut subscriptions = self.subscriptions.lock().unwrap();
        let (id, created_at) = subscriptions
            .get(&entity.user_id)
            .map(|row| (row.id, row.created_at))
            .unwrap_or_else(|| (Uuid::new_v4(), entity.updated_at));

        subscriptions.insert(
            entity.user_id,
            StripeSubscriptionEntity {
                id,
                user_id: entity.user_id,
                stripe_customer_id: entity.stripe_customer_id,
                stripe_subscription_id: entity.stripe_subscription_id,
                subscription_item_id: entity.subscription_item_id,
                price_id: entity.price_id,
                price_amount: entity.price_amount,
                currency: entity.currency,
                interval: entity.interval,
                interval_count: entity.interval_count,
                subscription_period_start: entity.subscription_period_start,
                subscription_period_end: entity.subscription_period_end,
                billing_cycle_anchor: entity.billing_cycle_anchor,
                cancel_at: entity.cancel_at,
                canceled_at: entity.canceled_at,
                payment_method: entity.payment_method,
                status: entity.status,
                is_active: entity.is_active,
                metadata: entity.metadata,
                created_at,
                updated_at: entity.updated_at,
            },
        );
        Ok(())
    }
}

/// Serves canned Stripe objects and records checkout requests.
#[derive(Default)]
pub struct FakeBillingProvider {
    subscriptions: Mutex<HashMap<String, Value>>,
    customers: Mutex<HashMap<String, Value>>,
    checkout_requests: Mutex<Vec<CheckoutSessionRequest>>,
    created_customers: Mutex<Vec<(String, Uuid)>>,
}

impl FakeBillingProvider {
    pub fn with_customer(customer: Value) -> Self {
        let provider = Self::default();
        provider.put_customer(customer);
        provider
    }

    pub fn put_customer(&self, customer: Value) {
        let id = customer["id"].as_str().unwrap_or_default().to_string();
        self.customers.lock().unwrap().insert(id, customer);
    }

    pub fn put_subscription(&self, subscription: Value) {
        let id = subscription["id"].as_str().unwrap_or_default().to_string();
        self.subscriptions.lock().unwrap().insert(id, subscription);
    }

    pub fn checkout_requests(&self) -> Vec<CheckoutSessionRequest> {
        self.checkout_requests.lock().unwrap().clone()
    }

    pub fn created_customers(&self) -> Vec<(String, Uuid)> {
        self.created_customers.lock().unwrap().clone()
    }
}

#[async_trait]
impl BillingProvider for FakeBillingProvider {
    async fn retrieve_subscription(&self, subscription_id: &str) -> Result<StripeSubscription> {
        let subscription = self
            .subscriptions
            .lock()
            .unwrap()
            .get(subscription_id)
            .cloned()
            .ok_or_else(|| anyhow!("No such subscription: '{subscription_id}'"))?;
        Ok(serde_json::from_value(subscription)?)
    }

    async fn retrieve_customer(&self, customer_id: &str) -> Result<Option<StripeCustomer>> {
        let customer = self.customers.lock().unwrap().get(customer_id).cloned();
        customer
            .map(|value| serde_json::from_value(value).map_err(Into::into))
            .transpose()
    }

    async fn create_customer(&self, email: &str, user_id: Uuid) -> Result<String> {
        let mut created = self.created_customers.lock().unwrap();
        let customer_id = format!("cus_created_{}", created.len() + 1);
        created.push((customer_id.clone(), user_id));
        drop(created);

        self.put_customer(json!({
            "id": customer_id,
            "email": email,
            "metadata": { "supabase_user_id": user_id.to_string() }
        }));
        Ok(customer_id)
    }

    async fn create_checkout_session(&self, request: CheckoutSessionRequest) -> Result<String> {
        let mut requests = self.checkout_requests.lock().unwrap();
        requests.push(request);
        Ok(format!(
            "https://checkout.stripe.com/c/pay/cs_test_{}",
            requests.len()
        ))
    }
}

pub type TestWebhookUseCase =
    StripeWebhookUseCase<InMemoryBillingStore, InMemoryBillingStore, FakeBillingProvider>;

pub fn webhook_usecase(
    store: Arc<InMemoryBillingStore>,
    provider: Arc<FakeBillingProvider>,
) -> TestWebhookUseCase {
    StripeWebhookUseCase::new(
        Arc::clone(&store),
        store,
        provider,
        WEBHOOK_SECRET.to_string(),
    )
}

pub fn customer_json(email: &str, user_id: Option<Uuid>) -> Value {
    let metadata = match user_id {
        Some(user_id) => json!({ "supabase_user_id": user_id.to_string() }),
        None => json!({}),
    };
    json!({
        "id": CUSTOMER_ID,
        "object": "customer",
        "email": email,
        "metadata": metadata
    })
}

pub fn subscription_json(status: &str) -> Value {
    json!({
        "id": SUBSCRIPTION_ID,
        "object": "subscription",
        "customer": CUSTOMER_ID,
        "status": status,
        "currency": "usd",
        "current_period_start": 1_700_000_000,
        "current_period_end": 1_702_592_000,
        "billing_cycle_anchor": 1_700_000_000,
        "cancel_at": null,
        "canceled_at": if status == "canceled" { json!(1_701_000_000) } else { Value::Null },
        "default_payment_method": { "id": "pm_1", "type": "card" },
        "metadata": {},
        "items": { "data": [{
            "id": "si_integration",
            "price": {
                "id": "price_monthly",
                "unit_amount": 999,
                "currency": "usd",
                "recurring": { "interval": "month", "interval_count": 1 }
            }
        }]}
    })
}

pub fn event_json(event_id: &str, event_type: &str, object: Value) -> Value {
    json!({
        "id": event_id,
        "object": "event",
        "type": event_type,
        "created": 1_700_000_100,
        "livemode": false,
        "data": { "object": object }
    })
}

pub fn event(event_id: &str, event_type: &str, object: Value) -> StripeEvent {
    serde_json::from_value(event_json(event_id, event_type, object)).unwrap()
}

/// `Stripe-Signature` header value for `payload` signed now.
pub fn sign(payload: &[u8], secret: &str) -> String {
    let timestamp = Utc::now().timestamp();
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    format!(
        "t={timestamp},v1={}",
        hex::encode(mac.finalize().into_bytes())
    )
}
