use std::collections::HashMap;

use serde::Deserialize;
use uuid::Uuid;

/// Metadata key carrying the owning profile id on Stripe customers, sessions and subscriptions.
pub const PROFILE_ID_METADATA_KEY: &str = "supabase_user_id";

#[derive(Debug, Clone, Deserialize)]
pub struct StripeEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub type_: String,
    pub created: Option<i64>,
    pub livemode: Option<bool>,
    pub data: StripeEventData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripeEventData {
    pub object: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StripeEventKind {
    CheckoutSessionCompleted,
    SubscriptionCreated,
    SubscriptionUpdated,
    SubscriptionDeleted,
    Other(String),
}

impl StripeEventKind {
    pub fn from_str(value: &str) -> Self {
        match value {
            "checkout.session.completed" => StripeEventKind::CheckoutSessionCompleted,
            "customer.subscription.created" => StripeEventKind::SubscriptionCreated,
            "customer.subscription.updated" => StripeEventKind::SubscriptionUpdated,
            "customer.subscription.deleted" => StripeEventKind::SubscriptionDeleted,
            other => StripeEventKind::Other(other.to_string()),
        }
    }

    pub fn is_handled(&self) -> bool {
        !matches!(self, StripeEventKind::Other(_))
    }
}

impl StripeEvent {
    pub fn kind(&self) -> StripeEventKind {
        StripeEventKind::from_str(&self.type_)
    }
}

/// A reference that Stripe returns either as a bare id or as an expanded object.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum StripeObjectRef {
    Id(String),
    Object { id: String },
}

impl StripeObjectRef {
    pub fn id(&self) -> &str {
        match self {
            StripeObjectRef::Id(id) => id,
            StripeObjectRef::Object { id } => id,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripeCheckoutSession {
    pub id: String,
    pub mode: Option<String>,
    pub customer: Option<StripeObjectRef>,
    pub subscription: Option<StripeObjectRef>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripeSubscription {
    pub id: String,
    pub customer: StripeObjectRef,
    pub status: String,
    pub currency: Option<String>,
    pub current_period_start: Option<i64>,
    pub current_period_end: Option<i64>,
    pub billing_cycle_anchor: Option<i64>,
    pub cancel_at: Option<i64>,
    pub canceled_at: Option<i64>,
    /// Bare id unless retrieved with `expand[]=default_payment_method`.
    pub default_payment_method: Option<serde_json::Value>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    #[serde(default)]
    pub items: StripeSubscriptionItems,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct StripeSubscriptionItems {
    pub data: Vec<StripeSubscriptionItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripeSubscriptionItem {
    pub id: String,
    pub price: Option<StripePrice>,
    pub current_period_start: Option<i64>,
    pub current_period_end: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripePrice {
    pub id: String,
    pub unit_amount: Option<i64>,
    pub currency: Option<String>,
    pub recurring: Option<StripeRecurring>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripeRecurring {
    pub interval: String,
    pub interval_count: Option<i64>,
}

impl StripeSubscription {
    pub fn first_item(&self) -> Option<&StripeSubscriptionItem> {
        self.items.data.first()
    }

    /// Returns the subscription period start timestamp, falling back to the first item
    /// or the billing cycle anchor when the top-level field is absent.
    pub fn period_start(&self) -> Option<i64> {
        self.current_period_start
            .or_else(|| self.first_item().and_then(|item| item.current_period_start))
            .or(self.billing_cycle_anchor)
    }

    /// Returns the subscription period end timestamp, falling back to the first item when needed.
    pub fn period_end(&self) -> Option<i64> {
        self.current_period_end
            .or_else(|| self.first_item().and_then(|item| item.current_period_end))
    }

    /// Payment method kind (`card`, `sepa_debit`, ...) when the default payment
    /// method was expanded into an object.
    pub fn payment_method_kind(&self) -> Option<String> {
        self.default_payment_method
            .as_ref()
            .and_then(|value| value.get("type"))
            .and_then(|kind| kind.as_str())
            .map(str::to_string)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripeCustomer {
    pub id: String,
    pub email: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    #[serde(default)]
    pub deleted: bool,
}

impl StripeCustomer {
    /// Profile id embedded at customer creation, if it parses as a UUID.
    pub fn profile_id_from_metadata(&self) -> Option<Uuid> {
        self.metadata
            .get(PROFILE_ID_METADATA_KEY)
            .and_then(|value| Uuid::parse_str(value.trim()).ok())
    }
}

/// Parameters for a one-item subscription checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutSessionRequest {
    pub customer_id: String,
    pub price_id: String,
    pub user_id: Uuid,
    pub success_url: String,
    pub cancel_url: String,
}
