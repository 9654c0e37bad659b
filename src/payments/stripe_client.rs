use anyhow::Result;
use reqwest::{
    StatusCode,
    header::{AUTHORIZATION, CONTENT_TYPE},
};
use serde::Deserialize;
use tracing::error;
use uuid::Uuid;

use super::stripe_objects::{
    CheckoutSessionRequest, PROFILE_ID_METADATA_KEY, StripeCustomer, StripeSubscription,
};

const STRIPE_API_BASE: &str = "https://api.stripe.com/v1";

/// Minimal Stripe client built on reqwest.
pub struct StripeClient {
    http: reqwest::Client,
    secret_key: String,
    api_base: String,
}

#[derive(Debug, Deserialize)]
struct StripeErrorEnvelope {
    error: StripeErrorDetails,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetails {
    #[serde(rename = "type")]
    type_: Option<String>,
    code: Option<String>,
    message: Option<String>,
    param: Option<String>,
}

impl StripeClient {
    pub fn new(secret_key: String) -> Self {
        Self::with_api_base(secret_key, STRIPE_API_BASE.to_string())
    }

    pub fn with_api_base(secret_key: String, api_base: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            secret_key,
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path)
    }

    async fn ensure_success(
        resp: reqwest::Response,
        context: &str,
    ) -> Result<reqwest::Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }

        let status = resp.status();
        let request_id = resp
            .headers()
            .get("request-id")
            .or_else(|| resp.headers().get("stripe-request-id"))
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        let body = match resp.text().await {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => "<empty response body>".to_string(),
            Err(err) => format!("<failed to read response body: {err}>"),
        };

        let details = serde_json::from_str::<StripeErrorEnvelope>(&body)
            .ok()
            .map(|envelope| envelope.error);
        let stripe_error_message = details.as_ref().and_then(|d| d.message.clone());

        error!(
            status = %status,
            stripe_request_id = ?request_id,
            stripe_error_type = ?details.as_ref().and_then(|d| d.type_.as_deref()),
            stripe_error_code = ?details.as_ref().and_then(|d| d.code.as_deref()),
            stripe_error_param = ?details.as_ref().and_then(|d| d.param.as_deref()),
            stripe_error_message = ?stripe_error_message,
            response_body = %body,
            context = %context,
            "stripe api request failed"
        );

        match stripe_error_message {
            Some(message) => anyhow::bail!("Stripe API request failed: {context}: {message}"),
            None => anyhow::bail!(
                "Stripe API request failed: {} (status {}, request_id={:?})",
                context,
                status,
                request_id
            ),
        }
    }

    /// Creates a customer tagged with the owning profile id.
    pub async fn create_customer(&self, email: &str, user_id: Uuid) -> Result<String> {
        // https://stripe.com/docs/api/customers/create
        let body = [
            ("email".to_string(), email.to_string()),
            (
                format!("metadata[{PROFILE_ID_METADATA_KEY}]"),
                user_id.to_string(),
            ),
        ];

        let resp = self
            .http
            .post(self.url("customers"))
            .header(AUTHORIZATION, format!("Bearer {}", self.secret_key))
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .form(&body)
            .send()
            .await?;
        let resp = Self::ensure_success(resp, "create customer").await?;

        #[derive(Deserialize)]
        struct CustomerResp {
            id: String,
        }

        let parsed: CustomerResp = resp.json().await?;
        Ok(parsed.id)
    }

    /// Retrieves a customer. Returns `None` when Stripe does not know the id.
    pub async fn retrieve_customer(&self, customer_id: &str) -> Result<Option<StripeCustomer>> {
        // https://stripe.com/docs/api/customers/retrieve
        let resp = self
            .http
            .get(self.url(&format!("customers/{customer_id}")))
            .header(AUTHORIZATION, format!("Bearer {}", self.secret_key))
            .send()
            .await?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let resp = Self::ensure_success(resp, "retrieve customer").await?;

        let customer: StripeCustomer = resp.json().await?;
        Ok(Some(customer))
    }

    /// Retrieves a subscription with its price and default payment method expanded.
    pub async fn retrieve_subscription(&self, subscription_id: &str) -> Result<StripeSubscription> {
        // https://stripe.com/docs/api/subscriptions/retrieve
        let resp = self
            .http
            .get(self.url(&format!("subscriptions/{subscription_id}")))
            .header(AUTHORIZATION, format!("Bearer {}", self.secret_key))
            .query(&[
                ("expand[]", "default_payment_method"),
                ("expand[]", "items.data.price"),
            ])
            .send()
            .await?;
        let resp = Self::ensure_success(resp, "retrieve subscription").await?;

        let subscription: StripeSubscription = resp.json().await?;
        Ok(subscription)
    }

    /// Creates a subscription-mode Checkout Session and returns its URL.
    pub async fn create_checkout_session(&self, request: &CheckoutSessionRequest) -> Result<String> {
        // https://stripe.com/docs/api/checkout/sessions/create
        let user_id = request.user_id.to_string();
        let body: Vec<(String, String)> = vec![
            ("mode".to_string(), "subscription".to_string()),
            ("customer".to_string(), request.customer_id.clone()),
            ("line_items[0][price]".to_string(), request.price_id.clone()),
            ("line_items[0][quantity]".to_string(), "1".to_string()),
            ("success_url".to_string(), request.success_url.clone()),
            ("cancel_url".to_string(), request.cancel_url.clone()),
            (format!("metadata[{PROFILE_ID_METADATA_KEY}]"), user_id.clone()),
            (
                format!("subscription_data[metadata][{PROFILE_ID_METADATA_KEY}]"),
                user_id,
            ),
        ];

        let resp = self
            .http
            .post(self.url("checkout/sessions"))
            .header(AUTHORIZATION, format!("Bearer {}", self.secret_key))
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .form(&body)
            .send()
            .await?;
        let resp = Self::ensure_success(resp, "create checkout session").await?;

        #[derive(Deserialize)]
        struct CheckoutResp {
            url: Option<String>,
        }

        let parsed: CheckoutResp = resp.json().await?;
        parsed
            .url
            .ok_or_else(|| anyhow::anyhow!("Stripe Checkout session URL is missing"))
    }
}
