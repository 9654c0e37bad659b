use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCheckoutRequest {
    #[serde(rename = "priceId", default)]
    pub price_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateCheckoutResponse {
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct WebhookReceivedResponse {
    pub received: bool,
}
