use axum::http::StatusCode;
use thiserror::Error;

use crate::payments::webhook_signature::WebhookVerificationError;

/// Shown to end users for any checkout failure past authentication and validation.
pub const CHECKOUT_RETRY_MESSAGE: &str = "Failed to start checkout, please retry";

#[derive(Debug, Error)]
pub enum BillingError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("signature verification failed: {0}")]
    SignatureInvalid(String),
    #[error("malformed event: {0}")]
    MalformedEvent(String),
    #[error("customer unavailable: {0}")]
    CustomerUnavailable(String),
    #[error("no profile found for customer {0}")]
    ProfileNotFound(String),
    #[error("persistence error: {0}")]
    Persistence(#[source] anyhow::Error),
    #[error("billing provider request failed: {0}")]
    Provider(#[source] anyhow::Error),
    #[error("checkout creation failed: {0}")]
    CheckoutCreation(String),
    #[error("authentication required")]
    AuthenticationRequired,
    #[error("{0}")]
    InvalidRequest(String),
}

impl BillingError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            BillingError::Configuration(_)
            | BillingError::Persistence(_)
            | BillingError::Provider(_)
            | BillingError::CheckoutCreation(_) => StatusCode::INTERNAL_SERVER_ERROR,
            BillingError::SignatureInvalid(_)
            | BillingError::MalformedEvent(_)
            | BillingError::CustomerUnavailable(_)
            | BillingError::ProfileNotFound(_)
            | BillingError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            BillingError::AuthenticationRequired => StatusCode::UNAUTHORIZED,
        }
    }

    /// Message safe to return to a browser. Provider and storage detail stays in the logs.
    pub fn public_message(&self) -> String {
        match self {
            BillingError::AuthenticationRequired => "Authentication required".to_string(),
            BillingError::InvalidRequest(message) => message.clone(),
            _ => CHECKOUT_RETRY_MESSAGE.to_string(),
        }
    }
}

impl From<WebhookVerificationError> for BillingError {
    fn from(err: WebhookVerificationError) -> Self {
        match err {
            WebhookVerificationError::MissingSecret => BillingError::Configuration(err.to_string()),
            WebhookVerificationError::InvalidSignature(reason) => {
                BillingError::SignatureInvalid(reason.to_string())
            }
            WebhookVerificationError::InvalidPayload(reason) => BillingError::MalformedEvent(reason),
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, BillingError>;
