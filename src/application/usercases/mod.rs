pub mod checkout;
pub mod stripe_webhook;
pub mod subscription_format;
