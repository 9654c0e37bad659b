pub mod checkout;
pub mod stripe_webhook;
