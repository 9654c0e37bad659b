pub mod checkout;
pub mod enums;
pub mod iam;
pub mod stripe_subscriptions;
