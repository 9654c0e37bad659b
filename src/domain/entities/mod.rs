pub mod profiles;
pub mod stripe_subscriptions;
