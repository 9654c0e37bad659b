pub mod billing_provider;
pub mod identity;
