pub mod stripe_client;
pub mod stripe_objects;
pub mod webhook_signature;
