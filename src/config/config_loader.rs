use std::str::FromStr;

use anyhow::Result;
use thiserror::Error;

use super::config_model::{Checkout, Database, DotEnvyConfig, Server, Stripe, Supabase};
use super::stage::Stage;

pub const DEFAULT_SERVER_PORT: u16 = 8080;
pub const DEFAULT_BODY_LIMIT_MIB: u64 = 10;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CHECKOUT_ORIGIN: &str = "http://localhost:5173";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("configuration error: {0} is not set")]
    Missing(&'static str),
    #[error("configuration error: {key} has an invalid value ({value})")]
    Invalid { key: &'static str, value: String },
}

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    load_from(|key| std::env::var(key).ok())
}

/// Builds the configuration from an arbitrary variable source.
pub fn load_from<F>(lookup: F) -> Result<DotEnvyConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let server = Server {
        port: optional(&lookup, "SERVER_PORT", DEFAULT_SERVER_PORT)?,
        body_limit: optional(&lookup, "SERVER_BODY_LIMIT", DEFAULT_BODY_LIMIT_MIB)?,
        timeout: optional(&lookup, "SERVER_TIMEOUT", DEFAULT_TIMEOUT_SECS)?,
    };
    server.body_limit_bytes()?;

    let database = Database {
        url: required(&lookup, "DATABASE_URL")?,
    };

    let stripe = Stripe {
        secret_key: required(&lookup, "STRIPE_SECRET_KEY")?,
        webhook_signing_secret: required(&lookup, "STRIPE_WEBHOOK_SIGNING_SECRET")?,
    };

    let supabase = Supabase {
        jwt_secret: required(&lookup, "SUPABASE_JWT_SECRET")?,
    };

    let checkout = Checkout {
        fallback_origin: non_empty(&lookup, "CHECKOUT_FALLBACK_ORIGIN")
            .unwrap_or_else(|| DEFAULT_CHECKOUT_ORIGIN.to_string()),
    };

    Ok(DotEnvyConfig {
        server,
        database,
        stripe,
        supabase,
        checkout,
    })
}

pub fn get_stage() -> Stage {
    dotenvy::dotenv().ok();

    let stage_str = std::env::var("STAGE").unwrap_or("".to_string());
    Stage::try_from(&stage_str).unwrap_or_default()
}

fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn required<F>(lookup: &F, key: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    non_empty(lookup, key).ok_or(ConfigError::Missing(key))
}

fn optional<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match non_empty(lookup, key) {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}
