use super::config_loader::ConfigError;

#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub server: Server,
    pub database: Database,
    pub stripe: Stripe,
    pub supabase: Supabase,
    pub checkout: Checkout,
}

#[derive(Debug, Clone)]
pub struct Server {
    pub port: u16,
    /// Request body limit in MiB.
    pub body_limit: u64,
    /// Request timeout in seconds.
    pub timeout: u64,
}

impl Server {
    /// `body_limit` in bytes, rejecting values that overflow.
    pub fn body_limit_bytes(&self) -> Result<usize, ConfigError> {
        self.body_limit
            .checked_mul(1024 * 1024)
            .and_then(|bytes| usize::try_from(bytes).ok())
            .ok_or_else(|| ConfigError::Invalid {
                key: "SERVER_BODY_LIMIT",
                value: self.body_limit.to_string(),
            })
    }
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct Stripe {
    pub secret_key: String,
    pub webhook_signing_secret: String,
}

#[derive(Debug, Clone)]
pub struct Supabase {
    pub jwt_secret: String,
}

#[derive(Debug, Clone)]
pub struct Checkout {
    /// Used for success/cancel URLs when the request carries no `Origin` header.
    pub fallback_origin: String,
}
