use anyhow::{Context, Result, anyhow};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    application::interfaces::identity::IdentityVerifier, domain::value_objects::iam::AuthUser,
};

pub const SUPABASE_AUDIENCE: &str = "authenticated";

#[derive(Debug, Serialize, Deserialize)]
pub struct SupabaseClaims {
    pub sub: String,
    #[serde(default)]
    pub role: String,
    pub email: Option<String>,
    pub exp: usize,
}

/// Verifies Supabase access tokens signed with the project's JWT secret.
pub struct SupabaseJwtVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl SupabaseJwtVerifier {
    pub fn new(jwt_secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[SUPABASE_AUDIENCE]);

        Self {
            decoding_key: DecodingKey::from_secret(jwt_secret.as_bytes()),
            validation,
        }
    }

    pub fn validate_supabase_jwt(&self, token: &str) -> Result<SupabaseClaims> {
        let token_data = decode::<SupabaseClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| anyhow!("JWT validation failed: {}", e))?;

        Ok(token_data.claims)
    }
}

impl IdentityVerifier for SupabaseJwtVerifier {
    fn resolve_user(&self, token: &str) -> Result<AuthUser> {
        let claims = self.validate_supabase_jwt(token)?;

        let user_id = Uuid::parse_str(&claims.sub).context("Invalid user ID in token")?;
        let email = claims
            .email
            .filter(|email| !email.trim().is_empty())
            .ok_or_else(|| anyhow!("Token carries no email"))?;

        Ok(AuthUser {
            user_id,
            email,
            role: claims.role,
        })
    }
}
