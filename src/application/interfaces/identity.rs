use anyhow::Result as AnyResult;

use crate::domain::value_objects::iam::AuthUser;

/// Resolves a bearer token issued by the identity provider to a user.
#[cfg_attr(test, mockall::automock)]
pub trait IdentityVerifier: Send + Sync {
    fn resolve_user(&self, token: &str) -> AnyResult<AuthUser>;
}
