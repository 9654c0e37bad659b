use uuid::Uuid;

/// Caller identity resolved from a Supabase access token.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
    pub role: String,
}
