use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::profiles::{InsertProfileEntity, ProfileEntity};

#[async_trait]
#[automock]
pub trait ProfileRepository {
    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<ProfileEntity>>;

    /// Exact, case-sensitive match against the stored email.
    async fn find_id_by_email(&self, email: String) -> Result<Option<Uuid>>;

    /// Inserts the profile unless a row with the same id already exists. An email
    /// already held by another profile is an error.
    async fn create_if_absent(&self, insert_profile_entity: InsertProfileEntity) -> Result<()>;

    async fn update_premium_status(&self, user_id: Uuid, is_premium: bool) -> Result<()>;
}
