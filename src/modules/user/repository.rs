use uuid::Uuid;

use crate::{
    api::error,
    modules::user::model::UserSummary,
    utils::pagination::{PageOptions, Paged},
};

/// Read-only view of the account service's users, as seen by the friends
/// module.
#[async_trait::async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<UserSummary>, error::SystemError>;

    /// Case-insensitive.
    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserSummary>, error::SystemError>;

    /// Search users by username or display name (case-insensitive, partial match)
    async fn search_users(
        &self,
        query: &str,
        page: PageOptions,
    ) -> Result<Paged<UserSummary>, error::SystemError>;
}
