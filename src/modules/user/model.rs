use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::modules::user::schema::UserEntity;

/// Public face of a user as shown next to friend requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

impl From<UserEntity> for UserSummary {
    fn from(user: UserEntity) -> Self {
        UserSummary {
            id: user.id,
            username: user.username,
            display_name: user.display_name,
            avatar_url: user.avatar_url,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UserSearchQuery {
    #[validate(length(max = 255, message = "Search term is too long"))]
    pub search: Option<String>,
    #[serde(default = "crate::utils::pagination::default_page")]
    #[validate(range(min = 1, message = "Page must be at least 1"))]
    pub page: u32,
    #[serde(default = "crate::utils::pagination::default_limit")]
    #[validate(range(min = 1, message = "Limit must be at least 1"))]
    pub limit: u32,
}
