use serde::{Deserialize, Serialize};
use sqlx::prelude::{FromRow, Type};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(type_name = "friend_request_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FriendRequestStatus {
    Pending,
    Accepted,
    Rejected,
    Cancelled,
}

impl FriendRequestStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, FriendRequestStatus::Pending)
    }

    /// Terminal outcomes that ended without a friendship.
    pub fn is_closed(self) -> bool {
        matches!(self, FriendRequestStatus::Rejected | FriendRequestStatus::Cancelled)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequestEntity {
    pub id: Uuid,
    pub requester_id: Uuid,
    pub recipient_id: Uuid,
    pub status: FriendRequestStatus,
    pub status_changed_at: chrono::DateTime<chrono::Utc>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl FriendRequestEntity {
    pub fn involves(&self, user_id: &Uuid) -> bool {
        self.requester_id == *user_id || self.recipient_id == *user_id
    }

    /// The party that is not `user_id`.
    pub fn other_party(&self, user_id: &Uuid) -> Uuid {
        if self.requester_id == *user_id { self.recipient_id } else { self.requester_id }
    }
}
