use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::modules::{friend::schema::FriendRequestEntity, user::model::UserSummary};

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendFriendRequestBody {
    #[validate(length(min = 1, max = 255, message = "Recipient username must be 1-255 characters"))]
    pub recipient_username: String,
}

/// A friend request with the directory record of the side the reader cares
/// about. Which field is filled tells the client which party the
/// counterpart is.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequestView {
    #[serde(flatten)]
    pub request: FriendRequestEntity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requester: Option<UserSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient: Option<UserSummary>,
}

impl FriendRequestView {
    pub fn with_requester(request: FriendRequestEntity, requester: Option<UserSummary>) -> Self {
        FriendRequestView { request, requester, recipient: None }
    }

    pub fn with_recipient(request: FriendRequestEntity, recipient: Option<UserSummary>) -> Self {
        FriendRequestView { request, requester: None, recipient }
    }

    /// Attaches `counterpart` on whichever side of `request` is not `viewer`.
    pub fn seen_by(
        request: FriendRequestEntity,
        viewer: &Uuid,
        counterpart: Option<UserSummary>,
    ) -> Self {
        if request.requester_id == *viewer {
            Self::with_recipient(request, counterpart)
        } else {
            Self::with_requester(request, counterpart)
        }
    }

    pub fn counterpart(&self) -> Option<&UserSummary> {
        self.requester.as_ref().or(self.recipient.as_ref())
    }
}
