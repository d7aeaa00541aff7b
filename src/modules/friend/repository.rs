use uuid::Uuid;

use crate::{
    api::error,
    modules::friend::schema::{FriendRequestEntity, FriendRequestStatus},
    utils::pagination::{PageOptions, Paged},
};

/// Durable storage of friend requests.
///
/// Implementations only match identifiers; permission and state rules live
/// in the lifecycle. They must keep at most one record per unordered user
/// pair and report a violation as [`error::SystemError::UniqueViolation`].
#[async_trait::async_trait]
pub trait FriendRequestStore: Send + Sync {
    async fn create(
        &self,
        requester_id: &Uuid,
        recipient_id: &Uuid,
        status: FriendRequestStatus,
        status_changed_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<FriendRequestEntity, error::SystemError>;

    async fn find_by_id(
        &self,
        request_id: &Uuid,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError>;

    /// Exact direction only.
    async fn find_by_pair(
        &self,
        requester_id: &Uuid,
        recipient_id: &Uuid,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError>;

    /// Pending requests sent by `user_id`, newest first.
    async fn find_pending_sent_by(
        &self,
        user_id: &Uuid,
        page: PageOptions,
    ) -> Result<Paged<FriendRequestEntity>, error::SystemError>;

    /// Pending requests addressed to `user_id`, newest first.
    async fn find_pending_received_by(
        &self,
        user_id: &Uuid,
        page: PageOptions,
    ) -> Result<Paged<FriendRequestEntity>, error::SystemError>;

    /// Accepted requests on either side of `user_id`, most recently accepted first.
    async fn find_accepted_involving(
        &self,
        user_id: &Uuid,
        page: PageOptions,
    ) -> Result<Paged<FriendRequestEntity>, error::SystemError>;

    /// Moves the request from `expected` to `status`, stamping
    /// `status_changed_at` and `updated_at`.
    ///
    /// Fails with `NotFound` when the id is unknown and returns `Ok(None)`
    /// when the stored status is no longer `expected`.
    async fn update_status(
        &self,
        request_id: &Uuid,
        expected: FriendRequestStatus,
        status: FriendRequestStatus,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError>;

    /// Replaces `old_request_id` with a new request in one atomic step. When
    /// any part fails the old request is left in place.
    async fn supersede(
        &self,
        old_request_id: &Uuid,
        requester_id: &Uuid,
        recipient_id: &Uuid,
        status: FriendRequestStatus,
        status_changed_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<FriendRequestEntity, error::SystemError>;

    /// Idempotent.
    async fn delete(&self, request_id: &Uuid) -> Result<(), error::SystemError>;
}
