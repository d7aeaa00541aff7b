use std::cmp::Reverse;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    api::error,
    modules::friend::{
        repository::FriendRequestStore,
        schema::{FriendRequestEntity, FriendRequestStatus},
    },
    utils::pagination::{PageOptions, Paged},
};

/// Process-local store for single-node runs and tests. Records are kept in
/// insertion order; every write holds the lock for its whole
/// check-and-mutate step.
#[derive(Default)]
pub struct FriendRequestRepositoryMemory {
    requests: RwLock<Vec<FriendRequestEntity>>,
}

impl FriendRequestRepositoryMemory {
    pub fn new() -> Self {
        Self::default()
    }

    async fn page_where<F, K>(
        &self,
        page: PageOptions,
        filter: F,
        sort_key: K,
    ) -> Paged<FriendRequestEntity>
    where
        F: Fn(&FriendRequestEntity) -> bool,
        K: Fn(&FriendRequestEntity) -> chrono::DateTime<chrono::Utc>,
    {
        let requests = self.requests.read().await;

        // newest insertion first, then a stable sort keeps that order on ties
        let mut rows: Vec<FriendRequestEntity> =
            requests.iter().rev().filter(|r| filter(r)).cloned().collect();
        rows.sort_by_key(|r| Reverse(sort_key(r)));

        let rows = rows
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.fetch_limit() as usize)
            .collect();

        Paged::from_overfetch(rows, page)
    }
}

#[async_trait::async_trait]
impl FriendRequestStore for FriendRequestRepositoryMemory {
    async fn create(
        &self,
        requester_id: &Uuid,
        recipient_id: &Uuid,
        status: FriendRequestStatus,
        status_changed_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<FriendRequestEntity, error::SystemError> {
        let mut requests = self.requests.write().await;
        insert_locked(&mut requests, None, requester_id, recipient_id, status, status_changed_at)
    }

    async fn find_by_id(
        &self,
        request_id: &Uuid,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError> {
        let requests = self.requests.read().await;
        Ok(requests.iter().find(|r| r.id == *request_id).cloned())
    }

    async fn find_by_pair(
        &self,
        requester_id: &Uuid,
        recipient_id: &Uuid,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError> {
        let requests = self.requests.read().await;
        Ok(requests
            .iter()
            .find(|r| r.requester_id == *requester_id && r.recipient_id == *recipient_id)
            .cloned())
    }

    async fn find_pending_sent_by(
        &self,
        user_id: &Uuid,
        page: PageOptions,
    ) -> Result<Paged<FriendRequestEntity>, error::SystemError> {
        Ok(self
            .page_where(
                page,
                |r| r.requester_id == *user_id && r.status == FriendRequestStatus::Pending,
                |r| r.created_at,
            )
            .await)
    }

    async fn find_pending_received_by(
        &self,
        user_id: &Uuid,
        page: PageOptions,
    ) -> Result<Paged<FriendRequestEntity>, error::SystemError> {
        Ok(self
            .page_where(
                page,
                |r| r.recipient_id == *user_id && r.status == FriendRequestStatus::Pending,
                |r| r.created_at,
            )
            .await)
    }

    async fn find_accepted_involving(
        &self,
        user_id: &Uuid,
        page: PageOptions,
    ) -> Result<Paged<FriendRequestEntity>, error::SystemError> {
        Ok(self
            .page_where(
                page,
                |r| r.involves(user_id) && r.status == FriendRequestStatus::Accepted,
                |r| r.status_changed_at,
            )
            .await)
    }

    async fn update_status(
        &self,
        request_id: &Uuid,
        expected: FriendRequestStatus,
        status: FriendRequestStatus,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError> {
        let mut requests = self.requests.write().await;

        let request = requests
            .iter_mut()
            .find(|r| r.id == *request_id)
            .ok_or_else(|| error::SystemError::not_found("Friend request not found"))?;

        if request.status != expected {
            return Ok(None);
        }

        let now = chrono::Utc::now();
        request.status = status;
        request.status_changed_at = now;
        request.updated_at = now;

        Ok(Some(request.clone()))
    }

    async fn supersede(
        &self,
        old_request_id: &Uuid,
        requester_id: &Uuid,
        recipient_id: &Uuid,
        status: FriendRequestStatus,
        status_changed_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<FriendRequestEntity, error::SystemError> {
        let mut requests = self.requests.write().await;
        insert_locked(
            &mut requests,
            Some(old_request_id),
            requester_id,
            recipient_id,
            status,
            status_changed_at,
        )
    }

    async fn delete(&self, request_id: &Uuid) -> Result<(), error::SystemError> {
        self.requests.write().await.retain(|r| r.id != *request_id);
        Ok(())
    }
}

/// Pair check, optional removal of `replacing` and insert, all under the
/// caller's write guard.
fn insert_locked(
    requests: &mut Vec<FriendRequestEntity>,
    replacing: Option<&Uuid>,
    requester_id: &Uuid,
    recipient_id: &Uuid,
    status: FriendRequestStatus,
    status_changed_at: chrono::DateTime<chrono::Utc>,
) -> Result<FriendRequestEntity, error::SystemError> {
    let taken = requests.iter().any(|r| {
        Some(&r.id) != replacing && r.involves(requester_id) && r.involves(recipient_id)
    });
    if taken {
        return Err(error::SystemError::UniqueViolation(None));
    }

    if let Some(old_id) = replacing {
        requests.retain(|r| r.id != *old_id);
    }

    let request = FriendRequestEntity {
        id: Uuid::new_v7(uuid::Timestamp::now(uuid::NoContext)),
        requester_id: *requester_id,
        recipient_id: *recipient_id,
        status,
        status_changed_at,
        created_at: status_changed_at,
        updated_at: status_changed_at,
    };
    requests.push(request.clone());
    tracing::debug!("Stored friend request {} in memory", request.id);

    Ok(request)
}
