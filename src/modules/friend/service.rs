use log::info;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    api::error,
    modules::{
        friend::{
            lifecycle::FriendRequestLifecycle,
            model::FriendRequestView,
            query::FriendRelationshipQuery,
            repository::FriendRequestStore,
            schema::FriendRequestEntity,
        },
        user::{model::UserSummary, repository::UserRepository},
    },
    utils::pagination::{PageOptions, Paged},
};

pub const MIN_SEARCH_LENGTH: usize = 2;
pub const MAX_SEARCH_LIMIT: u32 = 50;

/// Entry point for the HTTP layer.
#[derive(Clone)]
pub struct FriendService {
    lifecycle: FriendRequestLifecycle,
    query: FriendRelationshipQuery,
    store: Arc<dyn FriendRequestStore>,
    users: Arc<dyn UserRepository>,
}

impl FriendService {
    pub fn with_dependencies(
        lifecycle: FriendRequestLifecycle,
        query: FriendRelationshipQuery,
        store: Arc<dyn FriendRequestStore>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        info!("FriendService initialized with dependencies");
        FriendService { lifecycle, query, store, users }
    }

    pub async fn send_friend_request(
        &self,
        requester_id: Uuid,
        recipient_username: &str,
    ) -> Result<FriendRequestEntity, error::SystemError> {
        self.lifecycle.send(requester_id, recipient_username).await
    }

    pub async fn cancel_friend_request(
        &self,
        requester_id: Uuid,
        request_id: Uuid,
    ) -> Result<FriendRequestEntity, error::SystemError> {
        self.lifecycle.cancel(requester_id, request_id).await
    }

    pub async fn accept_friend_request(
        &self,
        recipient_id: Uuid,
        request_id: Uuid,
    ) -> Result<FriendRequestEntity, error::SystemError> {
        self.lifecycle.accept(recipient_id, request_id).await
    }

    pub async fn reject_friend_request(
        &self,
        recipient_id: Uuid,
        request_id: Uuid,
    ) -> Result<FriendRequestEntity, error::SystemError> {
        self.lifecycle.reject(recipient_id, request_id).await
    }

    pub async fn get_pending_sent_requests(
        &self,
        user_id: Uuid,
        page: PageOptions,
    ) -> Result<Paged<FriendRequestView>, error::SystemError> {
        self.query.pending_sent(user_id, page).await
    }

    pub async fn get_pending_received_requests(
        &self,
        user_id: Uuid,
        page: PageOptions,
    ) -> Result<Paged<FriendRequestView>, error::SystemError> {
        self.query.pending_received(user_id, page).await
    }

    pub async fn get_friends_list(
        &self,
        user_id: Uuid,
        page: PageOptions,
    ) -> Result<Paged<FriendRequestView>, error::SystemError> {
        self.query.friends_list(user_id, page).await
    }

    pub async fn get_user_friends_list(
        &self,
        target_user_id: Uuid,
        page: PageOptions,
    ) -> Result<Paged<FriendRequestView>, error::SystemError> {
        self.query.friends_list_of(target_user_id, page).await
    }

    /// A single request, visible to its two parties only.
    pub async fn get_friend_request(
        &self,
        user_id: Uuid,
        request_id: Uuid,
    ) -> Result<FriendRequestEntity, error::SystemError> {
        let request = self
            .store
            .find_by_id(&request_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Friend request not found"))?;

        if !request.involves(&user_id) {
            return Err(error::SystemError::forbidden(
                "You are not a party to this friend request",
            ));
        }

        Ok(request)
    }

    pub async fn search_users(
        &self,
        term: Option<&str>,
        page: u32,
        limit: u32,
    ) -> Result<Paged<UserSummary>, error::SystemError> {
        let page = PageOptions::new(page, limit.min(MAX_SEARCH_LIMIT));

        let term = term.map(str::trim).unwrap_or_default();
        if term.chars().count() < MIN_SEARCH_LENGTH {
            return Ok(Paged::empty(page));
        }

        self.users.search_users(term, page).await
    }

    /// Administrative cleanup; bypasses the lifecycle.
    pub async fn remove_friend_request(&self, request_id: Uuid) -> Result<(), error::SystemError> {
        self.store.delete(&request_id).await?;
        info!("Friend request {request_id} removed by an administrator");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::{Fixture, ALICE, BOB, CAROL};

    #[tokio::test]
    async fn alice_and_bob_become_friends() {
        let fx = Fixture::new();
        let svc = &fx.service;

        let request = svc.send_friend_request(fx.id(ALICE), BOB).await.unwrap();
        let accepted = svc.accept_friend_request(fx.id(BOB), request.id).await.unwrap();
        assert_eq!(accepted.id, request.id);

        let page = PageOptions::new(1, 10);
        let alice = svc.get_friends_list(fx.id(ALICE), page).await.unwrap();
        assert_eq!(alice.data.len(), 1);
        assert_eq!(alice.data[0].recipient.as_ref().unwrap().username, BOB);

        let bob = svc.get_user_friends_list(fx.id(BOB), page).await.unwrap();
        assert_eq!(bob.data.len(), 1);
        assert_eq!(bob.data[0].requester.as_ref().unwrap().username, ALICE);
    }

    #[tokio::test]
    async fn cancel_then_resend_is_still_blocked() {
        let fx = Fixture::new();
        let svc = &fx.service;

        let request = svc.send_friend_request(fx.id(ALICE), BOB).await.unwrap();
        let cancelled = svc.cancel_friend_request(fx.id(ALICE), request.id).await.unwrap();
        assert_eq!(cancelled.status, crate::modules::friend::schema::FriendRequestStatus::Cancelled);

        let page = PageOptions::new(1, 10);
        assert!(svc.get_friends_list(fx.id(ALICE), page).await.unwrap().data.is_empty());
        assert!(svc.get_friends_list(fx.id(BOB), page).await.unwrap().data.is_empty());
        assert!(svc.get_pending_received_requests(fx.id(BOB), page).await.unwrap().data.is_empty());

        let err = svc.send_friend_request(fx.id(ALICE), BOB).await.unwrap_err();
        assert!(matches!(err, error::SystemError::Conflict(_)));
    }

    #[tokio::test]
    async fn rejected_request_is_reported_to_the_requester() {
        let fx = Fixture::new();
        let svc = &fx.service;

        let request = svc.send_friend_request(fx.id(ALICE), BOB).await.unwrap();
        svc.reject_friend_request(fx.id(BOB), request.id).await.unwrap();

        let seen = svc.get_friend_request(fx.id(ALICE), request.id).await.unwrap();
        assert_eq!(seen.status, crate::modules::friend::schema::FriendRequestStatus::Rejected);
        let page = PageOptions::new(1, 10);
        assert!(svc.get_pending_sent_requests(fx.id(ALICE), page).await.unwrap().data.is_empty());
    }

    #[tokio::test]
    async fn single_request_is_private_to_its_parties() {
        let fx = Fixture::new();
        let request = fx.service.send_friend_request(fx.id(ALICE), BOB).await.unwrap();

        assert!(fx.service.get_friend_request(fx.id(BOB), request.id).await.is_ok());
        let err = fx.service.get_friend_request(fx.id(CAROL), request.id).await.unwrap_err();
        assert!(matches!(err, error::SystemError::Forbidden(_)));

        let missing = Uuid::new_v7(uuid::Timestamp::now(uuid::NoContext));
        let err = fx.service.get_friend_request(fx.id(ALICE), missing).await.unwrap_err();
        assert!(matches!(err, error::SystemError::NotFound(_)));
    }

    #[tokio::test]
    async fn admin_removal_frees_the_pair() {
        let fx = Fixture::new();
        let request = fx.service.send_friend_request(fx.id(ALICE), BOB).await.unwrap();

        fx.service.remove_friend_request(request.id).await.unwrap();
        fx.service.remove_friend_request(request.id).await.unwrap();

        let again = fx.service.send_friend_request(fx.id(BOB), ALICE).await.unwrap();
        assert_eq!(again.requester_id, fx.id(BOB));
    }

    #[tokio::test]
    async fn search_ignores_short_terms_and_caps_limit() {
        let fx = Fixture::new();

        let empty = fx.service.search_users(Some(" a "), 1, 10).await.unwrap();
        assert!(empty.data.is_empty());
        assert!(fx.service.search_users(None, 2, 10).await.unwrap().has_previous_page);

        let found = fx.service.search_users(Some("example"), 1, 500).await.unwrap();
        assert_eq!(found.data.len(), 4);
        assert!(!found.has_next_page);

        let found = fx.service.search_users(Some("CAR"), 1, 10).await.unwrap();
        assert_eq!(found.data.len(), 1);
        assert_eq!(found.data[0].username, CAROL);
    }
}
