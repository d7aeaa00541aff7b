use std::sync::Arc;

use futures_util::future::try_join_all;
use uuid::Uuid;

use crate::{
    api::error,
    modules::{
        friend::{model::FriendRequestView, repository::FriendRequestStore},
        user::repository::UserRepository,
    },
    utils::pagination::{PageOptions, Paged},
};

/// Read side: pending lists and friends lists with the other party's
/// directory record attached.
#[derive(Clone)]
pub struct FriendRelationshipQuery {
    store: Arc<dyn FriendRequestStore>,
    users: Arc<dyn UserRepository>,
}

impl FriendRelationshipQuery {
    pub fn with_dependencies(
        store: Arc<dyn FriendRequestStore>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        FriendRelationshipQuery { store, users }
    }

    pub async fn pending_sent(
        &self,
        user_id: Uuid,
        page: PageOptions,
    ) -> Result<Paged<FriendRequestView>, error::SystemError> {
        let requests = self.store.find_pending_sent_by(&user_id, page).await?;

        let views = try_join_all(requests.data.iter().cloned().map(|request| async move {
            let recipient = self.users.find_by_id(&request.recipient_id).await?;
            Ok::<_, error::SystemError>(FriendRequestView::with_recipient(request, recipient))
        }))
        .await?;

        Ok(requests.with_data(views))
    }

    pub async fn pending_received(
        &self,
        user_id: Uuid,
        page: PageOptions,
    ) -> Result<Paged<FriendRequestView>, error::SystemError> {
        let requests = self.store.find_pending_received_by(&user_id, page).await?;

        let views = try_join_all(requests.data.iter().cloned().map(|request| async move {
            let requester = self.users.find_by_id(&request.requester_id).await?;
            Ok::<_, error::SystemError>(FriendRequestView::with_requester(request, requester))
        }))
        .await?;

        Ok(requests.with_data(views))
    }

    pub async fn friends_list(
        &self,
        user_id: Uuid,
        page: PageOptions,
    ) -> Result<Paged<FriendRequestView>, error::SystemError> {
        let accepted = self.store.find_accepted_involving(&user_id, page).await?;

        let views = try_join_all(accepted.data.iter().cloned().map(|request| async move {
            let friend = self.users.find_by_id(&request.other_party(&user_id)).await?;
            Ok::<_, error::SystemError>(FriendRequestView::seen_by(request, &user_id, friend))
        }))
        .await?;

        Ok(accepted.with_data(views))
    }

    /// Another user's friends list. Friends lists are public to every
    /// authenticated user.
    pub async fn friends_list_of(
        &self,
        target_user_id: Uuid,
        page: PageOptions,
    ) -> Result<Paged<FriendRequestView>, error::SystemError> {
        self.friends_list(target_user_id, page).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::{Fixture, ALICE, BOB, CAROL, DAVE};

    #[tokio::test]
    async fn pending_lists_attach_the_other_side() {
        let fx = Fixture::new();
        let request = fx.lifecycle.send(fx.id(ALICE), BOB).await.unwrap();

        let sent = fx.query.pending_sent(fx.id(ALICE), PageOptions::new(1, 10)).await.unwrap();
        assert_eq!(sent.data.len(), 1);
        assert_eq!(sent.data[0].request.id, request.id);
        assert_eq!(sent.data[0].recipient.as_ref().map(|u| u.username.as_str()), Some(BOB));
        assert!(sent.data[0].requester.is_none());

        let received =
            fx.query.pending_received(fx.id(BOB), PageOptions::new(1, 10)).await.unwrap();
        assert_eq!(received.data.len(), 1);
        assert_eq!(received.data[0].requester.as_ref().map(|u| u.username.as_str()), Some(ALICE));
        assert!(received.data[0].recipient.is_none());

        assert!(fx.query.pending_received(fx.id(ALICE), PageOptions::new(1, 10)).await.unwrap().data.is_empty());
    }

    #[tokio::test]
    async fn accepted_pair_shows_up_for_both_and_leaves_pending_lists() {
        let fx = Fixture::new();
        let request = fx.lifecycle.send(fx.id(ALICE), BOB).await.unwrap();
        fx.lifecycle.accept(fx.id(BOB), request.id).await.unwrap();

        let page = PageOptions::new(1, 10);
        let alice = fx.query.friends_list(fx.id(ALICE), page).await.unwrap();
        assert_eq!(alice.data.len(), 1);
        assert_eq!(alice.data[0].recipient.as_ref().unwrap().username, BOB);
        assert!(alice.data[0].requester.is_none());

        let bob = fx.query.friends_list(fx.id(BOB), page).await.unwrap();
        assert_eq!(bob.data.len(), 1);
        assert_eq!(bob.data[0].requester.as_ref().unwrap().username, ALICE);
        assert!(bob.data[0].recipient.is_none());

        for user in [ALICE, BOB] {
            assert!(fx.query.pending_sent(fx.id(user), page).await.unwrap().data.is_empty());
            assert!(fx.query.pending_received(fx.id(user), page).await.unwrap().data.is_empty());
        }
    }

    #[tokio::test]
    async fn cancelled_request_makes_no_friendship() {
        let fx = Fixture::new();
        let request = fx.lifecycle.send(fx.id(ALICE), BOB).await.unwrap();
        let cancelled = fx.lifecycle.cancel(fx.id(ALICE), request.id).await.unwrap();
        assert_eq!(cancelled.status, crate::modules::friend::schema::FriendRequestStatus::Cancelled);

        let page = PageOptions::new(1, 10);
        for user in [ALICE, BOB] {
            assert!(fx.query.friends_list(fx.id(user), page).await.unwrap().data.is_empty());
            assert!(fx.query.pending_sent(fx.id(user), page).await.unwrap().data.is_empty());
        }
    }

    #[tokio::test]
    async fn pending_sent_paginates_by_overfetching_one_row() {
        let fx = Fixture::new();
        for recipient in [BOB, CAROL, DAVE] {
            fx.lifecycle.send(fx.id(ALICE), recipient).await.unwrap();
        }

        let first = fx.query.pending_sent(fx.id(ALICE), PageOptions::new(1, 2)).await.unwrap();
        assert_eq!(first.data.len(), 2);
        assert!(first.has_next_page);
        assert!(!first.has_previous_page);

        let second = fx.query.pending_sent(fx.id(ALICE), PageOptions::new(2, 2)).await.unwrap();
        assert_eq!(second.data.len(), 1);
        assert!(!second.has_next_page);
        assert!(second.has_previous_page);

        let mut seen: Vec<Uuid> =
            first.data.iter().chain(second.data.iter()).map(|v| v.request.recipient_id).collect();
        seen.sort();
        let mut expected = vec![fx.id(BOB), fx.id(CAROL), fx.id(DAVE)];
        expected.sort();
        assert_eq!(seen, expected);
    }

    #[tokio::test]
    async fn friends_list_of_another_user_is_visible() {
        let fx = Fixture::new();
        let request = fx.lifecycle.send(fx.id(BOB), CAROL).await.unwrap();
        fx.lifecycle.accept(fx.id(CAROL), request.id).await.unwrap();

        let list = fx.query.friends_list_of(fx.id(CAROL), PageOptions::new(1, 10)).await.unwrap();
        assert_eq!(list.data.len(), 1);
        assert_eq!(list.data[0].counterpart().unwrap().username, BOB);
    }

    #[tokio::test]
    async fn directory_miss_leaves_counterpart_absent() {
        let fx = Fixture::new();
        let request = fx.lifecycle.send(fx.id(ALICE), BOB).await.unwrap();
        fx.lifecycle.accept(fx.id(BOB), request.id).await.unwrap();
        fx.users.remove(BOB).await;

        let alice = fx.query.friends_list(fx.id(ALICE), PageOptions::new(1, 10)).await.unwrap();
        assert_eq!(alice.data.len(), 1);
        assert_eq!(alice.data[0].request.id, request.id);
        assert!(alice.data[0].counterpart().is_none());
    }

    #[tokio::test]
    async fn view_serializes_flat_with_camel_case_fields() {
        let fx = Fixture::new();
        fx.lifecycle.send(fx.id(ALICE), BOB).await.unwrap();
        let sent = fx.query.pending_sent(fx.id(ALICE), PageOptions::new(1, 10)).await.unwrap();

        let json = serde_json::to_value(&sent).unwrap();
        let view = &json["data"][0];
        assert_eq!(view["status"], "pending");
        assert_eq!(view["requesterId"], fx.id(ALICE).to_string());
        assert_eq!(view["recipient"]["username"], BOB);
        assert!(view.get("requester").is_none());
        for field in ["id", "statusChangedAt", "createdAt", "updatedAt"] {
            assert!(view.get(field).is_some(), "missing {field}");
        }
        assert_eq!(json["hasNextPage"], false);
    }
}
