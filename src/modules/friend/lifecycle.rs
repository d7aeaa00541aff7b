use std::sync::Arc;

use uuid::Uuid;

use crate::{
    api::error,
    modules::{
        friend::{
            repository::FriendRequestStore,
            schema::{FriendRequestEntity, FriendRequestStatus},
        },
        user::repository::UserRepository,
    },
};

const DUPLICATE_REQUEST: &str = "Friend request already exists between these users";

/// What `send` does when the pair already has a request that ended in
/// `rejected` or `cancelled`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResendPolicy {
    /// Any earlier request blocks a new one, whatever its status.
    #[default]
    Never,
    /// A rejected or cancelled request is deleted and replaced by a fresh
    /// pending one. Pending and accepted requests still conflict.
    AfterClosed,
}

impl std::str::FromStr for ResendPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "never" => Ok(ResendPolicy::Never),
            "after_closed" | "after-closed" => Ok(ResendPolicy::AfterClosed),
            other => Err(format!("unknown resend policy `{other}`")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FriendsConfig {
    pub resend_policy: ResendPolicy,
}

/// Which party a transition must come from.
#[derive(Debug, Clone, Copy)]
enum Actor {
    Requester,
    Recipient,
}

#[derive(Clone)]
pub struct FriendRequestLifecycle {
    store: Arc<dyn FriendRequestStore>,
    users: Arc<dyn UserRepository>,
    config: FriendsConfig,
}

impl FriendRequestLifecycle {
    pub fn with_dependencies(
        store: Arc<dyn FriendRequestStore>,
        users: Arc<dyn UserRepository>,
        config: FriendsConfig,
    ) -> Self {
        FriendRequestLifecycle { store, users, config }
    }

    pub async fn send(
        &self,
        requester_id: Uuid,
        recipient_username: &str,
    ) -> Result<FriendRequestEntity, error::SystemError> {
        let recipient = self
            .users
            .find_by_username(recipient_username.trim())
            .await?
            .ok_or_else(|| error::SystemError::bad_request("User not found"))?;

        if recipient.id == requester_id {
            return Err(error::SystemError::bad_request("Cannot send friend request to yourself"));
        }

        let (forward, reverse) = tokio::try_join!(
            self.store.find_by_pair(&requester_id, &recipient.id),
            self.store.find_by_pair(&recipient.id, &requester_id),
        )?;

        let now = chrono::Utc::now();
        let created = match forward.or(reverse) {
            None => {
                self.store
                    .create(&requester_id, &recipient.id, FriendRequestStatus::Pending, now)
                    .await
            }
            Some(existing) => {
                self.ensure_supersedable(&existing)?;
                tracing::info!(
                    "Superseding {:?} friend request {} with a new one",
                    existing.status,
                    existing.id
                );
                self.store
                    .supersede(
                        &existing.id,
                        &requester_id,
                        &recipient.id,
                        FriendRequestStatus::Pending,
                        now,
                    )
                    .await
            }
        };

        let request = created.map_err(|e| match e {
            // lost the insert race against the same pair
            error::SystemError::UniqueViolation(_) => error::SystemError::conflict(DUPLICATE_REQUEST),
            other => other,
        })?;

        tracing::info!(
            "Friend request {} sent from {} to {}",
            request.id,
            request.requester_id,
            request.recipient_id
        );
        Ok(request)
    }

    fn ensure_supersedable(
        &self,
        existing: &FriendRequestEntity,
    ) -> Result<(), error::SystemError> {
        match self.config.resend_policy {
            ResendPolicy::AfterClosed if existing.status.is_closed() => Ok(()),
            _ => Err(error::SystemError::conflict(DUPLICATE_REQUEST)),
        }
    }

    pub async fn cancel(
        &self,
        requester_id: Uuid,
        request_id: Uuid,
    ) -> Result<FriendRequestEntity, error::SystemError> {
        self.transition(Actor::Requester, requester_id, request_id, FriendRequestStatus::Cancelled)
            .await
    }

    pub async fn accept(
        &self,
        recipient_id: Uuid,
        request_id: Uuid,
    ) -> Result<FriendRequestEntity, error::SystemError> {
        self.transition(Actor::Recipient, recipient_id, request_id, FriendRequestStatus::Accepted)
            .await
    }

    pub async fn reject(
        &self,
        recipient_id: Uuid,
        request_id: Uuid,
    ) -> Result<FriendRequestEntity, error::SystemError> {
        self.transition(Actor::Recipient, recipient_id, request_id, FriendRequestStatus::Rejected)
            .await
    }

    async fn transition(
        &self,
        actor: Actor,
        actor_id: Uuid,
        request_id: Uuid,
        target: FriendRequestStatus,
    ) -> Result<FriendRequestEntity, error::SystemError> {
        let request = self
            .store
            .find_by_id(&request_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Friend request not found"))?;

        match actor {
            Actor::Requester if request.requester_id != actor_id => {
                return Err(error::SystemError::forbidden(
                    "You can only cancel your own friend requests",
                ));
            }
            Actor::Recipient if request.recipient_id != actor_id => {
                return Err(error::SystemError::forbidden(
                    "You can only respond to friend requests sent to you",
                ));
            }
            _ => {}
        }

        if request.status.is_terminal() {
            return Err(error::SystemError::bad_request(format!(
                "Only pending friend requests can be {}",
                verb(target)
            )));
        }

        let updated = self
            .store
            .update_status(&request_id, FriendRequestStatus::Pending, target)
            .await?
            .ok_or_else(|| {
                tracing::debug!("Friend request {request_id} changed before it could be {target:?}");
                error::SystemError::bad_request("Friend request is no longer pending")
            })?;

        tracing::info!("Friend request {} is now {:?}", updated.id, updated.status);
        Ok(updated)
    }
}

fn verb(target: FriendRequestStatus) -> &'static str {
    match target {
        FriendRequestStatus::Accepted => "accepted",
        FriendRequestStatus::Rejected => "rejected",
        FriendRequestStatus::Cancelled => "cancelled",
        FriendRequestStatus::Pending => "reopened",
    }
}
