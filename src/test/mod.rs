//! Shared fixtures: an in-memory user directory seeded with a few accounts
//! and the friends stack wired on top of the in-memory store.

use std::{
    collections::HashMap,
    sync::{Arc, Once},
};

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    api::error,
    constants::Env,
    modules::{
        friend::{
            lifecycle::{FriendRequestLifecycle, FriendsConfig},
            query::FriendRelationshipQuery,
            repository_memory::FriendRequestRepositoryMemory,
            service::FriendService,
        },
        user::{model::UserSummary, repository::UserRepository},
    },
    utils::pagination::{PageOptions, Paged},
};

pub const ALICE: &str = "alice";
pub const BOB: &str = "bob";
pub const CAROL: &str = "carol";
pub const DAVE: &str = "dave";

static ENV_DEFAULTS: Once = Once::new();

/// The process `ENV`, with the variables it requires filled in when the
/// test run does not provide them.
pub fn test_env() -> &'static Env {
    ENV_DEFAULTS.call_once(|| {
        for (key, value) in [
            ("SECRET_KEY", "friends-test-secret"),
            ("DATABASE_URL", "postgres://localhost/friends_test"),
        ] {
            if std::env::var_os(key).is_none() {
                std::env::set_var(key, value);
            }
        }
    });
    &crate::ENV
}

#[derive(Default)]
pub struct InMemoryUserDirectory {
    users: RwLock<Vec<UserSummary>>,
}

impl InMemoryUserDirectory {
    pub fn seeded(usernames: &[&str]) -> Self {
        let users = usernames
            .iter()
            .map(|username| UserSummary {
                id: Uuid::new_v7(uuid::Timestamp::now(uuid::NoContext)),
                username: username.to_string(),
                display_name: format!("{} Example", capitalize(username)),
                avatar_url: None,
            })
            .collect();
        InMemoryUserDirectory { users: RwLock::new(users) }
    }

    pub async fn remove(&self, username: &str) {
        self.users.write().await.retain(|u| u.username != username);
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[async_trait::async_trait]
impl UserRepository for InMemoryUserDirectory {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<UserSummary>, error::SystemError> {
        Ok(self.users.read().await.iter().find(|u| u.id == *id).cloned())
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserSummary>, error::SystemError> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|u| u.username.eq_ignore_ascii_case(username))
            .cloned())
    }

    async fn search_users(
        &self,
        query: &str,
        page: PageOptions,
    ) -> Result<Paged<UserSummary>, error::SystemError> {
        let needle = query.to_lowercase();
        let mut matches: Vec<UserSummary> = self
            .users
            .read()
            .await
            .iter()
            .filter(|u| {
                u.username.to_lowercase().contains(&needle)
                    || u.display_name.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.display_name.cmp(&b.display_name));

        let rows = matches
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.fetch_limit() as usize)
            .collect();
        Ok(Paged::from_overfetch(rows, page))
    }
}

pub struct Fixture {
    pub users: Arc<InMemoryUserDirectory>,
    pub store: Arc<FriendRequestRepositoryMemory>,
    pub lifecycle: FriendRequestLifecycle,
    pub query: FriendRelationshipQuery,
    pub service: FriendService,
    ids: HashMap<String, Uuid>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_config(FriendsConfig::default())
    }

    pub fn with_config(config: FriendsConfig) -> Self {
        let users = Arc::new(InMemoryUserDirectory::seeded(&[ALICE, BOB, CAROL, DAVE]));
        let ids = users
            .users
            .try_read()
            .map(|all| all.iter().map(|u| (u.username.clone(), u.id)).collect())
            .unwrap_or_default();
        let store = Arc::new(FriendRequestRepositoryMemory::new());

        let lifecycle =
            FriendRequestLifecycle::with_dependencies(store.clone(), users.clone(), config);
        let query = FriendRelationshipQuery::with_dependencies(store.clone(), users.clone());
        let service = FriendService::with_dependencies(
            lifecycle.clone(),
            query.clone(),
            store.clone(),
            users.clone(),
        );

        Fixture { users, store, lifecycle, query, service, ids }
    }

    pub fn id(&self, username: &str) -> Uuid {
        self.ids[username]
    }
}
