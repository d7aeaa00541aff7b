use log::{info, warn};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    api::error,
    configs::RedisCache,
    modules::user::{model::UserSummary, repository::UserRepository},
    utils::pagination::{PageOptions, Paged},
};

/// Read-through Redis cache for id lookups, which dominate friend list
/// population. Username lookups and searches always hit the inner directory.
#[derive(Clone)]
pub struct CachedUserDirectory {
    inner: Arc<dyn UserRepository>,
    cache: Arc<RedisCache>,
    ttl: u64,
}

impl CachedUserDirectory {
    pub fn with_dependencies(inner: Arc<dyn UserRepository>, cache: Arc<RedisCache>, ttl: u64) -> Self {
        info!("CachedUserDirectory initialized with a {ttl}s ttl");
        CachedUserDirectory { inner, cache, ttl }
    }

    fn key(id: &Uuid) -> String {
        format!("user:summary:{id}")
    }
}

#[async_trait::async_trait]
impl UserRepository for CachedUserDirectory {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<UserSummary>, error::SystemError> {
        let key = Self::key(id);
        match self.cache.get::<UserSummary>(&key).await {
            Ok(Some(user)) => return Ok(Some(user)),
            Ok(None) => {}
            Err(e) => warn!("User cache read failed for {id}: {e}"),
        }

        let user = self.inner.find_by_id(id).await?;
        if let Some(user) = &user {
            if let Err(e) = self.cache.set(&key, user, self.ttl).await {
                warn!("User cache write failed for {id}: {e}");
            }
        }
        Ok(user)
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserSummary>, error::SystemError> {
        self.inner.find_by_username(username).await
    }

    async fn search_users(
        &self,
        query: &str,
        page: PageOptions,
    ) -> Result<Paged<UserSummary>, error::SystemError> {
        self.inner.search_users(query, page).await
    }
}
