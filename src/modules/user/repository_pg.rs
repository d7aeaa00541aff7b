use uuid::Uuid;

use crate::{
    api::error,
    modules::user::{model::UserSummary, repository::UserRepository, schema::UserEntity},
    utils::pagination::{PageOptions, Paged},
};

#[derive(Clone)]
pub struct UserRepositoryPg {
    pool: sqlx::PgPool,
}

impl UserRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl UserRepository for UserRepositoryPg {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<UserSummary>, error::SystemError> {
        let user = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT id, username, display_name, avatar_url
            FROM users
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user.map(UserSummary::from))
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserSummary>, error::SystemError> {
        let user = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT id, username, display_name, avatar_url
            FROM users
            WHERE lower(username) = lower($1) AND deleted_at IS NULL
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user.map(UserSummary::from))
    }

    async fn search_users(
        &self,
        query: &str,
        page: PageOptions,
    ) -> Result<Paged<UserSummary>, error::SystemError> {
        let search_pattern = like_pattern(query);
        let users = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT id, username, display_name, avatar_url
            FROM users
            WHERE deleted_at IS NULL
            AND (
                lower(username) LIKE lower($1)
                OR lower(display_name) LIKE lower($1)
            )
            ORDER BY display_name, id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(&search_pattern)
        .bind(page.fetch_limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(Paged::from_overfetch(users, page).map(UserSummary::from))
    }
}

/// `%term%` with LIKE metacharacters escaped; backslash first so the
/// escapes added for `%` and `_` are not doubled.
fn like_pattern(term: &str) -> String {
    let escaped = term.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
    format!("%{escaped}%")
}
