use uuid::Uuid;

use crate::{
    api::error,
    modules::friend::{
        repository::FriendRequestStore,
        schema::{FriendRequestEntity, FriendRequestStatus},
    },
    utils::pagination::{PageOptions, Paged},
};

#[derive(Clone)]
pub struct FriendRequestRepositoryPg {
    pool: sqlx::PgPool,
}

impl FriendRequestRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl FriendRequestStore for FriendRequestRepositoryPg {
    async fn create(
        &self,
        requester_id: &Uuid,
        recipient_id: &Uuid,
        status: FriendRequestStatus,
        status_changed_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<FriendRequestEntity, error::SystemError> {
        let id = Uuid::new_v7(uuid::Timestamp::now(uuid::NoContext));

        // friend_requests_unique_pair turns a racing reverse insert into 23505
        let request = sqlx::query_as::<_, FriendRequestEntity>(
            r#"
            INSERT INTO friend_requests
                (id, requester_id, recipient_id, status, status_changed_at, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5, $5)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(requester_id)
        .bind(recipient_id)
        .bind(status)
        .bind(status_changed_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(request)
    }

    async fn find_by_id(
        &self,
        request_id: &Uuid,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError> {
        let request =
            sqlx::query_as::<_, FriendRequestEntity>("SELECT * FROM friend_requests WHERE id = $1")
                .bind(request_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(request)
    }

    async fn find_by_pair(
        &self,
        requester_id: &Uuid,
        recipient_id: &Uuid,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError> {
        let request = sqlx::query_as::<_, FriendRequestEntity>(
            "SELECT * FROM friend_requests WHERE requester_id = $1 AND recipient_id = $2",
        )
        .bind(requester_id)
        .bind(recipient_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    async fn find_pending_sent_by(
        &self,
        user_id: &Uuid,
        page: PageOptions,
    ) -> Result<Paged<FriendRequestEntity>, error::SystemError> {
        let rows = sqlx::query_as::<_, FriendRequestEntity>(
            r#"
            SELECT *
            FROM friend_requests
            WHERE requester_id = $1 AND status = 'pending'
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(page.fetch_limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(Paged::from_overfetch(rows, page))
    }

    async fn find_pending_received_by(
        &self,
        user_id: &Uuid,
        page: PageOptions,
    ) -> Result<Paged<FriendRequestEntity>, error::SystemError> {
        let rows = sqlx::query_as::<_, FriendRequestEntity>(
            r#"
            SELECT *
            FROM friend_requests
            WHERE recipient_id = $1 AND status = 'pending'
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(page.fetch_limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(Paged::from_overfetch(rows, page))
    }

    async fn find_accepted_involving(
        &self,
        user_id: &Uuid,
        page: PageOptions,
    ) -> Result<Paged<FriendRequestEntity>, error::SystemError> {
        let rows = sqlx::query_as::<_, FriendRequestEntity>(
            r#"
            SELECT *
            FROM friend_requests
            WHERE (requester_id = $1 OR recipient_id = $1)
              AND status = 'accepted'
            ORDER BY status_changed_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(page.fetch_limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(Paged::from_overfetch(rows, page))
    }

    async fn update_status(
        &self,
        request_id: &Uuid,
        expected: FriendRequestStatus,
        status: FriendRequestStatus,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError> {
        let updated = sqlx::query_as::<_, FriendRequestEntity>(
            r#"
            UPDATE friend_requests
            SET status = $3, status_changed_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING *
            "#,
        )
        .bind(request_id)
        .bind(expected)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?;

        if updated.is_some() {
            return Ok(updated);
        }

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM friend_requests WHERE id = $1)")
                .bind(request_id)
                .fetch_one(&self.pool)
                .await?;

        if exists {
            Ok(None)
        } else {
            Err(error::SystemError::not_found("Friend request not found"))
        }
    }

    async fn supersede(
        &self,
        old_request_id: &Uuid,
        requester_id: &Uuid,
        recipient_id: &Uuid,
        status: FriendRequestStatus,
        status_changed_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<FriendRequestEntity, error::SystemError> {
        let id = Uuid::new_v7(uuid::Timestamp::now(uuid::NoContext));
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM friend_requests WHERE id = $1")
            .bind(old_request_id)
            .execute(&mut *tx)
            .await?;

        let request = sqlx::query_as::<_, FriendRequestEntity>(
            r#"
            INSERT INTO friend_requests
                (id, requester_id, recipient_id, status, status_changed_at, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5, $5)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(requester_id)
        .bind(recipient_id)
        .bind(status)
        .bind(status_changed_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::debug!("Friend request {old_request_id} replaced by {}", request.id);

        Ok(request)
    }

    async fn delete(&self, request_id: &Uuid) -> Result<(), error::SystemError> {
        sqlx::query("DELETE FROM friend_requests WHERE id = $1")
            .bind(request_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
