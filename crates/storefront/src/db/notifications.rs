//! Notification inbox repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use kicks_core::{NotificationId, NotificationKind, UserId};

use super::RepositoryError;
use crate::models::Notification;

#[derive(Debug, sqlx::FromRow)]
struct NotificationRow {
    id: NotificationId,
    user_id: UserId,
    title: String,
    message: String,
    kind: NotificationKind,
    is_read: bool,
    created_at: DateTime<Utc>,
}

impl From<NotificationRow> for Notification {
    fn from(row: NotificationRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            message: row.message,
            kind: row.kind,
            is_read: row.is_read,
            created_at: row.created_at,
        }
    }
}

/// Repository for reading and marking notifications.
pub struct NotificationRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> NotificationRepository<'a> {
    /// Create a new notification repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// A user's notifications, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        user_id: UserId,
        unread_only: bool,
    ) -> Result<Vec<Notification>, RepositoryError> {
        let rows = sqlx::query_as::<_, NotificationRow>(
            r"
            SELECT id, user_id, title, message, kind, is_read, created_at
            FROM storefront.notifications
            WHERE user_id = $1 AND (NOT $2 OR NOT is_read)
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(user_id)
        .bind(unread_only)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Notification::from).collect())
    }

    /// Number of unread notifications for a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn unread_count(&self, user_id: UserId) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>(
            r"
            SELECT COUNT(*)
            FROM storefront.notifications
            WHERE user_id = $1 AND NOT is_read
            ",
        )
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;

        Ok(count)
    }

    /// Mark one notification read.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the notification does not exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn mark_read(&self, id: NotificationId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE storefront.notifications
            SET is_read = TRUE
            WHERE id = $1
            ",
        )
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Mark every notification of a user read. Returns how many changed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn mark_all_read(&self, user_id: UserId) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE storefront.notifications
            SET is_read = TRUE
            WHERE user_id = $1 AND NOT is_read
            ",
        )
        .bind(user_id)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
