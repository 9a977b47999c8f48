//! Contact form storage.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use kicks_core::ContactMessageId;

use super::RepositoryError;
use crate::models::{ContactMessage, NewContactMessage};

#[derive(Debug, sqlx::FromRow)]
struct ContactMessageRow {
    id: ContactMessageId,
    name: String,
    email: String,
    subject: Option<String>,
    message: String,
    created_at: DateTime<Utc>,
}

/// Repository for contact messages.
pub struct ContactRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ContactRepository<'a> {
    /// Create a new contact repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Store a contact message.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        message: &NewContactMessage,
    ) -> Result<ContactMessage, RepositoryError> {
        let row = sqlx::query_as::<_, ContactMessageRow>(
            r"
            INSERT INTO storefront.contact_messages (name, email, subject, message)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, subject, message, created_at
            ",
        )
        .bind(&message.name)
        .bind(message.email.as_str())
        .bind(message.subject.as_deref())
        .bind(&message.message)
        .fetch_one(self.pool)
        .await?;

        Ok(ContactMessage {
            id: row.id,
            name: row.name,
            email: row.email,
            subject: row.subject,
            message: row.message,
            created_at: row.created_at,
        })
    }
}
