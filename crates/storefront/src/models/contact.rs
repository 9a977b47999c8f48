//! Contact form messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use kicks_core::{ContactMessageId, Email};

/// A validated contact form submission.
#[derive(Debug, Clone)]
pub struct NewContactMessage {
    pub name: String,
    pub email: Email,
    pub subject: Option<String>,
    pub message: String,
}

/// A stored contact message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    pub id: ContactMessageId,
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    pub message: String,
    pub created_at: DateTime<Utc>,
}
