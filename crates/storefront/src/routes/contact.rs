//! Contact form handler.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use kicks_core::Email;

use super::{ApiJson, Success, success};
use crate::db::ContactRepository;
use crate::error::{AppError, Result};
use crate::models::{ContactMessage, NewContactMessage};
use crate::state::AppState;

/// Longest accepted message body.
const MAX_MESSAGE_LENGTH: usize = 5000;

/// Contact form data.
#[derive(Debug, Deserialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub subject: Option<String>,
    pub message: String,
}

impl ContactForm {
    fn validate(self) -> Result<NewContactMessage> {
        let email = Email::parse(&self.email)
            .map_err(|_| AppError::BadRequest("Please enter a valid email address.".to_owned()))?;

        let name = self.name.trim();
        let message = self.message.trim();
        if name.is_empty() || message.is_empty() {
            return Err(AppError::BadRequest(
                "Please fill in all required fields.".to_owned(),
            ));
        }
        if message.chars().count() > MAX_MESSAGE_LENGTH {
            return Err(AppError::BadRequest(format!(
                "Message must be at most {MAX_MESSAGE_LENGTH} characters."
            )));
        }

        Ok(NewContactMessage {
            name: name.to_owned(),
            email,
            subject: self
                .subject
                .map(|s| s.trim().to_owned())
                .filter(|s| !s.is_empty()),
            message: message.to_owned(),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub message: ContactMessage,
}

/// Store a contact message.
///
/// POST /api/contact
#[instrument(skip(state, form))]
pub async fn submit(
    State(state): State<AppState>,
    ApiJson(form): ApiJson<ContactForm>,
) -> Result<(StatusCode, Json<Success<ContactResponse>>)> {
    let new_message = form.validate()?;
    let message = ContactRepository::new(state.pool())
        .create(&new_message)
        .await?;
    info!(contact_id = %message.id, "Contact message stored");
    Ok((StatusCode::CREATED, success(ContactResponse { message })))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form(name: &str, email: &str, message: &str) -> ContactForm {
        ContactForm {
            name: name.to_owned(),
            email: email.to_owned(),
            subject: Some("  ".to_owned()),
            message: message.to_owned(),
        }
    }

    #[test]
    fn test_valid_form_is_trimmed() {
        let message = form(" Nok ", "nok@Mail.com", " Do you restock size 45? ")
            .validate()
            .unwrap();
        assert_eq!(message.name, "Nok");
        assert_eq!(message.email.as_str(), "nok@mail.com");
        assert_eq!(message.subject, None);
        assert_eq!(message.message, "Do you restock size 45?");
    }

    #[test]
    fn test_rejects_bad_email_and_blank_fields() {
        assert!(form("Nok", "nope", "hi").validate().is_err());
        assert!(form(" ", "nok@mail.com", "hi").validate().is_err());
        assert!(form("Nok", "nok@mail.com", "   ").validate().is_err());
    }

    #[test]
    fn test_rejects_long_message() {
        let long = "x".repeat(MAX_MESSAGE_LENGTH + 1);
        assert!(form("Nok", "nok@mail.com", &long).validate().is_err());
    }
}
