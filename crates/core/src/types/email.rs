//! Email address type.
//!
//! Emails are optional on accounts but required on contact messages.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`Email`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    #[error("email cannot be empty")]
    Empty,
    #[error("email must be at most {max} characters")]
    TooLong { max: usize },
    #[error("email must look like name@domain")]
    Malformed,
}

/// A contact email address.
///
/// Validation is structural only: one `@` with text on both sides, no
/// whitespace, at most 254 characters. Surrounding whitespace is dropped and
/// the domain is lowercased, so `" Somchai@Example.CO.TH"` and
/// `"Somchai@example.co.th"` are the same address.
///
/// Deserialization validates, so a request body cannot smuggle in an invalid
/// address.
///
/// ```
/// use kicks_core::Email;
///
/// let email = Email::parse(" Somchai@Example.CO.TH ").unwrap();
/// assert_eq!(email.as_str(), "Somchai@example.co.th");
/// assert!(Email::parse("no-at-symbol").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Maximum length of an email address (RFC 5321).
    pub const MAX_LENGTH: usize = 254;

    /// Parse and normalise an address.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is blank, too long, or not of the form
    /// `local@domain`.
    pub fn parse(s: &str) -> Result<Self, EmailError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(EmailError::Empty);
        }
        if s.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        let (local, domain) = s.split_once('@').ok_or(EmailError::Malformed)?;
        if local.is_empty()
            || domain.is_empty()
            || domain.contains('@')
            || s.chars().any(char::is_whitespace)
        {
            return Err(EmailError::Malformed);
        }

        Ok(Self(format!("{local}@{}", domain.to_ascii_lowercase())))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The part after the `@`.
    #[must_use]
    pub fn domain(&self) -> &str {
        self.0.split_once('@').map_or("", |(_, domain)| domain)
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Email {
    type Error = EmailError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_common_shapes() {
        for ok in [
            "user@example.com",
            "user.name+tag@example.co.th",
            "a@b.c",
        ] {
            assert!(Email::parse(ok).is_ok(), "{ok}");
        }
    }

    #[test]
    fn test_rejects_malformed() {
        assert_eq!(Email::parse("   "), Err(EmailError::Empty));
        for bad in ["no-at-symbol", "@example.com", "user@", "a@b@c", "us er@example.com"] {
            assert_eq!(Email::parse(bad), Err(EmailError::Malformed), "{bad}");
        }
    }

    #[test]
    fn test_rejects_too_long() {
        let long = format!("{}@example.com", "a".repeat(250));
        assert!(matches!(Email::parse(&long), Err(EmailError::TooLong { .. })));
    }

    #[test]
    fn test_normalises_domain_only() {
        let email = Email::parse("  Somchai@Example.CO.TH ").unwrap();
        assert_eq!(email.as_str(), "Somchai@example.co.th");
        assert_eq!(email.domain(), "example.co.th");
    }

    #[test]
    fn test_deserialize_validates() {
        let email: Email = serde_json::from_str("\"Nok@Mail.com\"").unwrap();
        assert_eq!(email.to_string(), "Nok@mail.com");
        assert!(serde_json::from_str::<Email>("\"not-an-email\"").is_err());
    }
}
