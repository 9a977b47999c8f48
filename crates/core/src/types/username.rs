//! Login name type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Username`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum UsernameError {
    #[error("username must be between {min} and {max} characters")]
    Length { min: usize, max: usize },
    #[error("username may only contain letters, digits and underscores")]
    InvalidCharacter,
}

/// A validated login name.
///
/// 3-32 ASCII letters, digits or underscores. Comparison is case-sensitive;
/// uniqueness is enforced case-insensitively by the database.
///
/// ```
/// use kicks_core::Username;
///
/// assert!(Username::parse("sneaker_head").is_ok());
/// assert!(Username::parse("ab").is_err());
/// assert!(Username::parse("no spaces").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    pub const MIN_LENGTH: usize = 3;
    pub const MAX_LENGTH: usize = 32;

    /// Parse a `Username`, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the length is out of range or a character is not
    /// `[A-Za-z0-9_]`.
    pub fn parse(s: &str) -> Result<Self, UsernameError> {
        let s = s.trim();
        if !(Self::MIN_LENGTH..=Self::MAX_LENGTH).contains(&s.len()) {
            return Err(UsernameError::Length {
                min: Self::MIN_LENGTH,
                max: Self::MAX_LENGTH,
            });
        }
        if !s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(UsernameError::InvalidCharacter);
        }
        Ok(Self(s.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Username {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Username {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Username {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_usernames() {
        assert_eq!(Username::parse("abc").unwrap().as_str(), "abc");
        assert_eq!(Username::parse("  Air_Max_90 ").unwrap().as_str(), "Air_Max_90");
        assert!(Username::parse(&"a".repeat(32)).is_ok());
    }

    #[test]
    fn test_length_bounds() {
        assert!(matches!(
            Username::parse("ab"),
            Err(UsernameError::Length { min: 3, max: 32 })
        ));
        assert!(Username::parse(&"a".repeat(33)).is_err());
        assert!(Username::parse("   ").is_err());
    }

    #[test]
    fn test_invalid_characters() {
        assert_eq!(
            Username::parse("jordan-1"),
            Err(UsernameError::InvalidCharacter)
        );
        assert_eq!(
            Username::parse("ผู้ใช้งาน"),
            Err(UsernameError::InvalidCharacter)
        );
    }
}
