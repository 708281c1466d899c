//! Owner identity as handed over by the identity resolver.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

const MAX_OWNER_ID_CHARS: usize = 128;

/// Opaque owner id. Every read and write is filtered by one of these.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    /// Wraps an externally resolved owner id after trimming it.
    pub fn new(value: impl Into<String>) -> Result<Self, InvalidOwnerId> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(InvalidOwnerId::Blank);
        }
        if trimmed.chars().count() > MAX_OWNER_ID_CHARS {
            return Err(InvalidOwnerId::TooLong);
        }
        if trimmed.chars().any(char::is_control) {
            return Err(InvalidOwnerId::ControlCharacter);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for OwnerId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Rejected owner id shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidOwnerId {
    Blank,
    TooLong,
    ControlCharacter,
}

impl Display for InvalidOwnerId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blank => write!(f, "owner id must not be blank"),
            Self::TooLong => write!(f, "owner id exceeds {MAX_OWNER_ID_CHARS} characters"),
            Self::ControlCharacter => write!(f, "owner id must not contain control characters"),
        }
    }
}

impl Error for InvalidOwnerId {}

#[cfg(test)]
mod tests {
    use super::{InvalidOwnerId, OwnerId};

    #[test]
    fn owner_id_is_trimmed() {
        let owner = OwnerId::new("  user-1 ").unwrap();
        assert_eq!(owner.as_str(), "user-1");
    }

    #[test]
    fn owner_id_rejects_blank_and_control_chars() {
        assert_eq!(OwnerId::new("   ").unwrap_err(), InvalidOwnerId::Blank);
        assert_eq!(
            OwnerId::new("a\u{0007}b").unwrap_err(),
            InvalidOwnerId::ControlCharacter
        );
    }
}
