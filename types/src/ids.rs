use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque name of an enrollable slot (e.g. a specific finger).
///
/// Labels come from configuration and end up on screen, so construction
/// rejects blank labels and anything carrying control characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identifier(String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidIdentifier {
    #[error("identifier must not be empty")]
    Empty,
    #[error("identifier {label:?} contains control characters")]
    ControlCharacter { label: String },
}

impl Identifier {
    pub fn new(label: impl Into<String>) -> Result<Self, InvalidIdentifier> {
        let label = label.into();
        let trimmed = label.trim();
        if trimmed.is_empty() {
            return Err(InvalidIdentifier::Empty);
        }
        if trimmed.chars().any(char::is_control) {
            return Err(InvalidIdentifier::ControlCharacter { label });
        }
        Ok(Self(trimmed.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Identifier {
    type Error = InvalidIdentifier;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Identifier> for String {
    fn from(value: Identifier) -> Self {
        value.0
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::{Identifier, InvalidIdentifier};

    #[test]
    fn trims_surrounding_whitespace() {
        let id = Identifier::new("  Right index ").unwrap();
        assert_eq!(id.as_str(), "Right index");
    }

    #[test]
    fn rejects_blank_labels() {
        assert_eq!(Identifier::new("   "), Err(InvalidIdentifier::Empty));
        assert_eq!(Identifier::new(""), Err(InvalidIdentifier::Empty));
    }

    #[test]
    fn rejects_escape_sequences() {
        let err = Identifier::new("Left\x1b[2J index").unwrap_err();
        assert!(matches!(err, InvalidIdentifier::ControlCharacter { .. }));
    }

    #[test]
    fn equality_ignores_outer_whitespace() {
        assert_eq!(Identifier::new("R").unwrap(), Identifier::new(" R").unwrap());
        assert_ne!(Identifier::new("R").unwrap(), Identifier::new("L").unwrap());
    }

    #[test]
    fn deserialize_validates() {
        let ok: Identifier = serde_json::from_str("\"Right index\"").unwrap();
        assert_eq!(ok.as_str(), "Right index");
        assert!(serde_json::from_str::<Identifier>("\"\"").is_err());
    }
}
