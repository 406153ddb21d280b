use std::borrow::Borrow;
use std::fmt;

/// The GraphQL name syntax, `[_A-Za-z][_0-9A-Za-z]*`.
///
/// This is the single source of truth for identifier validity: the grammar's
/// `Name` production and every field/argument/fragment name check elsewhere
/// go through it.
pub const NAME_PATTERN: &str = "[_A-Za-z][_0-9A-Za-z]*";

/// A GraphQL identifier, guaranteed to be in valid name syntax.
#[derive(Clone, Ord, Eq, PartialOrd, PartialEq, Hash)]
pub struct Name(String);

/// Tried to create a [`Name`] from a string that is not in valid GraphQL
/// name syntax.
#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
#[error("`{0}` is not a valid GraphQL name")]
pub struct InvalidNameError(pub String);

impl Name {
    pub fn new(value: &str) -> Result<Self, InvalidNameError> {
        if Self::valid_syntax(value) {
            Ok(Self(value.to_owned()))
        } else {
            Err(InvalidNameError(value.to_owned()))
        }
    }

    /// Create a `Name` without checking syntax. Reserved for callers that
    /// have already established validity, such as the grammar's `Name`
    /// production.
    pub fn new_unchecked(value: String) -> Self {
        debug_assert!(Self::valid_syntax(&value));
        Self(value)
    }

    /// Returns whether the given string is a valid GraphQL name.
    pub fn valid_syntax(value: &str) -> bool {
        let bytes = value.as_bytes();
        let Some(&first) = bytes.first() else {
            return false;
        };
        if !(first.is_ascii_alphabetic() || first == b'_') {
            return false;
        }
        bytes[1..]
            .iter()
            .all(|b| b.is_ascii_alphanumeric() || *b == b'_')
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::ops::Deref for Name {
    type Target = str;

    fn deref(&self) -> &str {
        self.as_str()
    }
}

impl AsRef<str> for Name {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Borrow<str> for Name {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_str().fmt(f)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_str().fmt(f)
    }
}

impl PartialEq<str> for Name {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&'_ str> for Name {
    fn eq(&self, other: &&'_ str) -> bool {
        self.as_str() == *other
    }
}

impl TryFrom<&str> for Name {
    type Error = InvalidNameError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<String> for Name {
    type Error = InvalidNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if Self::valid_syntax(&value) {
            Ok(Self(value))
        } else {
            Err(InvalidNameError(value))
        }
    }
}

impl From<Name> for String {
    fn from(name: Name) -> String {
        name.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_names() {
        for name in ["a", "_", "_0", "hero", "Query", "__typename", "fieldA1"] {
            assert!(Name::valid_syntax(name), "{name} should be valid");
        }
    }

    #[test]
    fn invalid_names() {
        for name in ["", "1a", "a-b", "é", "hero name", "$var", "a.b"] {
            assert!(!Name::valid_syntax(name), "{name} should be invalid");
            assert!(Name::new(name).is_err());
        }
    }
}
