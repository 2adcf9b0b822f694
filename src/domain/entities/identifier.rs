//! Gravatar account identifiers.

use std::fmt;

use sha2::{Digest, Sha256};

/// A Gravatar account email address.
///
/// The address is trimmed and lowercased on construction so that every
/// spelling of the same account hashes to the same identifier.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Email(String);

impl Email {
    /// Creates a normalized email.
    #[must_use]
    pub fn new(value: impl AsRef<str>) -> Self {
        Self(value.as_ref().trim().to_lowercase())
    }

    /// Returns the normalized address.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the normalized address is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the hashed identifier for this address.
    #[must_use]
    pub fn hash_id(&self) -> HashId {
        HashId::from(self)
    }
}

impl fmt::Debug for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Email").field(&self.0).finish()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Email {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Email {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Lowercase hex SHA-256 of a normalized email.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HashId(String);

impl HashId {
    /// Wraps an already-computed hash.
    #[must_use]
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    /// Returns the hash string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&Email> for HashId {
    fn from(email: &Email) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(email.as_str().as_bytes());
        Self(hex::encode(hasher.finalize()))
    }
}

impl fmt::Display for HashId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Anything that identifies a Gravatar avatar.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AvatarIdentifier {
    /// Identified by email; hashed before use.
    Email(Email),
    /// Identified by a precomputed hash.
    HashId(HashId),
}

impl AvatarIdentifier {
    /// Returns the string used as the avatar path segment.
    #[must_use]
    pub fn identifier(&self) -> String {
        match self {
            Self::Email(email) => email.hash_id().0,
            Self::HashId(hash) => hash.0.clone(),
        }
    }

    /// Returns true if there is nothing to identify.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Email(email) => email.is_empty(),
            Self::HashId(hash) => hash.0.trim().is_empty(),
        }
    }
}

impl From<Email> for AvatarIdentifier {
    fn from(email: Email) -> Self {
        Self::Email(email)
    }
}

impl From<HashId> for AvatarIdentifier {
    fn from(hash: HashId) -> Self {
        Self::HashId(hash)
    }
}

impl From<&str> for AvatarIdentifier {
    fn from(s: &str) -> Self {
        Self::Email(Email::new(s))
    }
}
