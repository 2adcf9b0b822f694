//! Authenticated account credentials used for uploads.

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use super::identifier::Email;

/// OAuth access token for the Gravatar REST API, masked when printed.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct AccessToken {
    value: String,
}

impl AccessToken {
    /// Creates a token, trimming surrounding whitespace.
    ///
    /// Returns `None` for an empty token.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into().trim().to_string();
        if value.is_empty() {
            return None;
        }
        Some(Self { value })
    }

    /// Returns the token as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Returns the value of an `Authorization` header carrying this token.
    #[must_use]
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.value)
    }

    /// Returns masked token for display.
    #[must_use]
    pub fn masked(&self) -> String {
        let chars = self.value.chars().count();
        if chars <= 10 {
            return "*".repeat(chars);
        }

        let visible_prefix: String = self.value.chars().take(4).collect();
        let visible_suffix: String = self.value.chars().skip(chars - 4).collect();
        format!("{visible_prefix}...{visible_suffix}")
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &self.masked())
            .finish()
    }
}

impl fmt::Display for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.masked())
    }
}

/// The account an upload is attributed to.
#[derive(Debug, Clone)]
pub struct AccountIdentifier {
    email: Email,
    access_token: AccessToken,
}

impl AccountIdentifier {
    /// Creates an account identifier.
    #[must_use]
    pub fn new(email: Email, access_token: AccessToken) -> Self {
        Self {
            email,
            access_token,
        }
    }

    /// Returns the account email.
    #[must_use]
    pub const fn email(&self) -> &Email {
        &self.email
    }

    /// Returns the access token.
    #[must_use]
    pub const fn access_token(&self) -> &AccessToken {
        &self.access_token
    }
}
