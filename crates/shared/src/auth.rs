//! Credential and identity types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The verified owner of document operations.
///
/// Wraps the subject key resolved from a bearer credential (the user's
/// email). Every repository query and object-store key is scoped by this
/// value; it is never taken from request payloads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    /// Creates an identity from a verified subject key.
    #[must_use]
    pub fn new(email: impl Into<String>) -> Self {
        Self(email.into())
    }

    /// Returns the subject email.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// JWT claims for access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user email).
    pub sub: String,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates new claims for a subject.
    #[must_use]
    pub fn new(email: &str, expires_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            sub: email.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the subject email from the claims.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.sub
    }

    /// Returns the subject as an [`Identity`].
    #[must_use]
    pub fn identity(&self) -> Identity {
        Identity::new(self.sub.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_carry_subject() {
        let expires = Utc::now() + chrono::Duration::hours(1);
        let claims = Claims::new("ada@example.com", expires);

        assert_eq!(claims.email(), "ada@example.com");
        assert_eq!(claims.identity(), Identity::new("ada@example.com"));
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_identity_display() {
        let identity = Identity::new("ada@example.com");
        assert_eq!(identity.to_string(), "ada@example.com");
        assert_eq!(identity.email(), "ada@example.com");
    }
}
