//! User model types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for a stored user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub i64);

impl UserId {
    /// Create a new user ID.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A caller-supplied user field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    /// Username.
    Username,
    /// Password.
    Password,
    /// Email address.
    Email,
    /// Phone number.
    Phone,
    /// Role label.
    Role,
}

impl Field {
    /// Field name as used in request bodies.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Username => "username",
            Self::Password => "password",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Role => "role",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user row as stored, including the password hash.
///
/// Never serialized; use [`PublicUser`] for anything leaving the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    /// Row identifier.
    pub id: UserId,
    /// Username, stored with its original casing.
    pub username: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    /// Email address, if registered with one.
    pub email: Option<String>,
    /// Phone number, if registered with one.
    pub phone: Option<String>,
    /// Role label, if registered with one.
    pub role: Option<String>,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    /// Strip the record down to its public fields.
    #[must_use]
    pub fn to_public(&self) -> PublicUser {
        PublicUser {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            role: self.role.clone(),
            created_at: self.created_at,
        }
    }
}

/// Public view of a user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicUser {
    /// Row identifier.
    pub id: UserId,
    /// Username as stored.
    pub username: String,
    /// Email address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Phone number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Role label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

/// Fields supplied by a caller for registration or validation.
///
/// Values arrive untrimmed and unvalidated; see
/// [`normalize_registration`](super::normalize_registration) and
/// [`normalize_credentials`](super::normalize_credentials).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CredentialInput {
    /// Username (required).
    #[serde(default)]
    pub username: Option<String>,
    /// Password (required).
    #[serde(default)]
    pub password: Option<String>,
    /// Email (optional).
    #[serde(default)]
    pub email: Option<String>,
    /// Phone (optional).
    #[serde(default)]
    pub phone: Option<String>,
    /// Role (optional).
    #[serde(default)]
    pub role: Option<String>,
}

impl CredentialInput {
    /// Create input with just a username and password.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            password: Some(password.into()),
            ..Default::default()
        }
    }

    /// Builder: set email.
    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Builder: set phone.
    #[must_use]
    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Builder: set role.
    #[must_use]
    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }
}

/// A validated registration request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    /// Trimmed, non-empty username.
    pub username: String,
    /// Non-empty password, exactly as supplied.
    pub password: String,
    /// Trimmed email, `None` if absent or blank.
    pub email: Option<String>,
    /// Trimmed phone, `None` if absent or blank.
    pub phone: Option<String>,
    /// Trimmed role, `None` if absent or blank.
    pub role: Option<String>,
}

/// A validated credential check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Trimmed, non-empty username.
    pub username: String,
    /// Non-empty password.
    pub password: String,
    /// Extra exact-match constraint.
    pub email: Option<String>,
    /// Extra exact-match constraint.
    pub phone: Option<String>,
    /// Extra exact-match constraint.
    pub role: Option<String>,
}

/// Which lookup pass produced a credential match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPass {
    /// Username matched with its exact casing.
    Exact,
    /// Username matched only after case folding.
    CaseInsensitive,
}

/// Successful credential validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidatedUser {
    /// The matched account.
    pub user: PublicUser,
    /// The pass that found it.
    pub matched_by: MatchPass,
}
