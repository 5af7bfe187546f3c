//! Input normalization and validation.
//!
//! Runs before any store access. Required fields must be non-empty,
//! optional fields are trimmed and dropped when blank, and every field
//! must fit its column.

use super::model::{CredentialInput, Credentials, Field, NewUser};

/// Longest accepted username, in characters.
pub const MAX_USERNAME_LEN: usize = 255;
/// Longest accepted email, in characters.
pub const MAX_EMAIL_LEN: usize = 255;
/// Longest accepted phone number, in characters.
pub const MAX_PHONE_LEN: usize = 32;
/// Longest accepted role, in characters.
pub const MAX_ROLE_LEN: usize = 64;

/// A rejected input field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputError {
    /// A required field is missing or blank.
    Missing(Field),
    /// A field is longer than its column allows.
    TooLong(Field),
}

impl InputError {
    /// Get human-readable error message.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::Missing(Field::Username) => "Username is required",
            Self::Missing(Field::Password) => "Password is required",
            Self::Missing(_) => "Field is required",
            Self::TooLong(Field::Username) => "Username must be at most 255 characters",
            Self::TooLong(Field::Email) => "Email must be at most 255 characters",
            Self::TooLong(Field::Phone) => "Phone number must be at most 32 characters",
            Self::TooLong(Field::Role) => "Role must be at most 64 characters",
            Self::TooLong(Field::Password) => "Password is too long",
        }
    }

    /// Get the field this error relates to.
    #[must_use]
    pub const fn field(&self) -> Field {
        match self {
            Self::Missing(field) | Self::TooLong(field) => *field,
        }
    }
}

impl std::fmt::Display for InputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for InputError {}

/// Result of normalizing caller input.
pub type InputResult<T> = Result<T, Vec<InputError>>;

/// Validate and normalize a registration request.
///
/// # Errors
///
/// Returns every rejected field: missing username/password, or any
/// field exceeding its column width.
pub fn normalize_registration(input: &CredentialInput) -> InputResult<NewUser> {
    let mut errors = Vec::new();

    let username = required_trimmed(input.username.as_deref(), Field::Username, &mut errors);
    let password = required_raw(input.password.as_deref(), Field::Password, &mut errors);
    let email = optional(input.email.as_deref());
    let phone = optional(input.phone.as_deref());
    let role = optional(input.role.as_deref());

    check_len(username.as_deref(), MAX_USERNAME_LEN, Field::Username, &mut errors);
    check_len(email.as_deref(), MAX_EMAIL_LEN, Field::Email, &mut errors);
    check_len(phone.as_deref(), MAX_PHONE_LEN, Field::Phone, &mut errors);
    check_len(role.as_deref(), MAX_ROLE_LEN, Field::Role, &mut errors);

    match (username, password) {
        (Some(username), Some(password)) if errors.is_empty() => Ok(NewUser {
            username,
            password,
            email,
            phone,
            role,
        }),
        _ => Err(errors),
    }
}

/// Validate and normalize a credential check.
///
/// Lengths are not enforced here: an oversized value simply matches
/// nothing.
///
/// # Errors
///
/// Returns the missing required fields.
pub fn normalize_credentials(input: &CredentialInput) -> InputResult<Credentials> {
    let mut errors = Vec::new();

    let username = required_trimmed(input.username.as_deref(), Field::Username, &mut errors);
    let password = required_raw(input.password.as_deref(), Field::Password, &mut errors);

    match (username, password) {
        (Some(username), Some(password)) => Ok(Credentials {
            username,
            password,
            email: optional(input.email.as_deref()),
            phone: optional(input.phone.as_deref()),
            role: optional(input.role.as_deref()),
        }),
        _ => Err(errors),
    }
}

fn required_trimmed(
    value: Option<&str>,
    field: Field,
    errors: &mut Vec<InputError>,
) -> Option<String> {
    let value = optional(value);
    if value.is_none() {
        errors.push(InputError::Missing(field));
    }
    value
}

// Passwords keep surrounding whitespace; only the empty string is rejected.
fn required_raw(value: Option<&str>, field: Field, errors: &mut Vec<InputError>) -> Option<String> {
    match value {
        Some(v) if !v.is_empty() => Some(v.to_string()),
        _ => {
            errors.push(InputError::Missing(field));
            None
        }
    }
}

fn optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}

fn check_len(value: Option<&str>, max: usize, field: Field, errors: &mut Vec<InputError>) {
    if value.is_some_and(|v| v.chars().count() > max) {
        errors.push(InputError::TooLong(field));
    }
}
