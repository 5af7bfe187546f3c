//! User accounts.
//!
//! Provides the user model, input validation, lookup filters, password
//! hashing and storage.

mod filter;
mod model;
mod password;
mod repository;
mod validation;

pub use filter::{CredentialFilter, UserQuery, UsernameMatch};
pub use model::{
    CredentialInput, Credentials, Field, MatchPass, NewUser, PublicUser, UserId, UserRecord,
    ValidatedUser,
};
pub use password::PasswordHasher;
pub use repository::{ColumnInfo, UserRepository, UserSession};
pub use validation::{
    InputError, InputResult, MAX_EMAIL_LEN, MAX_PHONE_LEN, MAX_ROLE_LEN, MAX_USERNAME_LEN,
    normalize_credentials, normalize_registration,
};
