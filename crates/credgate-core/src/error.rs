//! Error types for the core library.

use thiserror::Error;

use crate::user::{Field, InputError};

/// Errors that can occur in core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The store could not be reached.
    #[error("Database connection failed: {0}")]
    Connection(#[source] sqlx::Error),

    /// Any other store failure.
    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),

    /// A unique field is already registered.
    #[error("{} already exists", duplicate_label(*.0))]
    DuplicateField(Field),

    /// No stored record matched the supplied credentials.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Caller input was rejected before reaching the store.
    #[error("Malformed input: {}", join_input_errors(.0))]
    MalformedInput(Vec<InputError>),

    /// Password hashing failed.
    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    /// A blocking hash task did not complete.
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Configuration(_) => Self::Connection(err),
            other => Self::Database(other),
        }
    }
}

impl Error {
    /// Whether the store rejected a write on a unique constraint.
    #[must_use]
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Self::Database(sqlx::Error::Database(db)) => db.is_unique_violation(),
            _ => false,
        }
    }

    /// Whether the error means the store is unreachable.
    #[must_use]
    pub const fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }
}

/// Human-readable subject for a duplicate field.
const fn duplicate_label(field: Field) -> &'static str {
    match field {
        Field::Email => "Email",
        Field::Phone => "Phone number",
        Field::Role => "Role",
        Field::Password => "Password",
        Field::Username => "Username",
    }
}

fn join_input_errors(errors: &[InputError]) -> String {
    errors
        .iter()
        .map(InputError::message)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
