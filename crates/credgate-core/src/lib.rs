//! # credgate-core
//!
//! Core logic for the `credgate` credential store gateway.
//!
//! This crate provides:
//! - User model and input validation
//! - Argon2id password hashing
//! - Structured, parameterized lookups with a case-insensitive fallback
//! - User storage over MySQL or `SQLite` (`sqlx`)
//! - The registration / validation gateway service

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod error;
pub mod service;
pub mod store;
pub mod user;

pub use error::{Error, Result};
pub use service::{CredentialGateway, Registered, StoreSnapshot};
pub use store::{Dialect, StoreConfig, TlsMode};
pub use user::{
    CredentialInput, Field, InputError, MatchPass, PasswordHasher, PublicUser, UserId,
    UserRepository, ValidatedUser,
};
