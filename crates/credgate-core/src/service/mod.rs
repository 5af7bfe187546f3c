//! Core services.
//!
//! The service layer that the HTTP front end drives.

pub mod gateway;

pub use gateway::{CredentialGateway, Registered, SNAPSHOT_SAMPLE_SIZE, StoreSnapshot};
