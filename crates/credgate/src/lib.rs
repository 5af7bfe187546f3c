//! # credgate
//!
//! HTTP front end for the credential store gateway: environment
//! configuration, JSON and HTML routes, health and debug endpoints.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod html;
pub mod routes;
pub mod state;

pub use config::{ConfigError, ServerConfig};
pub use routes::router;
pub use state::AppState;
