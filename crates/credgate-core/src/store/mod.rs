//! Store connection settings and backend dialects.

mod config;
mod dialect;

pub use config::{StoreConfig, TlsMode};
pub use dialect::Dialect;
