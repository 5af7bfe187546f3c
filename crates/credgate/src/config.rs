//! Environment configuration.
//!
//! Every setting comes from an environment variable with a documented
//! default. Parsing goes through a lookup function so tests never touch
//! the process environment.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use credgate_core::{StoreConfig, TlsMode};

/// Variables the original deployment expects when `DATABASE_URL` is unset.
const REQUIRED_STORE_VARS: [&str; 3] = ["DB_HOST", "DB_USER", "DB_PASSWORD"];

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A variable is set but can't be parsed.
    #[error("invalid value {value:?} for {var}: {reason}")]
    Invalid {
        /// Variable name.
        var: &'static str,
        /// Raw value.
        value: String,
        /// What was expected.
        reason: &'static str,
    },
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address.
    pub bind_addr: IpAddr,
    /// Listen port.
    pub port: u16,
    /// Whether `/debug` is mounted.
    pub debug_endpoints: bool,
    /// Store connection settings.
    pub store: StoreConfig,
    /// Store variables that were expected but not set.
    pub missing_store_vars: Vec<&'static str>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8080,
            debug_endpoints: false,
            store: StoreConfig::default(),
            missing_store_vars: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Load from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an unparsable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an unparsable value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let store_defaults = StoreConfig::default();

        let url = lookup("DATABASE_URL").filter(|v| !v.trim().is_empty());
        let missing_store_vars = if url.is_some() {
            Vec::new()
        } else {
            REQUIRED_STORE_VARS
                .into_iter()
                .filter(|var| lookup(var).is_none_or(|v| v.is_empty()))
                .collect()
        };

        let tls = TlsMode::from_flags(
            parse_bool(&lookup, "DB_SSL_DISABLED", false)?,
            parse_bool(&lookup, "DB_SSL_VERIFY", false)?,
        );

        let store = StoreConfig {
            url,
            host: lookup("DB_HOST").unwrap_or(store_defaults.host),
            port: parse(&lookup, "DB_PORT", store_defaults.port, "a port number")?,
            database: lookup("DB_NAME").unwrap_or(store_defaults.database),
            user: lookup("DB_USER").unwrap_or(store_defaults.user),
            password: lookup("DB_PASSWORD").unwrap_or_default(),
            tls,
            max_connections: parse(
                &lookup,
                "DB_MAX_CONNECTIONS",
                store_defaults.max_connections,
                "a positive integer",
            )?,
            connect_timeout: Duration::from_secs(parse(
                &lookup,
                "DB_CONNECT_TIMEOUT_SECS",
                store_defaults.connect_timeout.as_secs(),
                "a number of seconds",
            )?),
        };

        if store.max_connections == 0 {
            return Err(ConfigError::Invalid {
                var: "DB_MAX_CONNECTIONS",
                value: "0".to_string(),
                reason: "a positive integer",
            });
        }

        Ok(Self {
            bind_addr: parse(&lookup, "BIND_ADDR", defaults.bind_addr, "an IP address")?,
            port: parse(&lookup, "PORT", defaults.port, "a port number")?,
            debug_endpoints: parse_bool(&lookup, "CREDGATE_DEBUG_ENDPOINTS", false)?,
            store,
            missing_store_vars,
        })
    }

    /// Address to listen on.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }
}

fn parse<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: T,
    reason: &'static str,
) -> Result<T, ConfigError> {
    match lookup(var) {
        None => Ok(default),
        Some(value) if value.trim().is_empty() => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value, reason }),
    }
}

fn parse_bool(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: bool,
) -> Result<bool, ConfigError> {
    let Some(value) = lookup(var) else {
        return Ok(default);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "" => Ok(default),
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            var,
            value,
            reason: "a boolean (true/false)",
        }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ServerConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8080");
        assert!(!config.debug_endpoints);
        assert_eq!(config.store.port, 3306);
        assert_eq!(config.store.database, "defaultdb");
        assert_eq!(config.store.tls, TlsMode::Required);
        assert_eq!(config.missing_store_vars, vec!["DB_HOST", "DB_USER", "DB_PASSWORD"]);
    }

    #[test]
    fn store_variables() {
        let config = load(&[
            ("DB_HOST", "mysql.example.com"),
            ("DB_PORT", "11794"),
            ("DB_NAME", "accounts"),
            ("DB_USER", "svc"),
            ("DB_PASSWORD", "pw"),
            ("DB_SSL_VERIFY", "true"),
            ("DB_MAX_CONNECTIONS", "12"),
        ])
        .unwrap();
        assert_eq!(config.store.host, "mysql.example.com");
        assert_eq!(config.store.port, 11794);
        assert_eq!(config.store.database, "accounts");
        assert_eq!(config.store.user, "svc");
        assert_eq!(config.store.password, "pw");
        assert_eq!(config.store.tls, TlsMode::VerifyIdentity);
        assert_eq!(config.store.max_connections, 12);
        assert!(config.missing_store_vars.is_empty());
    }

    #[test]
    fn database_url_overrides_and_silences_warnings() {
        let config = load(&[("DATABASE_URL", "sqlite::memory:")]).unwrap();
        assert_eq!(config.store.url.as_deref(), Some("sqlite::memory:"));
        assert!(config.missing_store_vars.is_empty());
    }

    #[test]
    fn ssl_disabled_beats_verify() {
        let config = load(&[("DB_SSL_DISABLED", "1"), ("DB_SSL_VERIFY", "yes")]).unwrap();
        assert_eq!(config.store.tls, TlsMode::Disabled);
    }

    #[test]
    fn server_variables() {
        let config = load(&[
            ("BIND_ADDR", "127.0.0.1"),
            ("PORT", "9000"),
            ("CREDGATE_DEBUG_ENDPOINTS", "ON"),
        ])
        .unwrap();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:9000");
        assert!(config.debug_endpoints);
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = load(&[("PORT", " "), ("DB_SSL_VERIFY", "")]).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.store.tls, TlsMode::Required);
    }

    #[test]
    fn invalid_values_are_errors() {
        let err = load(&[("DB_PORT", "not-a-port")]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid value \"not-a-port\" for DB_PORT: a port number"
        );
        assert!(load(&[("CREDGATE_DEBUG_ENDPOINTS", "maybe")]).is_err());
        assert!(load(&[("DB_MAX_CONNECTIONS", "0")]).is_err());
        assert!(load(&[("BIND_ADDR", "localhost")]).is_err());
    }
}
