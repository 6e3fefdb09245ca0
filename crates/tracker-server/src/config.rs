//! Configuration for the relay server.
//!
//! Defaults can be overridden via environment variables:
//!
//! - `TRACKER_BIND_ADDR`   (default: "0.0.0.0")
//! - `TRACKER_PORT`        (default: "9000")
//! - `TRACKER_PASSWORD`    (default: "")
//! - `TRACKER_MAX_CLIENTS` (default: "64")

use std::env;
use std::fmt;
use std::str::FromStr;

use anyhow::Context;

/// Server configuration.
#[derive(Clone)]
pub struct Config {
    /// IP address / interface to bind to (e.g. "0.0.0.0" or "127.0.0.1").
    pub bind_addr: String,

    /// TCP port to listen on.
    pub port: u16,

    /// Shared secret every client must present on connect.
    pub password: String,

    /// Maximum number of simultaneously open connections, authenticated or not.
    pub max_clients: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bind_addr: "0.0.0.0".to_string(),
            port: 9000,
            password: String::new(),
            max_clients: 64,
        }
    }
}

impl Config {
    /// Construct a `Config` from environment variables, falling back
    /// to the defaults.
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Config::default();

        Ok(Config {
            bind_addr: env::var("TRACKER_BIND_ADDR").unwrap_or(defaults.bind_addr),
            port: read_env_or_default("TRACKER_PORT", defaults.port)?,
            password: env::var("TRACKER_PASSWORD").unwrap_or(defaults.password),
            max_clients: read_env_or_default("TRACKER_MAX_CLIENTS", defaults.max_clients)?,
        })
    }

    /// Convenience: `addr:port` socket string.
    pub fn socket_addr_string(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("bind_addr", &self.bind_addr)
            .field("port", &self.port)
            .field("password", &"<redacted>")
            .field("max_clients", &self.max_clients)
            .finish()
    }
}

fn read_env_or_default<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(val) => val
            .parse::<T>()
            .with_context(|| format!("invalid value for {}: {:?}", key, val)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn socket_addr_joins_host_and_port() {
        let config = Config {
            bind_addr: "127.0.0.1".to_string(),
            port: 4242,
            ..Config::default()
        };
        assert_eq!(config.socket_addr_string(), "127.0.0.1:4242");
    }

    #[test]
    fn debug_hides_password() {
        let config = Config {
            password: "topsecret".to_string(),
            ..Config::default()
        };
        assert!(!format!("{:?}", config).contains("topsecret"));
    }

    #[test]
    fn unset_variable_uses_default() {
        let port: u16 = read_env_or_default("TRACKER_TEST_UNSET_PORT_VARIABLE", 1234).unwrap();
        assert_eq!(port, 1234);
    }
}
