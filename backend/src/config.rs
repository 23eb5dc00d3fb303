//! Runtime configuration read from environment variables.
//!
//! | Variable     | Default                  |
//! |--------------|--------------------------|
//! | `BIND_ADDR`  | `0.0.0.0:3000`           |
//! | `TASK_STORE` | `redis` (or `memory`)    |
//! | `REDIS_URL`  | `redis://127.0.0.1:6379` |
//! | `ASSETS_DIR` | `backend/assets`         |

use std::net::{AddrParseError, SocketAddr};
use std::path::PathBuf;

use thiserror::Error;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";
const DEFAULT_ASSETS_DIR: &str = "backend/assets";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Redis { url: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub store: StoreBackend,
    pub assets_dir: PathBuf,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid BIND_ADDR {value:?}: {source}")]
    InvalidBindAddr {
        value: String,
        source: AddrParseError,
    },

    #[error("unknown TASK_STORE {0:?}, expected \"redis\" or \"memory\"")]
    UnknownStore(String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_owned());
        let bind_addr = bind
            .parse()
            .map_err(|source| ConfigError::InvalidBindAddr {
                value: bind.clone(),
                source,
            })?;

        let store = match lookup("TASK_STORE").as_deref().map(str::trim) {
            None | Some("") | Some("redis") => StoreBackend::Redis {
                url: lookup("REDIS_URL").unwrap_or_else(|| DEFAULT_REDIS_URL.to_owned()),
            },
            Some("memory") => StoreBackend::Memory,
            Some(other) => return Err(ConfigError::UnknownStore(other.to_owned())),
        };

        let assets_dir = lookup("ASSETS_DIR")
            .map_or_else(|| PathBuf::from(DEFAULT_ASSETS_DIR), PathBuf::from);

        Ok(Self {
            bind_addr,
            store,
            assets_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_to_local_redis() {
        let config = config(&[]).unwrap();

        assert_eq!(config.bind_addr, "0.0.0.0:3000".parse().unwrap());
        assert_eq!(
            config.store,
            StoreBackend::Redis {
                url: DEFAULT_REDIS_URL.to_owned()
            }
        );
        assert_eq!(config.assets_dir, PathBuf::from("backend/assets"));
    }

    #[test]
    fn memory_store_ignores_redis_url() {
        let config = config(&[("TASK_STORE", "memory"), ("REDIS_URL", "redis://x")]).unwrap();
        assert_eq!(config.store, StoreBackend::Memory);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            config(&[("BIND_ADDR", "localhost")]),
            Err(ConfigError::InvalidBindAddr { .. })
        ));
        assert!(matches!(
            config(&[("TASK_STORE", "postgres")]),
            Err(ConfigError::UnknownStore(name)) if name == "postgres"
        ));
    }
}
