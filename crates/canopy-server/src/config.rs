use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

/// Environment variable overriding [`ServerConfig::db_path`].
pub const ENV_DB: &str = "CANOPY_DB";
/// Environment variable overriding the port of [`ServerConfig::bind_addr`].
pub const ENV_PORT: &str = "CANOPY_PORT";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// SQLite database file holding the stored trees.
    pub db_path: PathBuf,
    /// Largest accepted request body, in bytes.
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            db_path: PathBuf::from("canopy.db"),
            max_body_size: 1024 * 1024,
        }
    }
}

impl ServerConfig {
    /// Parse a TOML document; missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> ServerResult<Self> {
        toml::from_str(text).map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Read a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> ServerResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ServerError::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Apply `CANOPY_DB` and `CANOPY_PORT` from the process environment.
    pub fn apply_env(self) -> ServerResult<Self> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn apply_env_with(mut self, lookup: impl Fn(&str) -> Option<String>) -> ServerResult<Self> {
        if let Some(db) = lookup(ENV_DB).filter(|v| !v.is_empty()) {
            self.db_path = PathBuf::from(db);
        }
        if let Some(port) = lookup(ENV_PORT).filter(|v| !v.is_empty()) {
            let port: u16 = port
                .trim()
                .parse()
                .map_err(|_| ServerError::Config(format!("{ENV_PORT} is not a valid port: {port}")))?;
            self.bind_addr.set_port(port);
        }
        Ok(self)
    }
}
