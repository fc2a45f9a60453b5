#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::domain::rules::OverlapPolicy;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use std::net::SocketAddr;
use toml_config::TomlConfig;

pub const DEFAULT_BIND: &str = "127.0.0.1:8000";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Command line values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub bind: Option<String>,
    pub database_url: Option<String>,
    pub json_logs: bool,
}

/// Effective settings: flags, then config file, then `DATABASE_URL`, then
/// defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub bind: String,
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub overlap_policy: OverlapPolicy,
    pub log_level: Option<String>,
    pub json_logs: bool,
}

impl Settings {
    pub fn resolve(
        file: Option<&TomlConfig>,
        overrides: Overrides,
        env_database_url: Option<String>,
    ) -> Self {
        let file = file.cloned().unwrap_or_default();
        let (file_url, max_connections) = match file.database {
            Some(db) => (Some(db.url), db.max_connections),
            None => (None, DEFAULT_MAX_CONNECTIONS),
        };

        Self {
            bind: overrides.bind.unwrap_or(file.server.bind),
            database_url: overrides.database_url.or(file_url).or(env_database_url),
            max_connections,
            overlap_policy: file.scheduling.overlap,
            log_level: file.logging.level,
            json_logs: overrides.json_logs || file.logging.json,
        }
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        validation::validate_bind_address("bind", &self.bind)
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        self.socket_addr()?;
        if let Some(url) = &self.database_url {
            validation::validate_database_url("database_url", url)?;
        }
        validation::validate_positive_number("max_connections", self.max_connections, 1)
    }
}
