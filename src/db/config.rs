//! Database connection configuration.
//!
//! Resolution order: explicit URL (CLI flag) > `.rectus.json` > environment
//! (`DATABASE_URL`, then `DB_HOST`/`DB_PORT`/`DB_USER`/`DB_PASSWORD`/`DB_NAME`)
//! > built-in defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::DbError;
use crate::config::{ConfigError, ConfigFile};

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 5432;
pub const DEFAULT_USER: &str = "postgres";
pub const DEFAULT_DATABASE: &str = "rectus";

/// PostgreSQL connection options.
///
/// Either `connection_string` is set, or the discrete options are used with
/// defaults filled in for anything missing. A `port` of 0 means the default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostgresConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_string: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default)]
    pub port: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
}

impl PostgresConfig {
    pub fn from_url(url: &str) -> Self {
        Self {
            connection_string: Some(url.to_string()),
            ..Self::default()
        }
    }

    /// Build the driver configuration.
    ///
    /// Connection strings may be URLs (`postgres://...`) or `key=value`
    /// lists; both are parsed by the driver.
    pub fn to_client_config(&self) -> Result<postgres::Config, DbError> {
        if let Some(url) = &self.connection_string {
            return url.parse::<postgres::Config>().map_err(|e| DbError::Connect {
                message: format!("Invalid connection string: {}", e),
            });
        }

        let mut config = postgres::Config::new();
        config
            .host(self.host.as_deref().unwrap_or(DEFAULT_HOST))
            .port(if self.port == 0 { DEFAULT_PORT } else { self.port })
            .user(self.user.as_deref().unwrap_or(DEFAULT_USER))
            .dbname(self.database.as_deref().unwrap_or(DEFAULT_DATABASE));
        if let Some(password) = &self.password {
            config.password(password);
        }
        Ok(config)
    }

    /// A log-safe description of the target (never includes the password).
    pub fn describe(&self) -> String {
        match &self.connection_string {
            Some(url) => match url.parse::<postgres::Config>() {
                Ok(parsed) => describe_parsed(&parsed),
                Err(_) => "<invalid connection string>".to_string(),
            },
            None => format!(
                "{}:{}/{}",
                self.host.as_deref().unwrap_or(DEFAULT_HOST),
                if self.port == 0 { DEFAULT_PORT } else { self.port },
                self.database.as_deref().unwrap_or(DEFAULT_DATABASE)
            ),
        }
    }
}

fn describe_parsed(config: &postgres::Config) -> String {
    let host = config
        .get_hosts()
        .first()
        .map(|h| match h {
            postgres::config::Host::Tcp(name) => name.clone(),
            #[cfg(unix)]
            postgres::config::Host::Unix(path) => path.display().to_string(),
        })
        .unwrap_or_else(|| DEFAULT_HOST.to_string());
    let port = config.get_ports().first().copied().unwrap_or(DEFAULT_PORT);
    let dbname = config.get_dbname().unwrap_or(DEFAULT_DATABASE);
    format!("{}:{}/{}", host, port, dbname)
}

/// Where a resolved configuration came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    Flag,
    File,
    Environment,
    Default,
}

impl ConfigSource {
    pub fn as_str(self) -> &'static str {
        match self {
            ConfigSource::Flag => "flag",
            ConfigSource::File => "config file",
            ConfigSource::Environment => "environment",
            ConfigSource::Default => "defaults",
        }
    }
}

/// Resolved database configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseConfig {
    pub postgres: PostgresConfig,
    pub source: ConfigSource,
}

impl DatabaseConfig {
    /// Load from environment variables.
    ///
    /// `DATABASE_URL` wins over the discrete `DB_*` variables. Returns `None`
    /// when none of them are set.
    ///
    /// # Errors
    ///
    /// `ConfigError::InvalidPort` when `DB_PORT` is set but is not a port
    /// number.
    pub fn from_env() -> Result<Option<Self>, ConfigError> {
        if let Some(url) = non_empty_var("DATABASE_URL") {
            return Ok(Some(Self {
                postgres: PostgresConfig::from_url(&url),
                source: ConfigSource::Environment,
            }));
        }

        let host = non_empty_var("DB_HOST");
        let port = non_empty_var("DB_PORT");
        let user = non_empty_var("DB_USER");
        let password = non_empty_var("DB_PASSWORD");
        let database = non_empty_var("DB_NAME");
        if host.is_none() && port.is_none() && user.is_none() && password.is_none() && database.is_none()
        {
            return Ok(None);
        }

        let port = match port {
            Some(value) => value.parse().map_err(|_| ConfigError::InvalidPort {
                var: "DB_PORT",
                value,
            })?,
            None => 0,
        };

        Ok(Some(Self {
            postgres: PostgresConfig {
                connection_string: None,
                host,
                port,
                user,
                password,
                database,
            },
            source: ConfigSource::Environment,
        }))
    }

    /// Resolve configuration.
    ///
    /// Priority: `url` flag > config file > environment > defaults. A config
    /// file that exists but cannot be parsed is an error rather than a
    /// silent fallback.
    pub fn resolve(url: Option<&str>, config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(url) = url {
            return Ok(Self {
                postgres: PostgresConfig::from_url(url),
                source: ConfigSource::Flag,
            });
        }

        if let Some(file) = ConfigFile::load_optional(config_path)? {
            return Ok(Self {
                postgres: file.database,
                source: ConfigSource::File,
            });
        }

        if let Some(config) = Self::from_env()? {
            return Ok(config);
        }

        Ok(Self {
            postgres: PostgresConfig::default(),
            source: ConfigSource::Default,
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}
