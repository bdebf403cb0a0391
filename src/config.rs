//! TOML configuration for sessions
//!
//! ```toml
//! dialect = "postgresql"
//! batch_size = 50
//! change_detection = "row-state"
//! track_for_rejection = false
//! ```

use serde::{Deserialize, Serialize};
use tabula_core::{ChangeDetection, Compiler, Dialect, SessionOptions};

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Invalid value: {0}")]
    InvalidValue(String),
    #[error("Dialect {0} is not enabled; turn on its crate feature")]
    DialectDisabled(Dialect),
}

fn default_batch_size() -> usize {
    1
}

/// Settings read from `tabula.toml`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TabulaConfig {
    /// Target dialect
    #[serde(default)]
    pub dialect: Dialect,
    /// Rows per command when saving; 1 saves row by row
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default)]
    pub change_detection: ChangeDetection,
    /// Snapshot fetched collections so their changes can be rejected
    #[serde(default)]
    pub track_for_rejection: bool,
}

impl Default for TabulaConfig {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            batch_size: default_batch_size(),
            change_detection: ChangeDetection::default(),
            track_for_rejection: false,
        }
    }
}

impl TabulaConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::parse(&contents)
    }

    /// Parse configuration from a TOML string
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        if config.batch_size == 0 {
            return Err(ConfigError::InvalidValue(
                "batch_size must be at least 1".into(),
            ));
        }
        Ok(config)
    }

    /// A compiler for the configured dialect.
    pub fn compiler(&self) -> Result<Compiler, ConfigError> {
        match self.dialect {
            #[cfg(feature = "sqlite")]
            Dialect::SQLite => Ok(tabula_sqlite::compiler()),
            #[cfg(feature = "postgres")]
            Dialect::PostgreSQL => Ok(tabula_postgres::compiler()),
            #[cfg(feature = "mysql")]
            Dialect::MySQL => Ok(tabula_mysql::compiler()),
            #[cfg(feature = "mssql")]
            Dialect::SqlServer => Ok(tabula_mssql::compiler()),
            #[cfg(feature = "oracle")]
            Dialect::Oracle => Ok(tabula_oracle::compiler()),
            #[allow(unreachable_patterns)]
            dialect => Err(ConfigError::DialectDisabled(dialect)),
        }
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            batch_size: self.batch_size,
            change_detection: self.change_detection,
            track_for_rejection: self.track_for_rejection,
        }
    }
}
