//! Structured error types for ledgerctl-core.
//!
//! Library consumers get `thiserror` enums; the `ledgerctl` binary wraps
//! them in `anyhow` with context.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for ledgerctl-core operations
#[derive(Error, Debug)]
pub enum LedgerError {
    /// I/O operation failed
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    /// Config file exists but is not valid TOML for `LedgerConfig`
    #[error("Failed to parse config file {path:?}: {source}")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// Config could not be rendered back to TOML
    #[error("Failed to serialize config: {source}")]
    ConfigSerialize {
        #[from]
        source: toml::ser::Error,
    },

    /// Configuration is missing a required value or has an invalid one
    #[error("Configuration error: {reason}")]
    Config { reason: String },

    /// Company type was neither CLIENT nor VENDOR
    #[error("Invalid company type '{value}' (expected CLIENT or VENDOR)")]
    InvalidCompanyType { value: String },
}

/// Result type alias for ledgerctl-core operations
pub type Result<T> = std::result::Result<T, LedgerError>;

impl LedgerError {
    /// Create a config error
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }

    /// Create an invalid company type error
    pub fn invalid_company_type(value: impl Into<String>) -> Self {
        Self::InvalidCompanyType {
            value: value.into(),
        }
    }
}
