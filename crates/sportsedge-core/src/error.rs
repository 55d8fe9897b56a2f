//! Core error types for sportsedge-core.
//!
//! This module defines the error hierarchy using thiserror. Remote
//! collaborator failures are `ServiceError`s; the resolvers in
//! [`crate::services`] turn those into fallback values, so most callers
//! never see them.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for sportsedge-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Remote collaborator errors
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    /// Local usage store errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Failures of the subscription, view-count and reward-structure services.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Request could not be sent or the connection dropped
    #[error("Request to {service} failed: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// Server answered with a non-success status
    #[error("{service} returned HTTP {status}")]
    UnexpectedStatus { service: &'static str, status: u16 },

    /// Response body did not match the expected shape
    #[error("Failed to decode {service} response: {message}")]
    Decode {
        service: &'static str,
        message: String,
    },

    /// Lookup requires a signed-in user
    #[error("{service} requires an authenticated user")]
    NotAuthenticated { service: &'static str },

    /// Base URL or endpoint could not be built
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    /// Credential store failure
    #[error("Credential store error: {0}")]
    Credentials(String),

    /// Stand-in collaborators and tests
    #[error("{0}")]
    Unavailable(String),
}

/// Local usage store errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Home directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Validation errors.
#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    /// Milestone thresholds must be strictly increasing
    #[error("Milestone at index {index} (count {count}) is not above the previous threshold {previous}")]
    MilestonesNotAscending {
        index: usize,
        count: u32,
        previous: u32,
    },

    /// Decimal odds must exceed 1.0
    #[error("Invalid decimal odds for {outcome}: {value}")]
    InvalidOdds { outcome: &'static str, value: f64 },

    /// Unknown reward type in a remote reward structure
    #[error("Unknown reward type '{0}'")]
    UnknownRewardType(String),

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(inner, _msg) => {
                if inner.code == rusqlite::ErrorCode::DatabaseBusy
                    || inner.code == rusqlite::ErrorCode::DatabaseLocked
                {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(err.into())
    }
}

impl From<keyring::Error> for ServiceError {
    fn from(err: keyring::Error) -> Self {
        ServiceError::Credentials(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_error_converts_into_core_error() {
        let err: CoreError = ServiceError::UnexpectedStatus {
            service: "subscription",
            status: 503,
        }
        .into();
        assert_eq!(err.to_string(), "Service error: subscription returned HTTP 503");
    }

    #[test]
    fn validation_error_message_names_offending_index() {
        let err = ValidationError::MilestonesNotAscending {
            index: 2,
            count: 5,
            previous: 5,
        };
        assert!(err.to_string().contains("index 2"));
    }
}
