//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid host address")]
    InvalidHost,

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid notify URL")]
    InvalidNotifyUrl,

    #[error("Notify URL must use HTTPS in production")]
    NotifyUrlMustBeHttps,

    #[error("Invalid gateway base URL")]
    InvalidBaseUrl,

    #[error("Default country must be a two-letter ISO code")]
    InvalidCountryCode,
}
