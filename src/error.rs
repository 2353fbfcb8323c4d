//! Error types for the webhook.
//!
//! `AdmissionError` is what a validator returns to reject a request. All of
//! its variants are client errors and are turned into a denied admission
//! response, never into a server failure. `WebhookError` covers the hosting
//! side: configuration, registration, TLS and the listener itself.

use thiserror::Error;

use crate::webhooks::ContextError;

/// Reason attached to every admission rejection produced by a validator.
pub const BAD_REQUEST_REASON: &str = "BadRequest";

/// Rejection returned by a validator
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AdmissionError {
    /// The delivered object is not of the kind the validator handles
    #[error("expected a {expected} but got a {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: String,
    },

    /// The admission request could not be found in the invocation context
    #[error("expected an admission request inside context: {0}")]
    ContextMissing(#[from] ContextError),

    /// The update changes an object that must not change
    #[error("{kind} cannot be updated")]
    ImmutableFieldChanged { kind: &'static str },
}

impl AdmissionError {
    /// Machine-readable reason for the rejection
    pub fn reason(&self) -> &'static str {
        match self {
            AdmissionError::TypeMismatch { .. }
            | AdmissionError::ContextMissing(_)
            | AdmissionError::ImmutableFieldChanged { .. } => BAD_REQUEST_REASON,
        }
    }

    /// HTTP status code equivalent of the rejection
    pub fn code(&self) -> u16 {
        400
    }
}

/// Errors that can occur when configuring or running the webhook server
#[derive(Debug, Error)]
pub enum WebhookError {
    /// TLS configuration error
    #[error("TLS configuration error: {0}")]
    TlsConfig(String),

    /// Server error
    #[error("Webhook server error: {0}")]
    Server(String),

    /// A validator could not be registered
    #[error("Webhook registration error: {0}")]
    Registration(String),

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for validator operations
pub type Result<T> = std::result::Result<T, AdmissionError>;
