//! Centralized error types for IssueDeck.
//!
//! Every error carries two renderings: the `Display` text keeps full context
//! for logs, `user_message()` gives a short string fit for a toast.

use thiserror::Error;

/// Transport-level failures talking to the gateway process.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl NetworkError {
    pub fn user_message(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed(_) => {
                "Unable to reach the IssueDeck backend. Is it running?"
            }
            NetworkError::Timeout => "The request timed out. Please try again.",
            NetworkError::ServerError { status, .. } if *status >= 500 => {
                "The backend is experiencing issues. Please try again later."
            }
            NetworkError::ServerError { .. } => "The request failed. Please try again.",
            NetworkError::InvalidResponse(_) => {
                "Received an unexpected response. Please try again."
            }
        }
    }
}

/// Failure of a single gateway command.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error(transparent)]
    Network(#[from] NetworkError),

    /// The backend ran the command and reported a failure.
    #[error("Command {command} failed ({status}): {message}")]
    Command {
        command: String,
        status: u16,
        message: String,
    },

    /// The backend answered but the payload did not match the expected shape.
    #[error("Command {command} returned an unreadable payload: {message}")]
    Decode { command: String, message: String },
}

impl GatewayError {
    /// Build a command failure without an HTTP origin (status 0).
    pub fn command(command: impl Into<String>, message: impl Into<String>) -> Self {
        GatewayError::Command {
            command: command.into(),
            status: 0,
            message: message.into(),
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            GatewayError::Network(e) => e.user_message(),
            GatewayError::Command { status: 401, .. } => {
                "GitHub authentication failed. Please sign in again."
            }
            GatewayError::Command { status: 404, .. } => "The requested item was not found.",
            GatewayError::Command { .. } => "GitHub request failed. Please try again.",
            GatewayError::Decode { .. } => "Received an unexpected response. Please try again.",
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),

    #[error("Missing required setting: {0}")]
    MissingSetting(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::NotFound(_) => "Configuration not found. Using defaults.",
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
            ConfigError::ParseError(_) => "Configuration file is malformed. Check your settings.",
            ConfigError::MissingSetting(_) => "A required setting is missing. Check your settings.",
        }
    }
}

/// Device-flow sign-in errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authorization denied: {0}")]
    Denied(String),

    #[error("Device code expired")]
    Expired,

    #[error("Timed out waiting for authorization")]
    TimedOut,

    #[error("Sign-in cancelled")]
    Cancelled,

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl AuthError {
    pub fn user_message(&self) -> &'static str {
        match self {
            AuthError::Denied(_) => "Sign-in was denied.",
            AuthError::Expired | AuthError::TimedOut => {
                "The sign-in code expired. Please start again."
            }
            AuthError::Cancelled => "Sign-in was cancelled.",
            AuthError::Gateway(e) => e.user_message(),
        }
    }
}

/// Extension trait for converting reqwest errors to our error types.
pub trait ReqwestErrorExt {
    fn into_network_error(self) -> NetworkError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_network_error(self) -> NetworkError {
        if self.is_timeout() {
            NetworkError::Timeout
        } else if self.is_connect() {
            NetworkError::ConnectionFailed(self.to_string())
        } else if self.is_decode() {
            NetworkError::InvalidResponse(self.to_string())
        } else if let Some(status) = self.status() {
            NetworkError::ServerError {
                status: status.as_u16(),
                message: self.to_string(),
            }
        } else {
            NetworkError::ConnectionFailed(self.to_string())
        }
    }
}
