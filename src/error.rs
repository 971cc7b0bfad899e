// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client error types with a consistent failure taxonomy.

use reqwest::StatusCode;
use serde::Deserialize;

/// Error type for every backend-facing operation.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication failed ({status}): {message}")]
    Auth { status: u16, message: String },

    #[error("Request rejected ({status}): {message}")]
    Validation { status: u16, message: String },

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unexpected response body: {0}")]
    Decode(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// JSON error body returned by the backend.
#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

impl ApiError {
    /// Build the error for a non-2xx response.
    ///
    /// The message comes from the body's `message` (or `error`) field, then the
    /// raw body text, then the status reason phrase.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = server_message(body).unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unknown status")
                .to_string()
        });
        let code = status.as_u16();

        match code {
            401 | 403 => ApiError::Auth {
                status: code,
                message,
            },
            400..=499 => ApiError::Validation {
                status: code,
                message,
            },
            _ => ApiError::Server {
                status: code,
                message,
            },
        }
    }

    /// Whether the backend rejected our credentials (stale or invalid token).
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ApiError::Auth { .. })
    }

    /// HTTP status for errors that came from a server response.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Auth { status, .. }
            | ApiError::Validation { status, .. }
            | ApiError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Message suitable for showing to the user.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Auth { message, .. }
            | ApiError::Validation { message, .. }
            | ApiError::Server { message, .. } => message.clone(),
            ApiError::InvalidInput(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Network(format!("request timed out: {}", err))
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errs: validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = errs.field_errors().keys().map(|k| k.to_string()).collect();
        fields.sort_unstable();
        ApiError::InvalidInput(format!("missing or empty fields: {}", fields.join(", ")))
    }
}

fn server_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    match serde_json::from_str::<ErrorBody>(trimmed) {
        Ok(parsed) => parsed.message.or(parsed.error),
        Err(_) => Some(trimmed.to_string()),
    }
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ApiError>;
