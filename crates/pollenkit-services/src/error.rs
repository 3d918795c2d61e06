//! Transport and protocol errors for the upstream HTTP services.

use thiserror::Error;

use crate::retry::{is_retryable_error, is_retryable_status, RetryDecision};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("{service} API error ({status}): {message}")]
    Api {
        service: &'static str,
        status: u16,
        message: String,
    },

    #[error("Failed to parse {service} response: {message}")]
    Parse {
        service: &'static str,
        message: String,
    },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ServiceError {
    /// User-friendly error message for UI display.
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(_) => "Network error. Check your connection.".to_string(),
            Self::Api { service, status, .. } if *status >= 500 => {
                format!("{} is experiencing issues. Please try again later.", service)
            }
            Self::Api { service, .. } => format!("{} request failed.", service),
            Self::Parse { service, .. } => {
                format!("Received an unexpected response from {}.", service)
            }
            Self::InvalidUrl(_) => "Service address is misconfigured.".to_string(),
        }
    }

    /// Whether the transport would retry this failure.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(e) => is_retryable_error(e) == RetryDecision::Retry,
            Self::Api { status, .. } => reqwest::StatusCode::from_u16(*status)
                .map(|s| is_retryable_status(s) == RetryDecision::Retry)
                .unwrap_or(false),
            Self::Parse { .. } | Self::InvalidUrl(_) => false,
        }
    }

    /// HTTP status of the failed call, when the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
