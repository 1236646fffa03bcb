//! Client error taxonomy

use crate::transport::TransportError;
use thiserror::Error;

/// The gateway answered with a non-2xx status
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Gateway error: {status_code} - {error_message}")]
pub struct GatewayError {
    status_code: u16,
    error_message: String,
}

impl GatewayError {
    /// Build from a raw response body, compacted with [`compact_whitespace`].
    pub fn from_response(status_code: u16, body: &str) -> Self {
        Self {
            status_code,
            error_message: compact_whitespace(body),
        }
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn error_message(&self) -> &str {
        &self.error_message
    }
}

/// Remove whitespace outside double-quoted strings.
///
/// Pretty-printed JSON payloads become compact single-line strings while
/// string values keep their spaces. A `\` inside a string escapes the next
/// character, so `\"` does not end the string. Applied to every body
/// regardless of content type: plain-text bodies lose their spacing unless
/// quoted.
pub fn compact_whitespace(body: &str) -> String {
    let mut result = String::with_capacity(body.len());
    let mut in_string = false;
    let mut escaped = false;

    for c in body.chars() {
        if in_string {
            result.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
        } else if c == '"' {
            in_string = true;
            result.push(c);
        } else if !c.is_whitespace() {
            result.push(c);
        }
    }
    result
}

/// Errors returned by the gateway client
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

impl ClientError {
    /// The gateway error, if the failure was a non-2xx response
    pub fn as_gateway(&self) -> Option<&GatewayError> {
        match self {
            ClientError::Gateway(err) => Some(err),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
