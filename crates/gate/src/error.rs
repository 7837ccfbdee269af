// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::fmt;

/// Per-message protocol failures reported in-band as `system` envelopes.
///
/// The numeric codes travel in the envelope's `code` field; they are not
/// WebSocket close codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolError {
    AuthFailed,
    /// Payload decoded but was not a JSON object.
    NotAnObject,
    /// Object is missing `type` or `message`.
    MissingField,
    InvalidType,
    UnknownCommand,
    InvalidJson,
    RateLimited,
}

impl ProtocolError {
    pub fn code(&self) -> u16 {
        match self {
            Self::AuthFailed => 4001,
            Self::NotAnObject | Self::MissingField => 4002,
            Self::InvalidType => 4003,
            Self::UnknownCommand => 4004,
            Self::InvalidJson => 4005,
            Self::RateLimited => 429,
        }
    }

    /// Human-readable text placed in the envelope.
    pub fn message(&self) -> &'static str {
        match self {
            Self::AuthFailed => "Authentication failed",
            Self::NotAnObject | Self::MissingField => "Invalid message format",
            Self::InvalidType => "Invalid message type",
            Self::UnknownCommand => "Unknown system command",
            Self::InvalidJson => "Invalid JSON",
            Self::RateLimited => "Rate limit exceeded",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthFailed => "AUTH_FAILED",
            Self::NotAnObject => "NOT_AN_OBJECT",
            Self::MissingField => "MISSING_FIELD",
            Self::InvalidType => "INVALID_TYPE",
            Self::UnknownCommand => "UNKNOWN_COMMAND",
            Self::InvalidJson => "INVALID_JSON",
            Self::RateLimited => "RATE_LIMITED",
        }
    }

    /// Framing failures mean the payload could not be read as a message at all.
    pub fn is_framing(&self) -> bool {
        matches!(self, Self::InvalidJson | Self::NotAnObject)
    }
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::error::Error for ProtocolError {}

/// Failure reported by a [`ModelManager`](crate::model::ModelManager).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// The backend could not be reached or timed out.
    Unavailable(String),
    /// The backend answered with a non-success status.
    Upstream { status: u16, body: String },
    /// The backend answered but the body carried no text.
    InvalidResponse(String),
    /// The request itself was refused (bad parameters and the like).
    Rejected(String),
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable(reason) => write!(f, "model unavailable: {reason}"),
            Self::Upstream { status, body } if body.is_empty() => {
                write!(f, "model returned HTTP {status}")
            }
            Self::Upstream { status, body } => write!(f, "model returned HTTP {status}: {body}"),
            Self::InvalidResponse(reason) => write!(f, "invalid model response: {reason}"),
            Self::Rejected(reason) => f.write_str(reason),
        }
    }
}

impl std::error::Error for GenerationError {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
