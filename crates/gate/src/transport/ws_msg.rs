// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Outbound response envelopes.
//!
//! Every inbound message is answered with exactly one [`Envelope`]. Its
//! shape depends on the path that produced it; unused fields are omitted
//! from the wire JSON.

use serde::{Deserialize, Serialize};

use crate::error::{GenerationError, ProtocolError};

/// Envelope `type` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Chat,
    System,
}

/// Outcome of an authentication attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthStatus {
    Authenticated,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<AuthStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(rename = "type")]
    pub channel: Channel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
}

impl Envelope {
    fn bare(channel: Channel) -> Self {
        Self { response: None, status: None, error: None, message: None, channel, code: None }
    }

    /// Successful generation.
    pub fn chat_reply(text: String) -> Self {
        Self { response: Some(text), code: Some(200), ..Self::bare(Channel::Chat) }
    }

    /// Generation failure, absorbed into a 500-coded chat envelope.
    pub fn chat_failure(err: &GenerationError) -> Self {
        Self { error: Some(err.to_string()), code: Some(500), ..Self::bare(Channel::Chat) }
    }

    pub fn pong() -> Self {
        Self { response: Some("pong".to_owned()), code: Some(200), ..Self::bare(Channel::System) }
    }

    pub fn authenticated() -> Self {
        Self {
            status: Some(AuthStatus::Authenticated),
            code: Some(200),
            ..Self::bare(Channel::System)
        }
    }

    pub fn auth_failed() -> Self {
        let err = ProtocolError::AuthFailed;
        Self {
            status: Some(AuthStatus::Error),
            message: Some(err.message().to_owned()),
            code: Some(err.code()),
            ..Self::bare(Channel::System)
        }
    }

    /// `{error, type: "system", code}` for a per-message protocol failure.
    pub fn protocol(err: ProtocolError) -> Self {
        Self {
            error: Some(err.message().to_owned()),
            code: Some(err.code()),
            ..Self::bare(Channel::System)
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.status == Some(AuthStatus::Authenticated)
    }
}

#[cfg(test)]
#[path = "ws_msg_tests.rs"]
mod tests;
