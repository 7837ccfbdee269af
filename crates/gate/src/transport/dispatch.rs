// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Inbound message validation and routing.

use serde_json::{Map, Value};

use crate::error::ProtocolError;
use crate::state::GateState;
use crate::transport::handler::{handle_auth, handle_chat, handle_system};
use crate::transport::ws_msg::Envelope;

/// A validated inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// `{"type": "chat", "message": ..., "parameters"?: {...}}`, kept whole.
    Chat(Map<String, Value>),
    /// `{"type": "system", "message": <command>, ...}`.
    System { command: String, context: Map<String, Value> },
    /// `{"type": "auth", "token": ...}` or `{"type": "system", "message": "auth", ...}`.
    Auth { token: Option<String> },
}

impl Inbound {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Chat(_) => "chat",
            Self::System { .. } => "system",
            Self::Auth { .. } => "auth",
        }
    }
}

/// Decode and validate one text frame.
///
/// Checks run in order and stop at the first failure: JSON syntax, object
/// shape, auth detection, `type` tag, `message` presence. A `type` that is
/// present but unknown reports [`ProtocolError::InvalidType`] before a
/// missing `message` is noticed.
pub fn decode(text: &str) -> Result<Inbound, ProtocolError> {
    let value: Value = serde_json::from_str(text).map_err(|_| ProtocolError::InvalidJson)?;
    let Value::Object(map) = value else {
        return Err(ProtocolError::NotAnObject);
    };

    let tag = map.get("type").and_then(Value::as_str);
    let message = map.get("message");
    let is_auth = tag == Some("auth")
        || (tag == Some("system") && message.and_then(Value::as_str) == Some("auth"));
    if is_auth {
        let token = map.get("token").and_then(Value::as_str).map(str::to_owned);
        return Ok(Inbound::Auth { token });
    }

    let Some(tag) = map.get("type") else {
        return Err(ProtocolError::MissingField);
    };
    let is_chat = match tag.as_str() {
        Some("chat") => true,
        Some("system") => false,
        _ => return Err(ProtocolError::InvalidType),
    };
    if message.is_none() {
        return Err(ProtocolError::MissingField);
    }

    if is_chat {
        return Ok(Inbound::Chat(map));
    }
    let command = message.and_then(Value::as_str).unwrap_or_default().to_owned();
    Ok(Inbound::System { command, context: map })
}

/// Route a validated message to its handler.
pub async fn dispatch(state: &GateState, inbound: Inbound) -> Envelope {
    match inbound {
        Inbound::Chat(message) => handle_chat(state.model.as_ref(), &message).await,
        Inbound::System { command, context } => {
            handle_system(&command, Some(&context), state.secret())
        }
        Inbound::Auth { token } => handle_auth(token.as_deref(), state.secret()),
    }
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
