// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Chat and system message handlers.
//!
//! Handlers never touch connection state; they turn one validated message
//! into one [`Envelope`].

use serde_json::{Map, Value};

use crate::error::{GenerationError, ProtocolError};
use crate::model::{GenerationParams, ModelManager};
use crate::transport::auth::verify_token;
use crate::transport::ws_msg::Envelope;

/// Forward a chat message to the model.
///
/// `message` supplies the prompt (default empty) and `parameters` the
/// generation options (default none). A `parameters` value that is present
/// but not an object fails the turn without reaching the model. Model
/// failures come back as a 500-coded chat envelope and never escape this
/// function.
pub async fn handle_chat(model: &dyn ModelManager, message: &Map<String, Value>) -> Envelope {
    let prompt = prompt_text(message.get("message"));
    let empty = GenerationParams::new();
    let params = match message.get("parameters") {
        None => &empty,
        Some(Value::Object(params)) => params,
        Some(other) => {
            let err = GenerationError::Rejected(format!(
                "parameters must be an object, got {}",
                json_kind(other)
            ));
            tracing::debug!(err = %err, "rejected chat parameters");
            return Envelope::chat_failure(&err);
        }
    };

    match model.generate(&prompt, params).await {
        Ok(text) => Envelope::chat_reply(text),
        Err(e) => {
            tracing::warn!(model = model.name(), err = %e, "generation failed");
            Envelope::chat_failure(&e)
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn prompt_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Run a control command.
pub fn handle_system(
    command: &str,
    context: Option<&Map<String, Value>>,
    secret: Option<&str>,
) -> Envelope {
    match command {
        "ping" => Envelope::pong(),
        "auth" => {
            let token = context.and_then(|c| c.get("token")).and_then(Value::as_str);
            handle_auth(token, secret)
        }
        _ => Envelope::protocol(ProtocolError::UnknownCommand),
    }
}

/// Verify an in-band credential with the same check as the upgrade header.
pub fn handle_auth(token: Option<&str>, secret: Option<&str>) -> Envelope {
    if verify_token(token, secret) {
        Envelope::authenticated()
    } else {
        Envelope::auth_failed()
    }
}

#[cfg(test)]
#[path = "handler_tests.rs"]
mod tests;
