// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::error::GenerationError;
use crate::model::{GenerationFuture, GenerationParams, ModelManager};

/// Backend that answers with the prompt itself.
///
/// Honors `max_length` (in characters) so clients can exercise parameter
/// plumbing without a real model. Any other option is ignored.
#[derive(Debug, Default, Clone, Copy)]
pub struct EchoModel;

impl ModelManager for EchoModel {
    fn generate<'a>(
        &'a self,
        prompt: &'a str,
        params: &'a GenerationParams,
    ) -> GenerationFuture<'a> {
        Box::pin(async move { echo(prompt, params) })
    }

    fn name(&self) -> &'static str {
        "echo"
    }
}

fn echo(prompt: &str, params: &GenerationParams) -> Result<String, GenerationError> {
    let max_length = match params.get("max_length") {
        None | Some(serde_json::Value::Null) => None,
        Some(v) => Some(v.as_u64().ok_or_else(|| {
            GenerationError::Rejected(format!("max_length must be a non-negative integer, got {v}"))
        })?),
    };

    let text = match max_length {
        Some(n) => prompt.chars().take(usize::try_from(n).unwrap_or(usize::MAX)).collect(),
        None => prompt.to_owned(),
    };
    Ok(text)
}
