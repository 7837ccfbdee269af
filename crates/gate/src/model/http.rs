// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP client for a remote generation endpoint.

use std::time::Duration;

use reqwest::Client;

use crate::error::GenerationError;
use crate::model::{GenerationFuture, GenerationParams, ModelManager};

/// Forwards prompts to a JSON generation endpoint.
///
/// Each request is a `POST` of `{"prompt": ..., <options>}`. The reply may be
/// a bare JSON string or an object carrying `response`, `text`, or
/// `generated_text`.
pub struct HttpModel {
    url: String,
    auth_token: Option<String>,
    client: Client,
}

impl HttpModel {
    pub fn new(url: String, auth_token: Option<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { url, auth_token, client })
    }

    fn apply_auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth_token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn post_generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, GenerationError> {
        let body = request_body(prompt, params)?;

        let req = self.client.post(&self.url).json(&body);
        let resp = self.apply_auth(req).send().await.map_err(|e| {
            if e.is_timeout() {
                GenerationError::Unavailable("request timed out".to_owned())
            } else {
                GenerationError::Unavailable(e.to_string())
            }
        })?;

        let status = resp.status();
        let text = resp.text().await.map_err(|e| GenerationError::Unavailable(e.to_string()))?;
        if !status.is_success() {
            return Err(GenerationError::Upstream { status: status.as_u16(), body: text });
        }
        parse_generation(&text)
    }
}

impl ModelManager for HttpModel {
    fn generate<'a>(
        &'a self,
        prompt: &'a str,
        params: &'a GenerationParams,
    ) -> GenerationFuture<'a> {
        Box::pin(self.post_generate(prompt, params))
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// Spread `params` next to `prompt`. A caller-supplied `prompt` option is
/// refused rather than silently overwritten.
pub fn request_body(
    prompt: &str,
    params: &GenerationParams,
) -> Result<serde_json::Value, GenerationError> {
    if params.contains_key("prompt") {
        return Err(GenerationError::Rejected(
            "duplicate generation parameter: prompt".to_owned(),
        ));
    }
    let mut body = params.clone();
    body.insert("prompt".to_owned(), serde_json::Value::String(prompt.to_owned()));
    Ok(serde_json::Value::Object(body))
}

/// Pull the generated text out of an endpoint reply.
pub fn parse_generation(body: &str) -> Result<String, GenerationError> {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| GenerationError::InvalidResponse(format!("not JSON: {e}")))?;

    if let serde_json::Value::String(text) = value {
        return Ok(text);
    }

    ["response", "text", "generated_text"]
        .iter()
        .find_map(|key| value.get(key).and_then(|v| v.as_str()))
        .map(str::to_owned)
        .ok_or_else(|| {
            GenerationError::InvalidResponse("expected a `response` or `text` field".to_owned())
        })
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
