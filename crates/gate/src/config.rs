// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use clap::Parser;

/// Default number of messages a single connection may send per 60 seconds.
pub const DEFAULT_RATE_LIMIT: u32 = 5;

/// Which generation backend serves `chat` messages.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    /// Replies with the prompt unchanged. Useful for local smoke testing.
    #[default]
    Echo,
    /// Forwards prompts to an HTTP generation endpoint.
    Http,
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Echo => f.write_str("echo"),
            Self::Http => f.write_str("http"),
        }
    }
}

impl std::str::FromStr for ModelKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "echo" => Ok(Self::Echo),
            "http" => Ok(Self::Http),
            other => anyhow::bail!("invalid model kind: {other}"),
        }
    }
}

/// Authenticated WebSocket gateway in front of a generative model.
#[derive(Debug, Clone, Parser)]
#[command(name = "modelgate", version, about)]
pub struct Config {
    /// Host to bind on.
    #[arg(long, default_value = "127.0.0.1", env = "MODELGATE_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(long, default_value_t = 8000, env = "MODELGATE_PORT")]
    pub port: u16,

    /// Shared bearer token clients must present. If unset, every connection
    /// is rejected.
    #[arg(long, env = "MODELGATE_AUTH_TOKEN", hide_env_values = true)]
    pub auth_token: Option<String>,

    /// Messages allowed per connection in any 60-second window.
    #[arg(long, default_value_t = DEFAULT_RATE_LIMIT, env = "MODELGATE_RATE_LIMIT")]
    pub rate_limit: u32,

    /// Generation backend (echo, http).
    #[arg(long, default_value = "echo", env = "MODELGATE_MODEL")]
    pub model: String,

    /// Generation endpoint for `--model http`.
    #[arg(long, env = "MODELGATE_MODEL_URL")]
    pub model_url: Option<String>,

    /// Bearer token sent to the generation endpoint.
    #[arg(long, env = "MODELGATE_MODEL_TOKEN", hide_env_values = true)]
    pub model_token: Option<String>,

    /// Timeout for a single generation request in milliseconds.
    #[arg(long, default_value_t = 60_000, env = "MODELGATE_MODEL_TIMEOUT_MS")]
    pub model_timeout_ms: u64,

    /// Log filter directive (e.g. `info`, `modelgate=debug`).
    #[arg(long, default_value = "info", env = "MODELGATE_LOG_LEVEL")]
    pub log_level: String,

    /// Log output format (text, json).
    #[arg(long, default_value = "text", env = "MODELGATE_LOG_FORMAT")]
    pub log_format: String,
}

impl Config {
    /// Validate cross-field constraints that clap cannot express.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.rate_limit == 0 {
            anyhow::bail!("--rate-limit must be greater than zero");
        }

        if self.model_kind()? == ModelKind::Http && self.model_url.is_none() {
            anyhow::bail!("--model http requires --model-url");
        }

        match self.log_format.as_str() {
            "text" | "json" => {}
            other => anyhow::bail!("invalid log format: {other}"),
        }

        Ok(())
    }

    pub fn model_kind(&self) -> anyhow::Result<ModelKind> {
        self.model.parse()
    }

    pub fn model_timeout(&self) -> Duration {
        Duration::from_millis(self.model_timeout_ms)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
