// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test infrastructure: builders, stub models, and server helpers.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::config::{Config, DEFAULT_RATE_LIMIT};
use crate::error::GenerationError;
use crate::model::{EchoModel, GenerationFuture, GenerationParams, ModelManager};
use crate::state::GateState;

/// Secret used by [`GateStateBuilder`] unless overridden.
pub const TEST_SECRET: &str = "test-secret";

/// Config with test-friendly defaults (no env lookups).
pub fn test_config() -> Config {
    Config {
        host: "127.0.0.1".to_owned(),
        port: 0,
        auth_token: Some(TEST_SECRET.to_owned()),
        rate_limit: DEFAULT_RATE_LIMIT,
        model: "echo".to_owned(),
        model_url: None,
        model_token: None,
        model_timeout_ms: 5_000,
        log_level: "info".to_owned(),
        log_format: "text".to_owned(),
    }
}

/// Builder for constructing `GateState` in tests with sensible defaults.
pub struct GateStateBuilder {
    config: Config,
    model: Arc<dyn ModelManager>,
    shutdown: CancellationToken,
}

impl Default for GateStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GateStateBuilder {
    pub fn new() -> Self {
        Self { config: test_config(), model: Arc::new(EchoModel), shutdown: CancellationToken::new() }
    }

    pub fn auth_token(mut self, token: &str) -> Self {
        self.config.auth_token = Some(token.to_owned());
        self
    }

    pub fn no_auth_token(mut self) -> Self {
        self.config.auth_token = None;
        self
    }

    pub fn rate_limit(mut self, limit: u32) -> Self {
        self.config.rate_limit = limit;
        self
    }

    pub fn model(mut self, model: Arc<dyn ModelManager>) -> Self {
        self.model = model;
        self
    }

    pub fn shutdown(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub fn build(self) -> Arc<GateState> {
        Arc::new(GateState::new(self.config, self.model, self.shutdown))
    }
}

/// Model stub that returns a canned result and records every call.
pub struct StubModel {
    reply: Result<String, GenerationError>,
    delay: Duration,
    calls: Mutex<Vec<(String, GenerationParams)>>,
}

impl StubModel {
    pub fn replying(text: &str) -> Self {
        Self { reply: Ok(text.to_owned()), delay: Duration::ZERO, calls: Mutex::new(Vec::new()) }
    }

    pub fn failing(err: GenerationError) -> Self {
        Self { reply: Err(err), delay: Duration::ZERO, calls: Mutex::new(Vec::new()) }
    }

    /// Sleep before answering, to hold a connection's turn open.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Prompts and options received so far, in call order.
    pub async fn calls(&self) -> Vec<(String, GenerationParams)> {
        self.calls.lock().await.clone()
    }
}

impl ModelManager for StubModel {
    fn generate<'a>(
        &'a self,
        prompt: &'a str,
        params: &'a GenerationParams,
    ) -> GenerationFuture<'a> {
        Box::pin(async move {
            self.calls.lock().await.push((prompt.to_owned(), params.clone()));
            if self.delay > Duration::ZERO {
                tokio::time::sleep(self.delay).await;
            }
            self.reply.clone()
        })
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

/// Convert any `Result<T, E: Display>` into `anyhow::Result<T>`.
pub trait AnyhowExt<T> {
    fn anyhow(self) -> anyhow::Result<T>;
}

impl<T, E: std::fmt::Display> AnyhowExt<T> for Result<T, E> {
    fn anyhow(self) -> anyhow::Result<T> {
        self.map_err(|e| anyhow::anyhow!("{e}"))
    }
}

/// Spawn the gateway router on a random port for integration testing.
///
/// Returns the bound address and a join handle for the server task.
pub async fn spawn_http_server(
    state: Arc<GateState>,
) -> anyhow::Result<(std::net::SocketAddr, tokio::task::JoinHandle<()>)> {
    let router = crate::transport::build_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let handle = tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    Ok((addr, handle))
}
