// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Generation backends consumed by the chat handler.

pub mod echo;
pub mod http;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::config::{Config, ModelKind};
use crate::error::GenerationError;

pub use echo::EchoModel;
pub use http::HttpModel;

/// Free-form generation options (`temperature`, `max_length`, ...).
pub type GenerationParams = serde_json::Map<String, serde_json::Value>;

/// Boxed future returned by [`ModelManager::generate`].
pub type GenerationFuture<'a> =
    Pin<Box<dyn Future<Output = Result<String, GenerationError>> + Send + 'a>>;

/// A text generation backend shared by every connection.
///
/// Object-safe for use as `Arc<dyn ModelManager>`. Implementations must
/// tolerate concurrent calls from independent connection tasks.
pub trait ModelManager: Send + Sync {
    fn generate<'a>(
        &'a self,
        prompt: &'a str,
        params: &'a GenerationParams,
    ) -> GenerationFuture<'a>;

    /// Short backend name for logs.
    fn name(&self) -> &'static str;
}

/// Build the backend selected by `config`.
pub fn from_config(config: &Config) -> anyhow::Result<Arc<dyn ModelManager>> {
    let model: Arc<dyn ModelManager> = match config.model_kind()? {
        ModelKind::Echo => Arc::new(EchoModel),
        ModelKind::Http => {
            let url = config
                .model_url
                .clone()
                .ok_or_else(|| anyhow::anyhow!("--model http requires --model-url"))?;
            Arc::new(HttpModel::new(url, config.model_token.clone(), config.model_timeout())?)
        }
    };
    Ok(model)
}
