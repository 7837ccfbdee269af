// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Modelgate: authenticated WebSocket gateway in front of a generative model.

pub mod config;
pub mod error;
pub mod model;
pub mod state;
pub mod test_support;
pub mod transport;

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::state::GateState;
use crate::transport::build_router;

/// Run the gateway until ctrl-c or the returned token fires.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let shutdown = CancellationToken::new();
    let model = model::from_config(&config)?;
    let addr = config.bind_addr();

    if config.auth_token.is_none() {
        tracing::warn!("no auth token configured; every connection will be rejected");
    }
    info!(
        model = model.name(),
        rate_limit = config.rate_limit,
        "modelgate listening on {addr}"
    );

    let state = Arc::new(GateState::new(config, model, shutdown.clone()));
    let router = build_router(state);
    let listener = TcpListener::bind(&addr).await?;

    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("shutdown requested");
            }
            shutdown.cancel();
        });
    }

    axum::serve(listener, router).with_graceful_shutdown(shutdown.cancelled_owned()).await?;
    Ok(())
}

/// Initialize tracing/logging from config.
///
/// Uses `try_init` so it's safe to call multiple times (e.g. from tests).
pub fn init_tracing(config: &Config) {
    use tracing_subscriber::fmt;

    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    let result = match config.log_format.as_str() {
        "json" => fmt::fmt().with_env_filter(filter).json().try_init(),
        _ => fmt::fmt().with_env_filter(filter).try_init(),
    };
    drop(result);
}
