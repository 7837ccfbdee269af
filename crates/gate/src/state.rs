// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::model::ModelManager;

/// Read-only state shared by every connection.
///
/// Nothing here is mutated after startup: the secret lives in `config` and
/// the model backend handles its own concurrency.
pub struct GateState {
    pub config: Config,
    pub model: Arc<dyn ModelManager>,
    pub shutdown: CancellationToken,
}

impl GateState {
    pub fn new(config: Config, model: Arc<dyn ModelManager>, shutdown: CancellationToken) -> Self {
        Self { config, model, shutdown }
    }

    /// The shared bearer secret, if one is configured.
    pub fn secret(&self) -> Option<&str> {
        self.config.auth_token.as_deref()
    }
}
