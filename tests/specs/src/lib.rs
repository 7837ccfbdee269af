// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test harness for end-to-end binary smoke tests.
//!
//! Spawns the real `modelgate` binary as a subprocess and talks to it over
//! WebSocket.

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::Duration;

/// Resolve the path to the compiled `modelgate` binary.
pub fn gate_binary() -> PathBuf {
    let manifest = Path::new(env!("CARGO_MANIFEST_DIR"));
    // tests/specs → tests → workspace root
    let workspace = manifest.parent().and_then(|p| p.parent()).unwrap_or(manifest);
    workspace.join("target").join("debug").join("modelgate")
}

/// Find a free TCP port by binding to :0 then releasing.
pub fn free_port() -> anyhow::Result<u16> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    Ok(listener.local_addr()?.port())
}

/// A running `modelgate` process that is killed on drop.
pub struct GateProcess {
    child: Child,
    port: u16,
}

/// Builder for the flags and environment a [`GateProcess`] starts with.
pub struct GateBuilder {
    auth_token: Option<String>,
    rate_limit: Option<u32>,
    extra_args: Vec<String>,
}

impl Default for GateBuilder {
    fn default() -> Self {
        Self { auth_token: Some("smoke-secret".to_owned()), rate_limit: None, extra_args: vec![] }
    }
}

impl GateBuilder {
    /// Secret passed through `MODELGATE_AUTH_TOKEN`.
    pub fn auth_token(mut self, token: &str) -> Self {
        self.auth_token = Some(token.to_owned());
        self
    }

    pub fn no_auth_token(mut self) -> Self {
        self.auth_token = None;
        self
    }

    /// Limit passed through `MODELGATE_RATE_LIMIT`.
    pub fn rate_limit(mut self, limit: u32) -> Self {
        self.rate_limit = Some(limit);
        self
    }

    pub fn arg(mut self, arg: &str) -> Self {
        self.extra_args.push(arg.to_owned());
        self
    }

    fn command(&self, port: u16) -> anyhow::Result<Command> {
        let binary = gate_binary();
        anyhow::ensure!(binary.exists(), "modelgate binary not found at {}", binary.display());

        let mut cmd = Command::new(&binary);
        cmd.args(["--host", "127.0.0.1", "--port", &port.to_string(), "--log-level", "warn"])
            .args(&self.extra_args)
            .env_remove("MODELGATE_AUTH_TOKEN")
            .env_remove("MODELGATE_MODEL")
            .env_remove("MODELGATE_MODEL_URL")
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        if let Some(ref token) = self.auth_token {
            cmd.env("MODELGATE_AUTH_TOKEN", token);
        }
        if let Some(limit) = self.rate_limit {
            cmd.env("MODELGATE_RATE_LIMIT", limit.to_string());
        }
        Ok(cmd)
    }

    /// Spawn modelgate on a free port.
    pub fn spawn(self) -> anyhow::Result<GateProcess> {
        let port = free_port()?;
        let child = self.command(port)?.spawn()?;
        Ok(GateProcess { child, port })
    }

    /// Run modelgate to completion, for flag validation checks.
    pub fn status(self) -> anyhow::Result<std::process::ExitStatus> {
        let port = free_port()?;
        Ok(self.command(port)?.status()?)
    }
}

impl GateProcess {
    /// Create a builder for custom configuration.
    pub fn build() -> GateBuilder {
        GateBuilder::default()
    }

    /// Spawn modelgate with the default configuration.
    pub fn start() -> anyhow::Result<Self> {
        Self::build().spawn()
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// WebSocket URL.
    pub fn ws_url(&self) -> String {
        format!("ws://127.0.0.1:{}/ws", self.port)
    }

    /// Poll the port until it accepts TCP connections.
    pub async fn wait_listening(&self, timeout: Duration) -> anyhow::Result<()> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if tokio::time::Instant::now() > deadline {
                anyhow::bail!("modelgate did not start listening within {timeout:?}");
            }
            if tokio::net::TcpStream::connect(("127.0.0.1", self.port)).await.is_ok() {
                return Ok(());
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    }
}

impl Drop for GateProcess {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
