// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket upgrade endpoint and the per-connection state machine.
//!
//! Lifecycle: the `Authorization` header is checked before the upgrade
//! completes. A rejected client gets an immediate close (4001) and no
//! message is ever read. An accepted client enters a strictly sequential
//! loop of receive → rate limit → decode → dispatch → send, one envelope per
//! inbound text frame, until either side closes. A binary frame is a runtime
//! failure and closes the connection with 1000 without a reply.

use std::sync::Arc;

use axum::extract::ws::{CloseFrame, Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use tracing::{debug, error, info, warn};

use crate::error::ProtocolError;
use crate::state::GateState;
use crate::transport::auth;
use crate::transport::dispatch::{self, Inbound};
use crate::transport::ratelimit::RateLimiter;
use crate::transport::ws_msg::Envelope;

/// Normal closure; also used for runtime failures so no detail leaks.
pub const CLOSE_NORMAL: u16 = 1000;
/// Authentication failed, either on the upgrade header or in-band.
pub const CLOSE_UNAUTHORIZED: u16 = 4001;

/// Where a connection is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    AwaitingAuth,
    Authenticated,
    /// Closed with the given code (or by the peer, reported as `CLOSE_NORMAL`).
    Closed(u16),
}

/// Result of one receive → respond cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum Turn {
    /// Send the envelope and wait for the next frame.
    Reply(Envelope),
    /// Send the envelope, then close with `code`.
    ReplyAndClose { envelope: Envelope, code: u16 },
}

impl Turn {
    pub fn envelope(&self) -> &Envelope {
        match self {
            Self::Reply(envelope) | Self::ReplyAndClose { envelope, .. } => envelope,
        }
    }

    pub fn close_code(&self) -> Option<u16> {
        match self {
            Self::Reply(_) => None,
            Self::ReplyAndClose { code, .. } => Some(*code),
        }
    }
}

/// State owned by a single connection: its rate window, auth phase, and
/// turn count. Never shared across connections.
pub struct Connection {
    id: String,
    state: Arc<GateState>,
    limiter: RateLimiter,
    phase: Phase,
    turns: u64,
}

impl Connection {
    pub fn new(state: Arc<GateState>) -> Self {
        let limiter = RateLimiter::new(state.config.rate_limit);
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            state,
            limiter,
            phase: Phase::AwaitingAuth,
            turns: 0,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn turns(&self) -> u64 {
        self.turns
    }

    /// Run the upgrade-time header check. Returns whether the client may proceed.
    pub fn authenticate_header(&mut self, header: Option<&str>) -> bool {
        if self.phase != Phase::AwaitingAuth {
            return self.phase == Phase::Authenticated;
        }
        let token = auth::extract_bearer(header);
        if auth::verify_token(token.as_deref(), self.state.secret()) {
            self.phase = Phase::Authenticated;
            true
        } else {
            false
        }
    }

    /// Handle one inbound text frame and decide what to send back.
    ///
    /// Framing failures (bad JSON, non-object payload) on the first turn end
    /// the connection after the error envelope; later ones only fail that
    /// turn. A failed in-band `auth` ends the connection with 4001.
    pub async fn turn(&mut self, text: &str) -> Turn {
        if self.phase != Phase::Authenticated {
            return Turn::ReplyAndClose {
                envelope: Envelope::auth_failed(),
                code: CLOSE_UNAUTHORIZED,
            };
        }

        let first = self.turns == 0;
        self.turns += 1;

        if !self.limiter.allow() {
            debug!(conn = %self.id, turn = self.turns, "rate limit exceeded");
            return Turn::Reply(Envelope::protocol(ProtocolError::RateLimited));
        }

        let inbound = match dispatch::decode(text) {
            Ok(inbound) => inbound,
            Err(err) => {
                debug!(conn = %self.id, turn = self.turns, code = err.code(), "rejected message: {err}");
                let envelope = Envelope::protocol(err);
                if first && err.is_framing() {
                    return Turn::ReplyAndClose { envelope, code: CLOSE_NORMAL };
                }
                return Turn::Reply(envelope);
            }
        };

        let is_auth = matches!(inbound, Inbound::Auth { .. });
        debug!(conn = %self.id, turn = self.turns, kind = inbound.kind(), "dispatching");
        let envelope = dispatch::dispatch(&self.state, inbound).await;

        if is_auth && !envelope.is_authenticated() {
            warn!(conn = %self.id, "in-band authentication failed");
            return Turn::ReplyAndClose { envelope, code: CLOSE_UNAUTHORIZED };
        }
        Turn::Reply(envelope)
    }

    /// Record that the connection is closing with `code`.
    ///
    /// Returns the code the first time and `None` afterwards, so callers
    /// send at most one close frame.
    pub fn close(&mut self, code: u16) -> Option<u16> {
        if let Phase::Closed(_) = self.phase {
            return None;
        }
        self.phase = Phase::Closed(code);
        Some(code)
    }
}

/// `GET /ws`: WebSocket upgrade guarded by a bearer token header.
pub async fn ws_handler(
    State(state): State<Arc<GateState>>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let header = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());

    let mut conn = Connection::new(state);
    conn.authenticate_header(header);

    ws.on_upgrade(move |socket| handle_connection(conn, socket))
}

enum Event {
    Shutdown,
    Frame(Option<Result<Message, axum::Error>>),
}

/// Per-connection event loop.
async fn handle_connection(mut conn: Connection, mut socket: WebSocket) {
    if conn.phase() != Phase::Authenticated {
        warn!(conn = %conn.id(), "rejecting connection: missing or invalid bearer token");
        close_socket(&mut socket, &mut conn, CLOSE_UNAUTHORIZED, "unauthorized").await;
        return;
    }

    info!(conn = %conn.id(), "connection accepted");
    let shutdown = conn.state.shutdown.clone();

    let close_code = loop {
        let event = tokio::select! {
            _ = shutdown.cancelled() => Event::Shutdown,
            frame = socket.recv() => Event::Frame(frame),
        };

        let text = match event {
            Event::Shutdown => break CLOSE_NORMAL,
            Event::Frame(Some(Ok(Message::Text(text)))) => text.as_str().to_owned(),
            // Only text frames carry messages; anything else ends the connection.
            Event::Frame(Some(Ok(Message::Binary(data)))) => {
                warn!(conn = %conn.id(), len = data.len(), "unexpected binary frame");
                break CLOSE_NORMAL;
            }
            // Ping/pong are answered by the protocol layer.
            Event::Frame(Some(Ok(Message::Ping(_) | Message::Pong(_)))) => continue,
            Event::Frame(Some(Ok(Message::Close(_))) | None) => {
                conn.close(CLOSE_NORMAL);
                break CLOSE_NORMAL;
            }
            Event::Frame(Some(Err(e))) => {
                debug!(conn = %conn.id(), err = %e, "receive failed");
                conn.close(CLOSE_NORMAL);
                break CLOSE_NORMAL;
            }
        };

        let turn = conn.turn(&text).await;
        if let Err(e) = send_envelope(&mut socket, turn.envelope()).await {
            error!(conn = %conn.id(), err = %e, "failed to send response");
            break CLOSE_NORMAL;
        }
        if let Some(code) = turn.close_code() {
            break code;
        }
    };

    close_socket(&mut socket, &mut conn, close_code, "").await;
    info!(conn = %conn.id(), turns = conn.turns(), "connection closed");
}

/// Serialize and send one envelope.
async fn send_envelope(socket: &mut WebSocket, envelope: &Envelope) -> anyhow::Result<()> {
    let text = serde_json::to_string(envelope)?;
    socket.send(Message::Text(text.into())).await?;
    Ok(())
}

/// Send a close frame unless the connection is already closed.
async fn close_socket(socket: &mut WebSocket, conn: &mut Connection, code: u16, reason: &str) {
    let Some(code) = conn.close(code) else {
        return;
    };
    let frame = CloseFrame { code, reason: reason.to_owned().into() };
    if let Err(e) = socket.send(Message::Close(Some(frame))).await {
        debug!(conn = %conn.id(), err = %e, "close frame not delivered");
    }
}

#[cfg(test)]
#[path = "ws_tests.rs"]
mod tests;
