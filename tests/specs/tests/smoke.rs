// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end smoke tests that spawn the real `modelgate` binary.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;

use modelgate_specs::GateProcess;

const TIMEOUT: Duration = Duration::from_secs(10);

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

async fn connect(gate: &GateProcess, token: Option<&str>) -> anyhow::Result<WsStream> {
    let mut request = gate.ws_url().into_client_request()?;
    if let Some(token) = token {
        request
            .headers_mut()
            .insert("authorization", HeaderValue::from_str(&format!("Bearer {token}"))?);
    }
    let (ws, _) = tokio_tungstenite::connect_async(request)
        .await
        .map_err(|e| anyhow::anyhow!("ws connect: {e}"))?;
    Ok(ws)
}

async fn next(ws: &mut WsStream) -> anyhow::Result<Message> {
    tokio::time::timeout(TIMEOUT, ws.next())
        .await
        .map_err(|_| anyhow::anyhow!("ws recv timeout"))?
        .ok_or_else(|| anyhow::anyhow!("ws stream closed"))?
        .map_err(|e| anyhow::anyhow!("ws recv: {e}"))
}

async fn exchange(ws: &mut WsStream, text: &str) -> anyhow::Result<serde_json::Value> {
    ws.send(Message::Text(text.to_owned().into()))
        .await
        .map_err(|e| anyhow::anyhow!("ws send: {e}"))?;
    match next(ws).await? {
        Message::Text(reply) => Ok(serde_json::from_str(reply.as_str())?),
        other => anyhow::bail!("expected Text message, got {other:?}"),
    }
}

async fn close_code(ws: &mut WsStream) -> anyhow::Result<u16> {
    match next(ws).await? {
        Message::Close(Some(frame)) => Ok(u16::from(frame.code)),
        other => anyhow::bail!("expected Close, got {other:?}"),
    }
}

#[tokio::test]
async fn ping_over_real_binary() -> anyhow::Result<()> {
    let gate = GateProcess::start()?;
    gate.wait_listening(TIMEOUT).await?;

    let mut ws = connect(&gate, Some("smoke-secret")).await?;
    let reply = exchange(&mut ws, r#"{"type":"system","message":"ping"}"#).await?;
    assert_eq!(reply, serde_json::json!({"response": "pong", "type": "system", "code": 200}));
    Ok(())
}

#[tokio::test]
async fn echo_chat_over_real_binary() -> anyhow::Result<()> {
    let gate = GateProcess::start()?;
    gate.wait_listening(TIMEOUT).await?;

    let mut ws = connect(&gate, Some("smoke-secret")).await?;
    let reply = exchange(
        &mut ws,
        r#"{"type":"chat","message":"abcdef","parameters":{"max_length":3}}"#,
    )
    .await?;
    assert_eq!(reply, serde_json::json!({"response": "abc", "type": "chat", "code": 200}));
    Ok(())
}

#[tokio::test]
async fn missing_token_closes_4001() -> anyhow::Result<()> {
    let gate = GateProcess::start()?;
    gate.wait_listening(TIMEOUT).await?;

    let mut ws = connect(&gate, None).await?;
    assert_eq!(close_code(&mut ws).await?, 4001);
    Ok(())
}

#[tokio::test]
async fn rate_limit_from_environment() -> anyhow::Result<()> {
    let gate = GateProcess::build().rate_limit(1).spawn()?;
    gate.wait_listening(TIMEOUT).await?;

    let mut ws = connect(&gate, Some("smoke-secret")).await?;
    let first = exchange(&mut ws, r#"{"type":"system","message":"ping"}"#).await?;
    assert_eq!(first["code"], 200);
    let second = exchange(&mut ws, r#"{"type":"system","message":"ping"}"#).await?;
    assert_eq!(second["code"], 429);
    Ok(())
}

#[test]
fn zero_rate_limit_exits_2() -> anyhow::Result<()> {
    let status = GateProcess::build().rate_limit(0).status()?;
    assert_eq!(status.code(), Some(2));
    Ok(())
}

#[test]
fn http_model_without_url_exits_2() -> anyhow::Result<()> {
    let status = GateProcess::build().arg("--model").arg("http").status()?;
    assert_eq!(status.code(), Some(2));
    Ok(())
}
