//! Beckon integration test harness.
//!
//! Each test boots a real server on an ephemeral port and drives it over
//! actual WebSocket and HTTP connections. Servers are cheap (one hub, one
//! listener) so tests never share state.

mod registration;

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use beckon_api::ApiState;
use beckon_core::config::DuplicateLoginPolicy;
use beckon_core::{ClientEvent, ServerEvent};
use beckon_services::{SignalingHub, UserDirectory};

// ── Harness ───────────────────────────────────────────────────────────────────

pub const RECV_TIMEOUT: Duration = Duration::from_secs(2);

/// Boot a server with the demo directory on an ephemeral port and return
/// the port.
pub async fn start_server() -> Result<u16> {
    start_server_with_policy(DuplicateLoginPolicy::Evict).await
}

pub async fn start_server_with_policy(policy: DuplicateLoginPolicy) -> Result<u16> {
    let hub = Arc::new(SignalingHub::new(UserDirectory::with_demo_users(), policy));
    let state = ApiState {
        hub,
        started_at: Instant::now(),
    };
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let port = listener.local_addr()?.port();
    tokio::spawn(async move {
        let _ = beckon_api::serve_on(state, listener).await;
    });
    Ok(port)
}

pub fn api_url(port: u16, path: &str) -> String {
    format!("http://127.0.0.1:{port}/api{path}")
}

/// One WebSocket client connection.
pub struct Client {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl Client {
    pub async fn connect(port: u16) -> Result<Self> {
        let (ws, _) = connect_async(format!("ws://127.0.0.1:{port}/ws"))
            .await
            .context("websocket connect failed")?;
        Ok(Self { ws })
    }

    pub async fn send(&mut self, event: &ClientEvent) -> Result<()> {
        let text = serde_json::to_string(event)?;
        self.ws
            .send(Message::text(text))
            .await
            .context("websocket send failed")
    }

    /// Next server event, failing after RECV_TIMEOUT.
    pub async fn recv(&mut self) -> Result<ServerEvent> {
        loop {
            let frame = tokio::time::timeout(RECV_TIMEOUT, self.ws.next())
                .await
                .context("timed out waiting for a server event")?
                .context("connection closed")?
                .context("websocket read failed")?;
            match frame {
                Message::Text(text) => {
                    return serde_json::from_str(text.as_str())
                        .context("unparseable server event");
                }
                Message::Close(_) => bail!("connection closed"),
                _ => continue,
            }
        }
    }

    /// Next non-presence event, skipping interleaved presence refreshes.
    pub async fn recv_event(&mut self) -> Result<ServerEvent> {
        loop {
            match self.recv().await? {
                ServerEvent::PresenceUpdate { .. } => continue,
                other => return Ok(other),
            }
        }
    }

    /// Assert nothing at all arrives for a while.
    pub async fn expect_silence(&mut self) -> Result<()> {
        match tokio::time::timeout(Duration::from_millis(300), self.ws.next()).await {
            Err(_) => Ok(()),
            Ok(Some(Ok(Message::Text(text)))) => bail!("unexpected event: {}", text.as_str()),
            Ok(Some(Ok(_))) => bail!("unexpected frame"),
            Ok(Some(Err(e))) => bail!("websocket error: {e}"),
            Ok(None) => bail!("connection closed"),
        }
    }

    /// Log in and consume the login_success plus the first presence refresh.
    pub async fn login(&mut self, user_id: &str) -> Result<()> {
        self.send(&ClientEvent::Login {
            user_id: user_id.to_string(),
        })
        .await?;
        match self.recv().await? {
            ServerEvent::LoginSuccess { user } if user.id == user_id => {}
            other => bail!("expected login_success for {user_id}, got {other:?}"),
        }
        match self.recv().await? {
            ServerEvent::PresenceUpdate { .. } => {}
            other => bail!("expected presence_update, got {other:?}"),
        }
        Ok(())
    }

    pub async fn close(mut self) {
        let _ = self.ws.close(None).await;
    }
}

// ── Smoke test ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn server_boots_and_reports_status() -> Result<()> {
    let port = start_server().await?;

    let status: serde_json::Value = reqwest::get(api_url(port, "/status"))
        .await?
        .json()
        .await?;

    assert_eq!(status["online"], 0);
    assert_eq!(status["registered_users"], 3);
    Ok(())
}
