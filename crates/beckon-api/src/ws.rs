//! WebSocket endpoint — one connection task per client.
//!
//! The task owns the socket and the session's outbound queue. Inbound
//! frames are decoded into client events and handed to the hub; everything
//! the hub wants to push comes back through the queue and is written by a
//! dedicated writer task, so a slow reader never blocks the hub.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use beckon_core::{ClientEvent, ServerEvent, SignalingError, UserId};
use beckon_services::{SessionHandle, SignalingHub};

use crate::handlers::ApiState;

pub async fn handle_upgrade(State(state): State<ApiState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| connection_loop(state, socket))
}

async fn connection_loop(state: ApiState, socket: WebSocket) {
    let hub = state.hub;
    let session_id = hub.next_session_id();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let session = SessionHandle::new(session_id, tx);
    let (mut sink, mut stream) = socket.split();

    tracing::debug!(session_id, "connection opened");

    let writer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let text = match serde_json::to_string(&event) {
                Ok(text) => text,
                Err(err) => {
                    tracing::error!(%err, "server event failed to serialize");
                    continue;
                }
            };
            if sink.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    // The identity this connection successfully logged in as, if any.
    let mut bound: Option<UserId> = None;

    while let Some(frame) = stream.next().await {
        let frame = match frame {
            Ok(frame) => frame,
            Err(err) => {
                tracing::debug!(session_id, %err, "socket error, closing");
                break;
            }
        };
        match frame {
            Message::Text(text) => {
                match serde_json::from_str::<ClientEvent>(text.as_str()) {
                    Ok(event) => handle_event(&hub, &session, &mut bound, event),
                    Err(err) => {
                        tracing::warn!(session_id, %err, "malformed client event dropped");
                    }
                }
            }
            Message::Close(_) => break,
            // Ping/pong are answered by the transport layer.
            _ => {}
        }
    }

    if let Some(user_id) = bound {
        hub.disconnect(&user_id, session_id);
    }
    writer.abort();
    tracing::debug!(session_id, "connection closed");
}

fn handle_event(
    hub: &SignalingHub,
    session: &SessionHandle,
    bound: &mut Option<UserId>,
    event: ClientEvent,
) {
    match event {
        ClientEvent::Login { user_id } => {
            if let Some(current) = bound.as_deref() {
                if current != user_id {
                    session.send(ServerEvent::LoginError {
                        reason: "already logged in".to_string(),
                    });
                    return;
                }
            }
            match hub.login(session, &user_id) {
                Ok(_) => *bound = Some(user_id),
                Err(err) => session.send(ServerEvent::LoginError {
                    reason: err.to_string(),
                }),
            }
        }
        ClientEvent::CallRequest { callee_id } => {
            let Some(caller) = bound.as_deref() else {
                send_not_logged_in(session);
                return;
            };
            if let Err(err) = hub.call_request(caller, session.id(), &callee_id) {
                session.send(ServerEvent::CallRejected {
                    reason: err.to_string(),
                });
            }
        }
        ClientEvent::Signal {
            recipient_id,
            payload,
        } => {
            let Some(sender) = bound.as_deref() else {
                send_not_logged_in(session);
                return;
            };
            hub.signal(sender, session.id(), &recipient_id, payload);
        }
        ClientEvent::Reject => {
            let Some(user_id) = bound.as_deref() else {
                send_not_logged_in(session);
                return;
            };
            hub.reject(user_id, session.id());
        }
        ClientEvent::Hangup => {
            let Some(user_id) = bound.as_deref() else {
                send_not_logged_in(session);
                return;
            };
            hub.hangup(user_id, session.id());
        }
    }
}

fn send_not_logged_in(session: &SessionHandle) {
    session.send(ServerEvent::LoginError {
        reason: SignalingError::NotLoggedIn.to_string(),
    });
}
