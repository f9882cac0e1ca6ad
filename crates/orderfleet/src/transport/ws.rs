// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Session Gateway: the single WebSocket endpoint subscribers connect to
//! for a live feed of `EventRecord`s scoped to their user id.

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, RawQuery, State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::time::{interval, Instant};

use crate::transport::auth::validate_ws_query;
use crate::state::AppState;

/// Inbound sentinel that marks a connecting client as ready; carries no
/// payload and is not otherwise acted on.
const READY_SENTINEL: &str = "runtime:ready";

/// Query parameters for the `/ws` upgrade.
#[derive(Debug, Deserialize)]
pub struct GatewayQuery {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

/// `GET /ws?userId=&token=` — upgrade to the Session Gateway. When an auth
/// token is configured, the Bearer header used on the admin HTTP API isn't
/// available during the WS handshake, so the same token is checked here as
/// a `token` query parameter instead.
pub async fn ws_handler(
    State(state): State<AppState>,
    Query(query): Query<GatewayQuery>,
    RawQuery(raw_query): RawQuery,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    if let Err(code) = validate_ws_query(raw_query.as_deref().unwrap_or(""), state.config.auth_token.as_deref()) {
        let body = crate::error::ErrorResponse { error: code.to_error_body("unauthorized") };
        return (
            axum::http::StatusCode::from_u16(code.http_status()).unwrap_or(axum::http::StatusCode::UNAUTHORIZED),
            axum::Json(body),
        )
            .into_response();
    }

    let user_id = match query.user_id.filter(|id| !id.is_empty()) {
        Some(id) => id,
        None => {
            return axum::http::Response::builder()
                .status(400)
                .body(axum::body::Body::from("missing user id"))
                .unwrap_or_default()
                .into_response();
        }
    };

    ws.max_message_size(512).on_upgrade(move |socket| handle_session(socket, state, user_id)).into_response()
}

/// Per-connection event loop: pumps the subscriber's queue to the socket,
/// pings on a fixed interval, and closes on read-deadline expiry.
async fn handle_session(socket: WebSocket, state: AppState, user_id: String) {
    let events = state.events();
    let (session_id, mut rx) = events.subscribe(user_id).await;
    let (mut ws_tx, mut ws_rx) = socket.split();

    let mut ping_interval = interval(state.config.ws_ping_interval());
    ping_interval.tick().await; // first tick fires immediately; consume it.

    let mut read_deadline = Box::pin(tokio::time::sleep(state.config.ws_read_deadline()));

    loop {
        tokio::select! {
            _ = &mut read_deadline => {
                tracing::debug!(session_id, "closing session: read deadline expired");
                break;
            }

            _ = ping_interval.tick() => {
                if ws_tx.send(Message::Ping(Vec::new().into())).await.is_err() {
                    break;
                }
            }

            msg = rx.recv() => {
                match msg {
                    Some(text) => {
                        if ws_tx.send(Message::Text(text.to_string().into())).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }

            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        read_deadline.as_mut().reset(Instant::now() + state.config.ws_read_deadline());
                        if text.as_str() != READY_SENTINEL {
                            tracing::info!(session_id, payload = %text, "discarding unrecognized gateway message");
                        }
                    }
                    Some(Ok(Message::Pong(_))) => {
                        read_deadline.as_mut().reset(Instant::now() + state.config.ws_read_deadline());
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(_)) => break,
                    _ => {}
                }
            }
        }
    }

    events.unsubscribe(session_id).await;
}
