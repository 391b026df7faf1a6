//! Streaming client for the instance's WebSocket API.
//!
//! Connects to `{host}/streaming?i=<token>`, subscribes to the `main`
//! channel and forwards decoded events into an mpsc channel. The connection
//! is re-established with capped exponential backoff until cancelled.

use std::time::Duration;

use chirpbot_types::error::ApiError;
use chirpbot_types::note::{DirectMessage, Note, Notification, StreamEvent};
use futures_util::{SinkExt, StreamExt};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Outer frame: `{"type": "channel", "body": {...}}`.
#[derive(Debug, Deserialize)]
struct Frame {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    body: Value,
}

/// Channel frame body: `{"id": ..., "type": "mention", "body": {...}}`.
#[derive(Debug, Deserialize)]
struct ChannelBody {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    body: Value,
}

/// Why a connection ended.
enum Disconnect {
    Cancelled,
    Closed,
    Failed(ApiError),
}

pub struct StreamClient {
    host: String,
    token: SecretString,
}

impl StreamClient {
    pub fn new(host: impl Into<String>, token: SecretString) -> Self {
        Self {
            host: host.into().trim_end_matches('/').to_string(),
            token,
        }
    }

    /// Stream events into `events` until `cancel` fires or the receiver is
    /// dropped.
    pub async fn run(self, events: mpsc::Sender<StreamEvent>, cancel: CancellationToken) {
        let mut backoff = INITIAL_BACKOFF;

        loop {
            match self.session(&events, &cancel, &mut backoff).await {
                Disconnect::Cancelled => break,
                Disconnect::Closed => info!("stream closed by server, reconnecting"),
                Disconnect::Failed(e) => warn!(error = %e, retry_in = ?backoff, "stream failed"),
            }
            if events.is_closed() {
                break;
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(backoff) => {}
            }
            backoff = (backoff * 2).min(MAX_BACKOFF);
        }
        debug!("stream client stopped");
    }

    /// One connection: connect, subscribe, forward frames.
    async fn session(
        &self,
        events: &mpsc::Sender<StreamEvent>,
        cancel: &CancellationToken,
        backoff: &mut Duration,
    ) -> Disconnect {
        let url = streaming_url(&self.host, self.token.expose_secret());
        let connected = tokio::select! {
            _ = cancel.cancelled() => return Disconnect::Cancelled,
            result = connect_async(url.as_str()) => result,
        };
        let (ws, _) = match connected {
            Ok(pair) => pair,
            Err(e) => return Disconnect::Failed(ApiError::Stream(format!("connect: {e}"))),
        };
        let (mut sink, mut stream) = ws.split();

        let subscribe = connect_frame(&Uuid::now_v7().to_string());
        if let Err(e) = sink.send(WsMessage::Text(subscribe.to_string().into())).await {
            return Disconnect::Failed(ApiError::Stream(format!("subscribe: {e}")));
        }
        info!(host = %self.host, "connected to main channel");
        *backoff = INITIAL_BACKOFF;

        loop {
            let frame = tokio::select! {
                _ = cancel.cancelled() => {
                    let _ = sink.send(WsMessage::Close(None)).await;
                    return Disconnect::Cancelled;
                }
                frame = stream.next() => frame,
            };

            match frame {
                Some(Ok(WsMessage::Text(text))) => match decode_frame(text.as_str()) {
                    Ok(Some(event)) => {
                        debug!(kind = event.kind(), "stream event");
                        if events.send(event).await.is_err() {
                            return Disconnect::Cancelled;
                        }
                    }
                    Ok(None) => {}
                    Err(e) => warn!(error = %e, "undecodable stream frame"),
                },
                Some(Ok(WsMessage::Ping(payload))) => {
                    if let Err(e) = sink.send(WsMessage::Pong(payload)).await {
                        return Disconnect::Failed(ApiError::Stream(format!("pong: {e}")));
                    }
                }
                Some(Ok(WsMessage::Close(_))) | None => return Disconnect::Closed,
                Some(Ok(_)) => {}
                Some(Err(e)) => return Disconnect::Failed(ApiError::Stream(e.to_string())),
            }
        }
    }
}

impl std::fmt::Debug for StreamClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamClient").field("host", &self.host).finish_non_exhaustive()
    }
}

/// `https://host` becomes `wss://host/streaming?i=<token>`.
pub fn streaming_url(host: &str, token: &str) -> String {
    let ws_host = if let Some(rest) = host.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = host.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        host.to_string()
    };
    format!("{ws_host}/streaming?i={token}")
}

fn connect_frame(id: &str) -> Value {
    json!({
        "type": "connect",
        "body": { "channel": "main", "id": id }
    })
}

/// Decode a text frame. `Ok(None)` for frames and event kinds the agent
/// does not consume.
pub fn decode_frame(text: &str) -> Result<Option<StreamEvent>, ApiError> {
    let frame: Frame = serde_json::from_str(text).map_err(|e| ApiError::Decode(e.to_string()))?;
    if frame.kind != "channel" {
        return Ok(None);
    }
    let channel: ChannelBody =
        serde_json::from_value(frame.body).map_err(|e| ApiError::Decode(e.to_string()))?;

    let decode_err = |e: serde_json::Error| ApiError::Decode(format!("{} on {}: {e}", channel.kind, channel.id));
    let event = match channel.kind.as_str() {
        "mention" => StreamEvent::Mention(serde_json::from_value::<Note>(channel.body).map_err(decode_err)?),
        "reply" => StreamEvent::Reply(serde_json::from_value::<Note>(channel.body).map_err(decode_err)?),
        "renote" => StreamEvent::Renote(serde_json::from_value::<Note>(channel.body).map_err(decode_err)?),
        "messagingMessage" => StreamEvent::DirectMessage(
            serde_json::from_value::<DirectMessage>(channel.body).map_err(decode_err)?,
        ),
        "notification" => StreamEvent::Notification(
            serde_json::from_value::<Notification>(channel.body).map_err(decode_err)?,
        ),
        _ => return Ok(None),
    };
    Ok(Some(event))
}
