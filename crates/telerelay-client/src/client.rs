// SPDX-FileCopyrightText: 2026 Telerelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request/response plumbing for each signaling endpoint.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use telerelay_config::model::ClientConfig;
use telerelay_core::TelerelayError;
use telerelay_relay::{JoinOutcome, OutgoingMessage, PollBatch, RelayMessage, RoomSnapshot};

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthInfo {
    pub status: String,
    pub time: String,
    pub service: String,
    #[serde(default)]
    pub uptime_secs: u64,
    #[serde(default)]
    pub rooms: usize,
    #[serde(default)]
    pub participants: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JoinBody<'a> {
    room_id: &'a str,
    user_id: &'a str,
    user_type: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LeaveBody<'a> {
    room_id: &'a str,
    user_id: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MessageBody<'a> {
    room_id: &'a str,
    from: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    to: Option<&'a str>,
    #[serde(rename = "type")]
    kind: &'a str,
    data: Value,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PingBody<'a> {
    user_id: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JoinReply {
    room_state: JoinOutcome,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessageReply {
    message_id: i64,
}

#[derive(Deserialize)]
struct PingReply {
    timestamp: i64,
}

#[derive(Deserialize)]
struct ErrorReply {
    error: String,
}

/// Client for one relay endpoint.
///
/// Holds the poll cursor. A successful [`join`](Self::join) moves it to the
/// join point so earlier room history is skipped; each successful
/// [`poll`](Self::poll) advances it to the returned `timestamp`, so
/// consecutive polls never repeat a message.
#[derive(Debug)]
pub struct RelayClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
    cursor: AtomicI64,
}

impl RelayClient {
    /// `base_url` is the relay origin, e.g. `http://127.0.0.1:8787`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, TelerelayError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TelerelayError::Transport {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            http,
            base_url,
            timeout,
            cursor: AtomicI64::new(0),
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, TelerelayError> {
        Self::new(
            config.signaling_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Cursor the next poll sends as `since`.
    pub fn cursor(&self) -> i64 {
        self.cursor.load(Ordering::SeqCst)
    }

    pub fn set_cursor(&self, since: i64) {
        self.cursor.store(since, Ordering::SeqCst);
    }

    pub async fn health(&self) -> Result<HealthInfo, TelerelayError> {
        let resp = self.send_request(self.http.get(self.url("/health")?)).await?;
        decode(resp, None).await
    }

    /// Join `room_id`; returns the participants already present and resets the
    /// poll cursor to the join point.
    pub async fn join(
        &self,
        room_id: &str,
        user_id: &str,
        user_type: &str,
    ) -> Result<JoinOutcome, TelerelayError> {
        let body = JoinBody {
            room_id,
            user_id,
            user_type,
        };
        let resp = self
            .send_request(self.http.post(self.url("/api/join")?).json(&body))
            .await?;
        let reply: JoinReply = decode(resp, Some(room_id)).await?;
        self.set_cursor(reply.room_state.timestamp);
        debug!(room_id, user_id, peers = reply.room_state.users.len(), "joined room");
        Ok(reply.room_state)
    }

    pub async fn leave(&self, room_id: &str, user_id: &str) -> Result<(), TelerelayError> {
        let body = LeaveBody { room_id, user_id };
        let resp = self
            .send_request(self.http.post(self.url("/api/leave")?).json(&body))
            .await?;
        decode::<Value>(resp, Some(room_id)).await.map(|_| ())
    }

    /// Post a signal; returns the relay-assigned message id.
    pub async fn send(&self, message: &OutgoingMessage) -> Result<i64, TelerelayError> {
        let body = MessageBody {
            room_id: &message.room_id,
            from: &message.from,
            to: message.to.as_deref(),
            kind: message.signal.kind(),
            data: message.signal.to_data(),
        };
        let resp = self
            .send_request(self.http.post(self.url("/api/message")?).json(&body))
            .await?;
        let reply: MessageReply = decode(resp, Some(&message.room_id)).await?;
        Ok(reply.message_id)
    }

    /// Fetch messages newer than the cursor and advance it.
    pub async fn poll(&self, room_id: &str, user_id: &str) -> Result<Vec<RelayMessage>, TelerelayError> {
        let since = self.cursor().to_string();
        let url = Url::parse_with_params(
            &format!("{}/api/poll", self.base_url),
            &[("roomId", room_id), ("userId", user_id), ("since", since.as_str())],
        )
        .map_err(|e| TelerelayError::InvalidRequest(format!("invalid relay URL: {e}")))?;

        let resp = self.send_request(self.http.get(url)).await?;
        let batch: PollBatch = decode(resp, Some(room_id)).await?;
        self.set_cursor(batch.timestamp);
        Ok(batch.messages)
    }

    /// Refresh the heartbeat; returns the relay's clock.
    pub async fn ping(&self, user_id: &str) -> Result<i64, TelerelayError> {
        let resp = self
            .send_request(self.http.post(self.url("/api/ping")?).json(&PingBody { user_id }))
            .await?;
        let reply: PingReply = decode(resp, None).await?;
        Ok(reply.timestamp)
    }

    pub async fn room_info(&self, room_id: &str) -> Result<RoomSnapshot, TelerelayError> {
        let url = Url::parse_with_params(&format!("{}/api/room", self.base_url), &[("roomId", room_id)])
            .map_err(|e| TelerelayError::InvalidRequest(format!("invalid relay URL: {e}")))?;
        let resp = self.send_request(self.http.get(url)).await?;
        decode(resp, Some(room_id)).await
    }

    fn url(&self, path: &str) -> Result<Url, TelerelayError> {
        Url::parse(&format!("{}{path}", self.base_url))
            .map_err(|e| TelerelayError::InvalidRequest(format!("invalid relay URL: {e}")))
    }

    async fn send_request(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, TelerelayError> {
        request.send().await.map_err(|e| {
            if e.is_timeout() {
                TelerelayError::Timeout {
                    duration: self.timeout,
                }
            } else {
                TelerelayError::Transport {
                    message: format!("relay request failed: {e}"),
                    source: Some(Box::new(e)),
                }
            }
        })
    }
}

/// Decode a success body, or map the relay's `{error}` reply onto the error type.
async fn decode<T: DeserializeOwned>(
    resp: reqwest::Response,
    room_id: Option<&str>,
) -> Result<T, TelerelayError> {
    let status = resp.status();
    let body = resp.text().await.map_err(|e| TelerelayError::Transport {
        message: format!("failed to read relay response: {e}"),
        source: Some(Box::new(e)),
    })?;

    if status.is_success() {
        return serde_json::from_str(&body).map_err(|e| TelerelayError::Transport {
            message: format!("failed to parse relay response: {e}"),
            source: Some(Box::new(e)),
        });
    }

    let message = serde_json::from_str::<ErrorReply>(&body)
        .map(|r| r.error)
        .unwrap_or(body);
    Err(match (status, room_id) {
        (StatusCode::BAD_REQUEST, _) => TelerelayError::InvalidRequest(message),
        (StatusCode::NOT_FOUND, Some(room_id)) => TelerelayError::RoomNotFound(room_id.to_string()),
        _ => TelerelayError::Transport {
            message: format!("relay returned {status}: {message}"),
            source: None,
        },
    })
}
