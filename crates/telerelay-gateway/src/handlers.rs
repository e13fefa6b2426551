// SPDX-FileCopyrightText: 2026 Telerelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the signaling API.
//!
//! Request fields are optional at the serde level so that absent and empty
//! values both surface as a "missing required field" error naming every
//! missing field, rather than a generic deserialization failure.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use telerelay_core::TelerelayError;
use telerelay_relay::{require_fields, JoinOutcome, OutgoingMessage, PollBatch, RoomSnapshot, Signal};

use crate::error::{not_found, ApiError};
use crate::server::GatewayState;

/// Request body for POST /api/join.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRequest {
    #[serde(default)]
    pub room_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub user_type: Option<String>,
}

/// Request body for POST /api/leave.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequest {
    #[serde(default)]
    pub room_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Request body for POST /api/message.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRequest {
    #[serde(default)]
    pub room_id: Option<String>,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub data: Value,
}

/// Request body for POST /api/ping.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PingRequest {
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Query string for GET /api/poll.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollQuery {
    pub room_id: Option<String>,
    pub user_id: Option<String>,
    pub since: Option<String>,
}

/// Query string for GET /api/room.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomQuery {
    pub room_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinResponse {
    pub success: bool,
    pub room_state: JoinOutcome,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub success: bool,
    pub message_id: i64,
}

#[derive(Debug, Serialize)]
pub struct PingResponse {
    pub success: bool,
    pub timestamp: i64,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    /// RFC 3339 server time.
    pub time: String,
    pub service: String,
    pub uptime_secs: u64,
    pub rooms: usize,
    pub participants: usize,
}

fn text(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}

/// GET /health
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    let stats = state.relay.stats().await;
    Json(HealthResponse {
        status: "ok".to_string(),
        time: chrono::Utc::now().to_rfc3339(),
        service: state.health.service_name.clone(),
        uptime_secs: state.health.start_time.elapsed().as_secs(),
        rooms: stats.rooms,
        participants: stats.participants,
    })
}

/// GET /metrics
///
/// Prometheus text when a recorder is installed, 404 otherwise.
pub async fn get_metrics(State(state): State<GatewayState>) -> Response {
    match &state.health.prometheus_render {
        Some(render) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            render(),
        )
            .into_response(),
        None => not_found(),
    }
}

/// POST /api/join
pub async fn post_join(
    State(state): State<GatewayState>,
    body: Result<Json<JoinRequest>, JsonRejection>,
) -> Result<Json<JoinResponse>, ApiError> {
    let Json(req) = body?;
    let outcome = state
        .relay
        .join(text(&req.room_id), text(&req.user_id), text(&req.user_type))
        .await?;
    Ok(Json(JoinResponse {
        success: true,
        room_state: outcome,
    }))
}

/// POST /api/leave
pub async fn post_leave(
    State(state): State<GatewayState>,
    body: Result<Json<LeaveRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let Json(req) = body?;
    state
        .relay
        .leave(text(&req.room_id), text(&req.user_id))
        .await?;
    Ok(Json(SuccessResponse { success: true }))
}

/// POST /api/message
pub async fn post_message(
    State(state): State<GatewayState>,
    body: Result<Json<MessageRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(req) = body?;
    require_fields(&[
        ("roomId", text(&req.room_id)),
        ("from", text(&req.from)),
        ("type", text(&req.kind)),
    ])?;
    let signal = Signal::from_parts(text(&req.kind), req.data)?;
    let message_id = state
        .relay
        .send(OutgoingMessage {
            room_id: req.room_id.unwrap_or_default(),
            from: req.from.unwrap_or_default(),
            to: req.to,
            signal,
        })
        .await?;
    Ok(Json(MessageResponse {
        success: true,
        message_id,
    }))
}

/// GET /api/poll?roomId&userId&since
pub async fn get_poll(
    State(state): State<GatewayState>,
    query: Result<Query<PollQuery>, QueryRejection>,
) -> Result<Json<PollBatch>, ApiError> {
    let Query(query) = query?;
    let since = match query.since.as_deref().map(str::trim) {
        None | Some("") => 0,
        Some(raw) => raw.parse::<i64>().map_err(|_| {
            TelerelayError::InvalidRequest(format!("since must be an integer, got `{raw}`"))
        })?,
    };
    let batch = state
        .relay
        .poll(text(&query.room_id), text(&query.user_id), since)
        .await?;
    Ok(Json(batch))
}

/// GET /api/room?roomId
pub async fn get_room(
    State(state): State<GatewayState>,
    query: Result<Query<RoomQuery>, QueryRejection>,
) -> Result<Json<RoomSnapshot>, ApiError> {
    let Query(query) = query?;
    Ok(Json(state.relay.room_info(text(&query.room_id)).await?))
}

/// POST /api/ping
pub async fn post_ping(
    State(state): State<GatewayState>,
    body: Result<Json<PingRequest>, JsonRejection>,
) -> Result<Json<PingResponse>, ApiError> {
    let Json(req) = body?;
    let timestamp = state.relay.ping(text(&req.user_id)).await?;
    Ok(Json(PingResponse {
        success: true,
        timestamp,
    }))
}

/// Fallback for unknown routes and unsupported methods.
pub async fn fallback() -> Response {
    not_found()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_request_accepts_partial_bodies() {
        let req: MessageRequest =
            serde_json::from_str(r#"{"roomId": "r", "type": "offer"}"#).unwrap();
        assert_eq!(req.room_id.as_deref(), Some("r"));
        assert_eq!(req.kind.as_deref(), Some("offer"));
        assert!(req.from.is_none());
        assert_eq!(req.data, Value::Null);
    }

    #[test]
    fn join_response_shape() {
        let resp = JoinResponse {
            success: true,
            room_state: JoinOutcome {
                room_id: "consult-42".into(),
                users: vec![],
                timestamp: 1_700_000_000_000,
            },
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["roomState"]["roomId"], "consult-42");
        assert_eq!(json["roomState"]["users"], serde_json::json!([]));
        assert_eq!(json["roomState"]["timestamp"], 1_700_000_000_000_i64);
    }

    #[test]
    fn health_response_is_camel_case() {
        let resp = HealthResponse {
            status: "ok".into(),
            time: "2026-01-01T00:00:00Z".into(),
            service: "telerelay-http-signaling".into(),
            uptime_secs: 42,
            rooms: 1,
            participants: 2,
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"uptimeSecs\":42"));
        assert!(json.contains("\"service\":\"telerelay-http-signaling\""));
    }
}
