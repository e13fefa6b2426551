// SPDX-FileCopyrightText: 2026 Telerelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed signaling payloads.
//!
//! On the wire a message carries a `type` string and an untyped `data` value.
//! [`Signal::from_parts`] checks that the value has the shape its type
//! requires; unrecognized types pass through as [`Signal::Custom`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use telerelay_core::TelerelayError;

/// SDP offer or answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDescription {
    /// `offer` or `answer` when the client includes it.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub sdp_type: Option<String>,
    pub sdp: String,
}

/// A trickled ICE candidate. An empty `candidate` marks end-of-candidates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IceCandidate {
    pub candidate: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdp_mid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdp_m_line_index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username_fragment: Option<String>,
}

/// Clients send candidates either bare or wrapped in `{candidate: {...}}`.
/// The shape they used is kept so the receiving client sees what it expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IcePayload {
    Wrapped { candidate: IceCandidate },
    Bare(IceCandidate),
}

impl IcePayload {
    pub fn candidate(&self) -> &IceCandidate {
        match self {
            Self::Wrapped { candidate } | Self::Bare(candidate) => candidate,
        }
    }
}

/// Payload of `user-joined` and `user-left`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Presence {
    pub user_type: String,
}

/// Free-form call-control record (`incoming-call` and friends).
pub type CallDetails = Map<String, Value>;

/// A signaling payload, keyed by its wire `type`.
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    Offer(SessionDescription),
    Answer(SessionDescription),
    IceCandidate(IcePayload),
    UserJoined(Presence),
    UserLeft(Presence),
    IncomingCall(CallDetails),
    PatientJoined(CallDetails),
    CallRejected(CallDetails),
    CallEnded(CallDetails),
    /// Any other type, relayed verbatim.
    Custom { kind: String, data: Value },
}

impl Signal {
    /// Validate `data` against the shape required by `kind`.
    pub fn from_parts(kind: &str, data: Value) -> Result<Self, TelerelayError> {
        let signal = match kind {
            "" => return Err(TelerelayError::MissingField("type".to_string())),
            "offer" => Self::Offer(session_description(kind, data)?),
            "answer" => Self::Answer(session_description(kind, data)?),
            "ice-candidate" => Self::IceCandidate(parse(kind, data)?),
            "user-joined" => Self::UserJoined(parse(kind, data)?),
            "user-left" => Self::UserLeft(parse(kind, data)?),
            "incoming-call" => Self::IncomingCall(call_details(kind, data)?),
            "patient-joined" => Self::PatientJoined(call_details(kind, data)?),
            "call-rejected" => Self::CallRejected(call_details(kind, data)?),
            "call-ended" => Self::CallEnded(call_details(kind, data)?),
            other => Self::Custom {
                kind: other.to_string(),
                data,
            },
        };
        Ok(signal)
    }

    /// The wire `type` string.
    pub fn kind(&self) -> &str {
        match self {
            Self::Offer(_) => "offer",
            Self::Answer(_) => "answer",
            Self::IceCandidate(_) => "ice-candidate",
            Self::UserJoined(_) => "user-joined",
            Self::UserLeft(_) => "user-left",
            Self::IncomingCall(_) => "incoming-call",
            Self::PatientJoined(_) => "patient-joined",
            Self::CallRejected(_) => "call-rejected",
            Self::CallEnded(_) => "call-ended",
            Self::Custom { kind, .. } => kind.as_str(),
        }
    }

    /// The wire `data` value.
    pub fn to_data(&self) -> Value {
        // These payloads are plain structs and string-keyed maps, which always
        // serialize; `Null` is unreachable in practice.
        let value = match self {
            Self::Offer(desc) | Self::Answer(desc) => serde_json::to_value(desc),
            Self::IceCandidate(ice) => serde_json::to_value(ice),
            Self::UserJoined(presence) | Self::UserLeft(presence) => {
                serde_json::to_value(presence)
            }
            Self::IncomingCall(details)
            | Self::PatientJoined(details)
            | Self::CallRejected(details)
            | Self::CallEnded(details) => return Value::Object(details.clone()),
            Self::Custom { data, .. } => return data.clone(),
        };
        value.unwrap_or_default()
    }

    /// Presence broadcast for a participant entering a room.
    pub fn user_joined(user_type: impl Into<String>) -> Self {
        Self::UserJoined(Presence {
            user_type: user_type.into(),
        })
    }

    /// Presence broadcast for a participant leaving (or being evicted from) a room.
    pub fn user_left(user_type: impl Into<String>) -> Self {
        Self::UserLeft(Presence {
            user_type: user_type.into(),
        })
    }
}

fn invalid(kind: &str, message: impl Into<String>) -> TelerelayError {
    TelerelayError::InvalidPayload {
        kind: kind.to_string(),
        message: message.into(),
    }
}

fn parse<T: DeserializeOwned>(kind: &str, data: Value) -> Result<T, TelerelayError> {
    serde_json::from_value(data).map_err(|e| invalid(kind, e.to_string()))
}

fn session_description(kind: &str, data: Value) -> Result<SessionDescription, TelerelayError> {
    let desc: SessionDescription = parse(kind, data)?;
    if desc.sdp.trim().is_empty() {
        return Err(invalid(kind, "sdp must not be empty"));
    }
    Ok(desc)
}

fn call_details(kind: &str, data: Value) -> Result<CallDetails, TelerelayError> {
    match data {
        Value::Null => Ok(Map::new()),
        Value::Object(map) => Ok(map),
        other => Err(invalid(
            kind,
            format!("expected an object, found {}", json_type(&other)),
        )),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
