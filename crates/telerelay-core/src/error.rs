// SPDX-FileCopyrightText: 2026 Telerelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for telerelay.

use thiserror::Error;

/// The primary error type shared by the relay, gateway, monitor and client.
#[derive(Debug, Error)]
pub enum TelerelayError {
    /// Configuration errors (invalid values discovered after loading).
    #[error("configuration error: {0}")]
    Config(String),

    /// A required request field was absent or empty.
    #[error("missing required field: {0}")]
    MissingField(String),

    /// The request body or query string could not be parsed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A signal payload did not match the shape required by its type tag.
    #[error("invalid payload for `{kind}`: {message}")]
    InvalidPayload { kind: String, message: String },

    /// The room does not exist (only an error for operations that need it).
    #[error("room not found: {0}")]
    RoomNotFound(String),

    /// Reading transport statistics from a peer connection failed.
    #[error("stats unavailable: {message}")]
    Stats {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Delivering a quality report to the reporting sink failed.
    #[error("report delivery failed: {message}")]
    Report {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Network transport errors (bind failure, HTTP client failure).
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl TelerelayError {
    /// True for errors caused by the caller's request rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::MissingField(_)
                | Self::InvalidRequest(_)
                | Self::InvalidPayload { .. }
                | Self::RoomNotFound(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(
            TelerelayError::MissingField("roomId".into()).to_string(),
            "missing required field: roomId"
        );
        assert_eq!(
            TelerelayError::RoomNotFound("consult-42".into()).to_string(),
            "room not found: consult-42"
        );
        let err = TelerelayError::InvalidPayload {
            kind: "offer".into(),
            message: "sdp must not be empty".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid payload for `offer`: sdp must not be empty"
        );
    }

    #[test]
    fn client_errors_are_classified() {
        assert!(TelerelayError::MissingField("from".into()).is_client_error());
        assert!(TelerelayError::RoomNotFound("r".into()).is_client_error());
        assert!(!TelerelayError::Internal("boom".into()).is_client_error());
        assert!(
            !TelerelayError::Stats {
                message: "closed".into(),
                source: None,
            }
            .is_client_error()
        );
    }
}
