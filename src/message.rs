//! Client Message Protocol
//!
//! JSON messages exchanged with connected browser sessions. Inbound
//! messages arrive from pages (`{"type":"SKIP_WAITING"}`); outbound
//! messages are pushed by the policy on deferred sync.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use chrono::{DateTime, SecondsFormat};
use serde::{Deserialize, Serialize};

/// Deferred-sync tag raised by the environment when connectivity returns.
pub const SYNC_TRAINING_DATA: &str = "sync-training-data";

/// Messages clients send to the worker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum InboundMessage {
    /// Activate the waiting version without waiting for sessions to close
    #[serde(rename = "SKIP_WAITING")]
    SkipWaiting,
}

/// Messages the worker pushes to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OutboundMessage {
    /// Connectivity is back; queued training data should be flushed
    #[serde(rename = "SYNC_TRAINING_DATA")]
    SyncTrainingData {
        /// ISO-8601 timestamp of the notification
        timestamp: String,
    },
}

/// Message codec error types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageError {
    /// The payload was not a recognized message
    Malformed(String),
}

/// Decode an inbound client message
pub fn decode_inbound(bytes: &[u8]) -> Result<InboundMessage, MessageError> {
    serde_json::from_slice(bytes).map_err(|e| MessageError::Malformed(e.to_string()))
}

/// Encode an outbound message for delivery
pub fn encode_outbound(message: &OutboundMessage) -> Result<Vec<u8>, MessageError> {
    serde_json::to_vec(message).map_err(|e| MessageError::Malformed(e.to_string()))
}

/// Format an epoch-milliseconds timestamp as ISO-8601 (UTC, `Z` suffix).
pub fn iso8601(epoch_ms: u64) -> String {
    let datetime = i64::try_from(epoch_ms)
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .unwrap_or(DateTime::UNIX_EPOCH);
    datetime.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_skip_waiting() {
        let message = decode_inbound(br#"{"type":"SKIP_WAITING"}"#).unwrap();
        assert_eq!(message, InboundMessage::SkipWaiting);
    }

    #[test]
    fn test_decode_unknown_type_rejected() {
        assert!(decode_inbound(br#"{"type":"UNKNOWN"}"#).is_err());
        assert!(decode_inbound(b"not json").is_err());
        assert!(decode_inbound(br#"{"kind":"SKIP_WAITING"}"#).is_err());
    }

    #[test]
    fn test_encode_sync_message_shape() {
        let message = OutboundMessage::SyncTrainingData {
            timestamp: iso8601(0),
        };
        let bytes = encode_outbound(&message).unwrap();
        let text = core::str::from_utf8(&bytes).unwrap();
        assert_eq!(
            text,
            r#"{"type":"SYNC_TRAINING_DATA","timestamp":"1970-01-01T00:00:00.000Z"}"#
        );
    }

    #[test]
    fn test_outbound_round_trip() {
        let message = OutboundMessage::SyncTrainingData {
            timestamp: iso8601(1_700_000_000_000),
        };
        let bytes = encode_outbound(&message).unwrap();
        let back: OutboundMessage = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(back, message);
    }

    #[test]
    fn test_iso8601_formatting() {
        assert_eq!(iso8601(0), "1970-01-01T00:00:00.000Z");
        assert_eq!(iso8601(1_500), "1970-01-01T00:00:01.500Z");
    }

    #[test]
    fn test_sync_tag_constant() {
        assert_eq!(SYNC_TRAINING_DATA, "sync-training-data");
    }
}
