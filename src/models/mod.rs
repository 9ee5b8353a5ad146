//! Inbound frame models for the OFS order-book feed.
//!
//! The feed sends JSON text frames in one of three shapes:
//! - heartbeat: `{"type": "ping"}`
//! - snapshot: `{"data": [rows...], "meta": {...}}`
//! - legacy snapshot: a bare `[rows...]` array with no metadata

pub mod book;

use serde::Deserialize;
use serde_json::Value;

use crate::Result;
use crate::error::OfsError;
use book::{BookMeta, ClientSnapshot, OrderBookRow};

/// A classified inbound frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundFrame {
    /// Liveness probe carrying no book data.
    Heartbeat,
    /// A full replacement snapshot.
    Snapshot(ClientSnapshot),
}

/// The `{"data": ..., "meta": ...}` envelope.
#[derive(Deserialize)]
struct SnapshotEnvelope {
    data: Vec<OrderBookRow>,
    #[serde(default)]
    meta: Option<BookMeta>,
}

/// Parses a text frame into an [`InboundFrame`].
///
/// # Errors
///
/// Returns [`OfsError::Json`] if the frame is not valid JSON, or
/// [`OfsError::MalformedFrame`] if it is JSON without a recognizable
/// snapshot or heartbeat shape.
pub fn parse_frame(text: &str) -> Result<InboundFrame> {
    let value: Value = serde_json::from_str(text)?;

    match value {
        Value::Array(_) => {
            let rows: Vec<OrderBookRow> = serde_json::from_value(value)
                .map_err(|e| OfsError::MalformedFrame(format!("invalid legacy row array: {e}")))?;
            Ok(InboundFrame::Snapshot(ClientSnapshot {
                rows,
                meta: BookMeta::default(),
            }))
        }
        Value::Object(ref map) => {
            if map.get("type").and_then(Value::as_str) == Some("ping") {
                return Ok(InboundFrame::Heartbeat);
            }

            match map.get("data") {
                None | Some(Value::Null) => Err(OfsError::MalformedFrame(
                    "frame has no `data` field".to_string(),
                )),
                Some(_) => {
                    let envelope: SnapshotEnvelope = serde_json::from_value(value)
                        .map_err(|e| OfsError::MalformedFrame(format!("invalid snapshot: {e}")))?;
                    Ok(InboundFrame::Snapshot(ClientSnapshot {
                        rows: envelope.data,
                        meta: envelope.meta.unwrap_or_default(),
                    }))
                }
            }
        }
        other => Err(OfsError::MalformedFrame(format!(
            "expected an object or array, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
