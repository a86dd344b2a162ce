use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::event::iso_timestamp;

/// How an inbound request wants to be served.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Free conversation; the model may call any registered tool.
    #[default]
    Chat,
    /// A specific tool was selected and must be invoked.
    Tool,
}

impl Mode {
    /// Anything other than an explicit `"tool"` is treated as chat.
    pub fn from_wire(value: Option<&str>) -> Self {
        match value {
            Some("tool") => Mode::Tool,
            _ => Mode::Chat,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Chat => write!(f, "chat"),
            Mode::Tool => write!(f, "tool"),
        }
    }
}

/// Speaker of a conversation turn.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A labeled payload to send to the bridge target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instruction {
    pub label: String,
    pub payload: Map<String, Value>,
}

impl Instruction {
    pub fn new(label: impl Into<String>, payload: Map<String, Value>) -> Self {
        Self {
            label: label.into(),
            payload,
        }
    }

    /// The `op` field of the payload, if any.
    pub fn op(&self) -> Option<&str> {
        self.payload.get("op").and_then(Value::as_str)
    }
}

/// Normalized outcome of one bridge dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstructionResult {
    pub ok: bool,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub duration_ms: u64,
    pub payload: Map<String, Value>,
}

/// One prior turn of the conversation, flattened to text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl ChatTurn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            label: None,
            mode: None,
            timestamp: None,
        }
    }
}

/// Metadata attached to the `start` and `finish` events of one run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrchestrationMetadata {
    pub mode: Mode,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ok: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl OrchestrationMetadata {
    pub fn new(mode: Mode, label: impl Into<String>, tool_id: Option<String>) -> Self {
        Self {
            mode,
            label: label.into(),
            tool_id,
            ok: None,
            error: None,
            duration_ms: None,
            timestamp: None,
        }
    }

    /// Stamp the outcome fields for a `finish` event.
    pub fn finished(mut self, ok: bool, error: Option<String>, duration_ms: u64) -> Self {
        self.ok = Some(ok);
        self.error = error;
        self.duration_ms = Some(duration_ms);
        self.timestamp = Some(iso_timestamp());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_mode_from_wire() {
        assert_eq!(Mode::from_wire(Some("tool")), Mode::Tool);
        assert_eq!(Mode::from_wire(Some("chat")), Mode::Chat);
        assert_eq!(Mode::from_wire(Some("bogus")), Mode::Chat);
        assert_eq!(Mode::from_wire(None), Mode::Chat);
    }

    #[test]
    fn test_instruction_result_wire_shape() {
        let mut payload = Map::new();
        payload.insert("op".into(), json!("ping"));
        let result = InstructionResult {
            ok: false,
            label: "Ping".into(),
            response: None,
            error: Some("boom".into()),
            duration_ms: 3,
            payload,
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["durationMs"], 3);
        assert_eq!(value["error"], "boom");
        assert!(value.get("response").is_none());
    }

    #[test]
    fn test_finished_metadata_carries_outcome() {
        let meta = OrchestrationMetadata::new(Mode::Tool, "Run Python Script", None)
            .finished(true, None, 42);
        assert_eq!(meta.ok, Some(true));
        assert_eq!(meta.duration_ms, Some(42));
        assert!(meta.timestamp.is_some());

        let value = serde_json::to_value(&meta).unwrap();
        assert_eq!(value["mode"], "tool");
        assert!(value.get("toolId").is_none());
    }
}
