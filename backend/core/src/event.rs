use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::OrchestrationMetadata;

/// One event of the outbound chat stream.
///
/// A complete response is always `start`, `text-start`, any number of
/// `text-delta`, `text-end`, `finish`, in that order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum StreamEvent {
    Start {
        #[serde(rename = "messageMetadata")]
        message_metadata: OrchestrationMetadata,
    },
    TextStart {
        id: String,
    },
    TextDelta {
        id: String,
        delta: String,
    },
    TextEnd {
        id: String,
    },
    Finish {
        #[serde(rename = "messageMetadata")]
        message_metadata: OrchestrationMetadata,
    },
}

impl StreamEvent {
    /// Wire name of the event (`"text-delta"`, ...).
    pub fn kind(&self) -> &'static str {
        match self {
            StreamEvent::Start { .. } => "start",
            StreamEvent::TextStart { .. } => "text-start",
            StreamEvent::TextDelta { .. } => "text-delta",
            StreamEvent::TextEnd { .. } => "text-end",
            StreamEvent::Finish { .. } => "finish",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Finish { .. })
    }
}

/// Fresh identifier for a text segment.
pub fn generate_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Current UTC time as an RFC 3339 string with millisecond precision.
pub fn iso_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Mode;

    #[test]
    fn test_event_serialization() {
        let event = StreamEvent::TextDelta {
            id: "abc".into(),
            delta: "hello".into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "text-delta");
        assert_eq!(json["delta"], "hello");

        let back: StreamEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn test_start_event_uses_message_metadata_key() {
        let event = StreamEvent::Start {
            message_metadata: OrchestrationMetadata::new(Mode::Chat, "Resolve Copilot", None),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "start");
        assert_eq!(json["messageMetadata"]["label"], "Resolve Copilot");
        assert_eq!(event.kind(), "start");
        assert!(!event.is_terminal());
    }

    #[test]
    fn test_timestamp_format() {
        let ts = iso_timestamp();
        assert!(ts.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok());
    }
}
