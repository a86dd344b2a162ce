//! Runtime Event Logger
//!
//! Structured events (bridge responses, tool calls, finished runs) emitted through
//! `tracing` under the `copilot_events` target, redacted before they leave the process.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::redact::redact_sensitive_data;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CopilotEvent {
    BridgeResponse {
        op: Option<String>,
        ok: bool,
        duration_ms: u64,
        response: String,
    },
    ToolCall {
        tool_name: String,
        arguments_json: String,
        ok: bool,
    },
    OrchestrationFinished {
        mode: String,
        label: String,
        tool_id: Option<String>,
        ok: bool,
        duration_ms: u64,
        error: Option<String>,
    },
}

#[derive(Debug, Serialize)]
pub struct EventLogEntry {
    pub scope: String,
    pub timestamp: DateTime<Utc>,
    pub event: CopilotEvent,
}

pub struct EventLogger;

impl EventLogger {
    /// Redact an event's free-text fields and build the log entry.
    pub fn entry(scope: &str, mut event: CopilotEvent) -> EventLogEntry {
        match &mut event {
            CopilotEvent::BridgeResponse { response, .. } => {
                *response = redact_sensitive_data(response);
            }
            CopilotEvent::ToolCall { arguments_json, .. } => {
                *arguments_json = redact_sensitive_data(arguments_json);
            }
            CopilotEvent::OrchestrationFinished { error, .. } => {
                if let Some(msg) = error {
                    *msg = redact_sensitive_data(msg);
                }
            }
        }

        EventLogEntry {
            scope: scope.into(),
            timestamp: Utc::now(),
            event,
        }
    }

    /// Log a runtime event, serialized as one JSON object.
    pub fn log_event(scope: &str, event: CopilotEvent) {
        let entry = Self::entry(scope, event);
        let json = serde_json::to_string(&entry).unwrap_or_else(|e| e.to_string());
        info!(target: "copilot_events", event = %json, "Copilot trace event");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_redacts_tool_arguments() {
        let entry = EventLogger::entry(
            "run-python-script",
            CopilotEvent::ToolCall {
                tool_name: "run-python-script".into(),
                arguments_json: r#"{"script":"key = 'sk-ant-REDACTED'"}"#.into(),
                ok: true,
            },
        );
        let CopilotEvent::ToolCall { arguments_json, .. } = &entry.event else {
            panic!("unexpected event kind");
        };
        assert!(arguments_json.contains("[REDACTED_TOKEN]"));
        assert_eq!(entry.scope, "run-python-script");
    }

    #[test]
    fn test_event_serializes_with_type_tag() {
        let entry = EventLogger::entry(
            "Ping Resolve",
            CopilotEvent::BridgeResponse {
                op: Some("ping".into()),
                ok: true,
                duration_ms: 4,
                response: r#"{"ok":true}"#.into(),
            },
        );
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["event"]["type"], "bridge_response");
        assert_eq!(value["event"]["duration_ms"], 4);
    }
}
