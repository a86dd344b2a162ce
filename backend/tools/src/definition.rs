//! Tool definitions: what a tool is and how it turns free-form input into a bridge payload.

use copilot_core::ToolSpec;
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::debug;

/// How a tool builds its instruction payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadKind {
    /// `{op: "run_script", language, source: <input>}`.
    RunScript { language: String },
    /// A fixed `{op}` descriptor; the input is ignored.
    Fixed { op: String },
}

/// A named operation the model (or the operator) may invoke against the bridge.
#[derive(Debug, Clone)]
pub struct ToolDefinition {
    pub id: String,
    pub label: String,
    pub description: String,
    pub requires_input: bool,
    pub placeholder: Option<String>,
    pub sample: Option<String>,
    pub payload: PayloadKind,
}

/// Presentation view of a tool, as served to the chat surface.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ToolSummary {
    pub id: String,
    pub label: String,
    pub description: String,
    pub requires_input: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample: Option<String>,
}

impl ToolDefinition {
    /// Translate free-form input into the payload sent to the bridge.
    pub fn build_payload(&self, input: &str) -> Map<String, Value> {
        let mut payload = Map::new();
        match &self.payload {
            PayloadKind::RunScript { language } => {
                debug!(tool = %self.id, bytes = input.len(), "Building script payload");
                payload.insert("op".into(), json!("run_script"));
                payload.insert("language".into(), json!(language));
                payload.insert("source".into(), json!(input));
            }
            PayloadKind::Fixed { op } => {
                payload.insert("op".into(), json!(op));
            }
        }
        payload
    }

    /// JSON Schema of the arguments the model must supply.
    pub fn input_schema(&self) -> Value {
        if self.requires_input {
            json!({
                "type": "object",
                "description": "Script execution input.",
                "properties": {
                    "script": {
                        "type": "string",
                        "minLength": 1,
                        "description": "Resolve scripting content to execute."
                    }
                },
                "required": ["script"],
                "additionalProperties": false
            })
        } else {
            json!({
                "type": "object",
                "description": "No parameters required.",
                "properties": {},
                "additionalProperties": false
            })
        }
    }

    /// Callable-function view of the tool for the model.
    pub fn to_spec(&self) -> ToolSpec {
        let description = if self.requires_input {
            format!(
                "{} Provide the script body as plain text.",
                self.description.trim()
            )
        } else {
            self.description.trim().to_string()
        };
        ToolSpec {
            name: self.id.clone(),
            description,
            input_schema: self.input_schema(),
        }
    }

    pub fn summary(&self) -> ToolSummary {
        ToolSummary {
            id: self.id.clone(),
            label: self.label.clone(),
            description: self.description.clone(),
            requires_input: self.requires_input,
            placeholder: self.placeholder.clone(),
            sample: self.sample.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn script_tool() -> ToolDefinition {
        ToolDefinition {
            id: "run-python-script".into(),
            label: "Run Python Script".into(),
            description: "Runs Python.".into(),
            requires_input: true,
            placeholder: None,
            sample: None,
            payload: PayloadKind::RunScript {
                language: "python".into(),
            },
        }
    }

    #[test]
    fn test_script_payload_embeds_source() {
        let payload = script_tool().build_payload("result = 1+1");
        assert_eq!(payload["op"], "run_script");
        assert_eq!(payload["language"], "python");
        assert_eq!(payload["source"], "result = 1+1");
    }

    #[test]
    fn test_fixed_payload_ignores_input() {
        let tool = ToolDefinition {
            payload: PayloadKind::Fixed { op: "ping".into() },
            requires_input: false,
            ..script_tool()
        };
        let payload = tool.build_payload("ignored");
        assert_eq!(payload.len(), 1);
        assert_eq!(payload["op"], "ping");
    }

    #[test]
    fn test_spec_schema_requires_script() {
        let spec = script_tool().to_spec();
        assert_eq!(spec.name, "run-python-script");
        assert!(spec.description.ends_with("Provide the script body as plain text."));
        assert_eq!(spec.input_schema["required"][0], "script");
        assert_eq!(spec.input_schema["additionalProperties"], false);
    }

    #[test]
    fn test_summary_skips_absent_fields() {
        let value = serde_json::to_value(script_tool().summary()).unwrap();
        assert_eq!(value["requiresInput"], true);
        assert!(value.get("placeholder").is_none());
    }
}
