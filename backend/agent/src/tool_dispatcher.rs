//! Dispatcher for model tool calls.
//!
//! Routes the model's requested tool invocations to the instruction dispatcher
//! and turns the result into text the model (and the transcript) can consume.

use std::sync::Arc;

use copilot_core::{Instruction, ModelToolCall};
use copilot_executor::InstructionDispatcher;
use copilot_logging::{CopilotEvent, EventLogger};
use copilot_tools::ToolRegistry;
use serde_json::Value;
use tracing::{debug, warn};

/// Used when a failed dispatch carries no error text.
pub const TOOL_FAILURE_MESSAGE: &str = "Resolve tool execution failed.";

/// Result of executing one model tool call.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutcome {
    /// Formatted output of the bridge response.
    Success(String),
    /// Error text handed back to the model as a tool error.
    Failure(String),
}

impl ToolOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ToolOutcome::Success(_))
    }

    pub fn text(&self) -> &str {
        match self {
            ToolOutcome::Success(text) | ToolOutcome::Failure(text) => text,
        }
    }
}

/// Render a bridge response for display.
pub fn format_response_payload(response: Option<&Value>) -> String {
    match response {
        None | Some(Value::Null) => "Resolve did not return any data.".to_string(),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                "Resolve returned an empty string.".to_string()
            } else {
                trimmed.to_string()
            }
        }
        Some(other) => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

pub struct ToolDispatcher {
    registry: Arc<ToolRegistry>,
    dispatcher: InstructionDispatcher,
}

impl ToolDispatcher {
    pub fn new(registry: Arc<ToolRegistry>, dispatcher: InstructionDispatcher) -> Self {
        Self {
            registry,
            dispatcher,
        }
    }

    /// Execute a single tool call against the bridge.
    pub async fn execute(&self, call: &ModelToolCall) -> ToolOutcome {
        let outcome = self.run(call).await;
        EventLogger::log_event(
            &call.name,
            CopilotEvent::ToolCall {
                tool_name: call.name.clone(),
                arguments_json: call.input.to_string(),
                ok: outcome.is_success(),
            },
        );
        outcome
    }

    async fn run(&self, call: &ModelToolCall) -> ToolOutcome {
        let Some(tool) = self.registry.find(&call.name) else {
            warn!(tool = %call.name, "Model requested an unknown tool");
            return ToolOutcome::Failure(format!("Unknown Resolve tool \"{}\".", call.name));
        };

        let input = if tool.requires_input {
            match call.input.get("script").and_then(Value::as_str) {
                Some(script) if !script.trim().is_empty() => script.to_string(),
                _ => return ToolOutcome::Failure("Provide the script content.".to_string()),
            }
        } else {
            String::new()
        };

        debug!(tool = %tool.id, "Dispatching tool call");
        let result = self
            .dispatcher
            .dispatch(Instruction::new(&tool.label, tool.build_payload(&input)))
            .await;

        if result.ok {
            ToolOutcome::Success(format_response_payload(result.response.as_ref()))
        } else {
            ToolOutcome::Failure(
                result
                    .error
                    .unwrap_or_else(|| TOOL_FAILURE_MESSAGE.to_string()),
            )
        }
    }
}
