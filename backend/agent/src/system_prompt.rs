//! Prompt text: the system prompt and the synthesized tool-mode user turn.

use copilot_tools::ToolDefinition;

pub const SYSTEM_PROMPT: &str = "You are Resolve Copilot, an assistant who helps editors automate DaVinci Resolve. \
You can call Resolve automation tools when useful. \
Prefer using tools for actions inside Resolve and explain what you did afterwards. \
Keep answers concise.";

/// Label used when no tool is selected.
pub const DEFAULT_LABEL: &str = "Resolve Copilot";

/// Label for a tool id the registry does not know.
pub fn unknown_tool_label(id: &str) -> String {
    format!("Resolve tool ({id})")
}

/// The user turn asking the model to run `tool` with `input`.
pub fn tool_instruction(tool: &ToolDefinition, input: &str) -> String {
    let input = input.trim();
    let mut segments = vec![format!("Execute the \"{}\" Resolve tool.", tool.label)];
    if tool.requires_input {
        if input.is_empty() {
            segments.push(
                "No script was provided. If execution is impossible, respond with an error."
                    .to_string(),
            );
        } else {
            segments.push(format!("Use the following script inside Resolve:\n\n{input}"));
        }
    } else if !input.is_empty() {
        segments.push(input.to_string());
    }
    segments.join("\n\n")
}
