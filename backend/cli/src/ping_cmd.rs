//! CLI Ping Command
//!
//! Checks that the Resolve bridge answers.

use anyhow::Result;
use copilot_core::Instruction;
use copilot_executor::InstructionDispatcher;
use copilot_tools::{ToolRegistry, PING_BRIDGE};

use crate::terminal_output::{note_error, note_success};

pub async fn run(registry: &ToolRegistry, dispatcher: &InstructionDispatcher) -> Result<bool> {
    let payload = match registry.find(PING_BRIDGE) {
        Some(tool) => tool.build_payload(""),
        None => {
            let mut payload = serde_json::Map::new();
            payload.insert("op".into(), "ping".into());
            payload
        }
    };

    let result = dispatcher.dispatch(Instruction::new("Ping Resolve", payload)).await;
    let address = dispatcher.bridge_address();
    if result.ok {
        note_success(&format!(
            "Resolve bridge at {address} answered in {} ms",
            result.duration_ms
        ));
        if let Some(response) = &result.response {
            println!("{}", serde_json::to_string_pretty(response)?);
        }
    } else {
        note_error(&format!(
            "Resolve bridge at {address} failed: {}",
            result.error.as_deref().unwrap_or("unknown error")
        ));
    }
    Ok(result.ok)
}
