//! CLI Run Command
//!
//! Dispatches one tool directly to the bridge, without the model.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use copilot_core::{Instruction, InstructionResult};
use copilot_executor::InstructionDispatcher;
use copilot_tools::ToolRegistry;

/// Where the tool input comes from.
pub enum InputSource {
    None,
    Inline(String),
    File(PathBuf),
}

impl InputSource {
    async fn read(self) -> Result<String> {
        match self {
            InputSource::None => Ok(String::new()),
            InputSource::Inline(text) => Ok(text),
            InputSource::File(path) => tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("Failed to read input file: {}", path.display())),
        }
    }
}

/// Validate the request and dispatch it; returns the normalized result.
pub async fn execute(
    registry: &ToolRegistry,
    dispatcher: &InstructionDispatcher,
    tool_id: &str,
    input: InputSource,
) -> Result<InstructionResult> {
    let Some(tool) = registry.find(tool_id) else {
        let known: Vec<&str> = registry.list().iter().map(|t| t.id.as_str()).collect();
        bail!("Unknown tool \"{tool_id}\". Available: {}", known.join(", "));
    };
    let input = input.read().await?;
    if tool.requires_input && input.trim().is_empty() {
        bail!("Tool \"{tool_id}\" requires input; pass --input or --file");
    }

    let instruction = Instruction::new(&tool.label, tool.build_payload(&input));
    Ok(dispatcher.dispatch(instruction).await)
}

pub async fn run(
    registry: &ToolRegistry,
    dispatcher: &InstructionDispatcher,
    tool_id: &str,
    input: InputSource,
) -> Result<bool> {
    let result = execute(registry, dispatcher, tool_id, input).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(result.ok)
}

#[cfg(test)]
mod tests {
    use super::*;
    use copilot_bridge::BridgeClient;
    use std::sync::Arc;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
    use tokio::net::TcpListener;

    /// One-shot bridge that echoes the request op back.
    async fn echo_bridge() -> InstructionDispatcher {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut reader = BufReader::new(stream);
            let mut line = String::new();
            reader.read_line(&mut line).await.unwrap();
            let request: serde_json::Value = serde_json::from_str(&line).unwrap();
            let reply = serde_json::json!({"ok": true, "echo": request});
            let mut stream = reader.into_inner();
            stream
                .write_all(format!("{reply}\n").as_bytes())
                .await
                .unwrap();
        });
        InstructionDispatcher::new(Arc::new(BridgeClient::new("127.0.0.1", port)))
    }

    #[tokio::test]
    async fn test_inline_script_is_dispatched() {
        let registry = ToolRegistry::builtin().unwrap();
        let dispatcher = echo_bridge().await;
        let result = execute(
            &registry,
            &dispatcher,
            "run-python-script",
            InputSource::Inline("result = 1+1".into()),
        )
        .await
        .unwrap();
        assert!(result.ok);
        assert_eq!(result.label, "Run Python Script");
        let echo = &result.response.unwrap()["echo"];
        assert_eq!(echo["op"], "run_script");
        assert_eq!(echo["source"], "result = 1+1");
    }

    #[tokio::test]
    async fn test_missing_input_is_refused_before_dispatch() {
        let registry = ToolRegistry::builtin().unwrap();
        let dispatcher = InstructionDispatcher::new(Arc::new(BridgeClient::new("127.0.0.1", 1)));
        let err = execute(&registry, &dispatcher, "run-python-script", InputSource::None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("requires input"));
    }

    #[tokio::test]
    async fn test_unknown_tool_lists_alternatives() {
        let registry = ToolRegistry::builtin().unwrap();
        let dispatcher = InstructionDispatcher::new(Arc::new(BridgeClient::new("127.0.0.1", 1)));
        let err = execute(&registry, &dispatcher, "nope", InputSource::None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("ping-bridge"));
    }
}
