use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::Value;

use copilot_core::{DeltaSink, LanguageModel, ModelError, ModelRequest, ModelStep, ModelToolCall};

/// One canned generation step.
#[derive(Debug, Clone, Default)]
pub struct ScriptedStep {
    chunks: Vec<String>,
    tool_calls: Vec<ModelToolCall>,
    error: Option<String>,
}

impl ScriptedStep {
    /// A step that streams these text chunks in order.
    pub fn text<I, S>(chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            chunks: chunks.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// A step that asks for a single tool call.
    pub fn tool_call(name: impl Into<String>, input: Value) -> Self {
        Self::default().with_tool_call(name, input)
    }

    /// A step that fails after streaming its chunks.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn with_text(mut self, chunk: impl Into<String>) -> Self {
        self.chunks.push(chunk.into());
        self
    }

    pub fn with_tool_call(mut self, name: impl Into<String>, input: Value) -> Self {
        let id = format!("toolu_{}", self.tool_calls.len() + 1);
        self.tool_calls.push(ModelToolCall {
            id,
            name: name.into(),
            input,
        });
        self
    }
}

/// A model that replays scripted steps and records every request it sees.
///
/// Once the script runs out, further steps end the turn with no output.
pub struct ScriptedModel {
    steps: Mutex<VecDeque<ScriptedStep>>,
    requests: Mutex<Vec<ModelRequest>>,
}

impl ScriptedModel {
    pub fn new(steps: impl IntoIterator<Item = ScriptedStep>) -> Self {
        Self {
            steps: Mutex::new(steps.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<ModelRequest> {
        lock(&self.requests).clone()
    }

    pub fn request_count(&self) -> usize {
        lock(&self.requests).len()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn stream(
        &self,
        request: &ModelRequest,
        sink: &dyn DeltaSink,
    ) -> Result<ModelStep, ModelError> {
        lock(&self.requests).push(request.clone());
        let step = lock(&self.steps).pop_front().unwrap_or_default();

        let mut text = String::new();
        for chunk in &step.chunks {
            text.push_str(chunk);
            sink.push(chunk);
        }
        if let Some(message) = step.error {
            return Err(ModelError::Stream(message));
        }

        let stop_reason = if step.tool_calls.is_empty() {
            "end_turn"
        } else {
            "tool_use"
        };
        Ok(ModelStep {
            text,
            tool_calls: step.tool_calls,
            stop_reason: Some(stop_reason.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use copilot_core::{ModelMessage, Role, ToolChoice};
    use serde_json::json;

    struct Collect(Mutex<String>);

    impl DeltaSink for Collect {
        fn push(&self, delta: &str) {
            self.0.lock().unwrap().push_str(delta);
        }
    }

    fn request() -> ModelRequest {
        ModelRequest {
            model: "scripted".into(),
            system: String::new(),
            messages: vec![ModelMessage::text(Role::User, "go")],
            tools: vec![],
            tool_choice: ToolChoice::Auto,
            active_tools: None,
            temperature: 0.0,
            max_tokens: 16,
        }
    }

    #[tokio::test]
    async fn test_replays_steps_then_goes_quiet() {
        let model = ScriptedModel::new([
            ScriptedStep::tool_call("ping-bridge", json!({})),
            ScriptedStep::text(["Done", "."]),
        ]);
        let sink = Collect(Mutex::new(String::new()));

        let first = model.stream(&request(), &sink).await.unwrap();
        assert_eq!(first.tool_calls[0].name, "ping-bridge");
        assert_eq!(first.stop_reason.as_deref(), Some("tool_use"));

        let second = model.stream(&request(), &sink).await.unwrap();
        assert_eq!(second.text, "Done.");

        let third = model.stream(&request(), &sink).await.unwrap();
        assert!(third.text.is_empty() && third.tool_calls.is_empty());

        assert_eq!(*sink.0.lock().unwrap(), "Done.");
        assert_eq!(model.request_count(), 3);
    }

    #[tokio::test]
    async fn test_error_step_streams_partial_text_first() {
        let model = ScriptedModel::new([ScriptedStep::error("overloaded").with_text("Part")]);
        let sink = Collect(Mutex::new(String::new()));
        let err = model.stream(&request(), &sink).await.unwrap_err();
        assert_eq!(err.to_string(), "model stream error: overloaded");
        assert_eq!(*sink.0.lock().unwrap(), "Part");
    }
}
