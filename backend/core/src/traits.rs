use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{BridgeError, ModelError};
use crate::types::Role;

/// Transport to the bridge target: one request payload in, one parsed reply out.
#[async_trait]
pub trait Bridge: Send + Sync {
    /// Human-readable address of the bridge target (for logs and health).
    fn address(&self) -> String;

    /// Send a payload and wait for the first response line.
    async fn call(&self, payload: &Map<String, Value>) -> Result<BridgeResponse, BridgeError>;
}

/// A parsed bridge reply.
///
/// The bridge answers `{"ok": true, ...}` or `{"ok": false, "err": "..."}`.
/// Anything that is not an explicit `"ok": false` counts as success.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BridgeResponse(Value);

impl BridgeResponse {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.0.get("ok"), Some(Value::Bool(false)))
    }

    /// The bridge's own error text, when it sent one.
    pub fn err(&self) -> Option<&str> {
        self.0.get("err").and_then(Value::as_str)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

/// A tool exposed to the model as a callable function.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// How the model may pick tools for a generation step.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ToolChoice {
    #[default]
    Auto,
    /// The model must call exactly this tool.
    Tool { name: String },
}

/// Content of a model message, shaped after the Messages API blocks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: Value,
    },
    ToolResult {
        tool_use_id: String,
        content: String,
        #[serde(default)]
        is_error: bool,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelMessage {
    pub role: Role,
    pub content: Vec<ContentBlock>,
}

impl ModelMessage {
    pub fn text(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            content: vec![ContentBlock::Text { text: text.into() }],
        }
    }

    /// Concatenated text blocks.
    pub fn plain_text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// One generation step sent to a language model.
#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub model: String,
    pub system: String,
    pub messages: Vec<ModelMessage>,
    pub tools: Vec<ToolSpec>,
    pub tool_choice: ToolChoice,
    /// When set, only these tool names are offered to the model.
    pub active_tools: Option<Vec<String>>,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl ModelRequest {
    /// Tools the model is allowed to see for this step.
    pub fn visible_tools(&self) -> Vec<&ToolSpec> {
        match &self.active_tools {
            Some(active) => self
                .tools
                .iter()
                .filter(|t| active.iter().any(|name| name == &t.name))
                .collect(),
            None => self.tools.iter().collect(),
        }
    }
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelToolCall {
    pub id: String,
    pub name: String,
    pub input: Value,
}

/// Everything one generation step produced once its stream ended.
#[derive(Debug, Clone, Default)]
pub struct ModelStep {
    pub text: String,
    pub tool_calls: Vec<ModelToolCall>,
    pub stop_reason: Option<String>,
}

/// Receiver of text deltas as the model produces them.
pub trait DeltaSink: Send + Sync {
    fn push(&self, delta: &str);
}

/// A streaming text + tool-call generator.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Provider name (e.g., "anthropic").
    fn name(&self) -> &str;

    /// Run one generation step, pushing every text delta to `sink` as it arrives.
    async fn stream(
        &self,
        request: &ModelRequest,
        sink: &dyn DeltaSink,
    ) -> Result<ModelStep, ModelError>;
}
