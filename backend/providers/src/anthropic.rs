use std::time::Instant;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use reqwest_eventsource::{Error as SseError, Event, EventSource};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, instrument, warn};

use copilot_core::{
    DeltaSink, LanguageModel, ModelError, ModelMessage, ModelRequest, ModelStep, ToolChoice,
    ToolSpec,
};

use crate::stream::StreamAccumulator;

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic Messages API provider with server-sent event streaming.
pub struct AnthropicProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl AnthropicProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/messages", self.base_url)
    }
}

#[derive(Serialize)]
struct MessagesBody<'a> {
    model: &'a str,
    system: &'a str,
    messages: &'a [ModelMessage],
    max_tokens: u32,
    temperature: f32,
    stream: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<&'a ToolSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<Value>,
}

fn build_body(request: &ModelRequest) -> MessagesBody<'_> {
    let tools = request.visible_tools();
    let tool_choice = if tools.is_empty() {
        None
    } else {
        Some(match &request.tool_choice {
            ToolChoice::Auto => json!({"type": "auto"}),
            ToolChoice::Tool { name } => json!({"type": "tool", "name": name}),
        })
    };
    MessagesBody {
        model: &request.model,
        system: &request.system,
        messages: &request.messages,
        max_tokens: request.max_tokens,
        temperature: request.temperature,
        stream: true,
        tools,
        tool_choice,
    }
}

/// Pull the human-readable message out of an API error body.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(Value::as_str)
                .map(String::from)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

#[async_trait]
impl LanguageModel for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    #[instrument(skip_all, fields(model = %request.model))]
    async fn stream(
        &self,
        request: &ModelRequest,
        sink: &dyn DeltaSink,
    ) -> Result<ModelStep, ModelError> {
        let start = Instant::now();
        let body = build_body(request);

        debug!(
            messages = request.messages.len(),
            tools = body.tools.len(),
            "Sending streaming request to Anthropic"
        );

        let builder = self
            .client
            .post(self.endpoint())
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body);

        let mut source =
            EventSource::new(builder).map_err(|e| ModelError::Http(e.to_string()))?;
        let mut acc = StreamAccumulator::new();

        while let Some(event) = source.next().await {
            match event {
                Ok(Event::Open) => continue,
                Ok(Event::Message(message)) => {
                    match acc.apply(&message.event, &message.data, sink) {
                        Ok(true) => break,
                        Ok(false) => {}
                        Err(e) => {
                            source.close();
                            return Err(e);
                        }
                    }
                }
                Err(SseError::StreamEnded) => break,
                Err(SseError::InvalidStatusCode(status, response)) => {
                    source.close();
                    let text = response.text().await.unwrap_or_default();
                    warn!(status = %status, "Anthropic rejected the request");
                    return Err(ModelError::Api {
                        status: status.as_u16(),
                        message: api_error_message(&text),
                    });
                }
                Err(SseError::Transport(e)) => {
                    source.close();
                    return Err(ModelError::Http(e.to_string()));
                }
                Err(e) => {
                    source.close();
                    return Err(ModelError::Stream(e.to_string()));
                }
            }
        }
        source.close();

        if !acc.is_done() {
            warn!("Anthropic stream closed before message_stop");
            return Err(ModelError::Stream("stream ended before message_stop".into()));
        }
        let step = acc.finish()?;
        debug!(
            latency_ms = start.elapsed().as_millis() as u64,
            text_len = step.text.len(),
            tool_calls = step.tool_calls.len(),
            stop_reason = step.stop_reason.as_deref().unwrap_or("-"),
            "Anthropic step finished"
        );
        Ok(step)
    }
}
