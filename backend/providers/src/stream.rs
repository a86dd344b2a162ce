use std::collections::BTreeMap;

use copilot_core::{DeltaSink, ModelError, ModelStep, ModelToolCall};
use serde_json::{Map, Value};
use tracing::{debug, trace};

/// Content block still being streamed.
#[derive(Debug)]
enum PendingBlock {
    Text,
    ToolUse {
        id: String,
        name: String,
        initial: Value,
        partial_json: String,
    },
}

/// Folds Messages API stream events into a [`ModelStep`].
///
/// Text deltas are pushed to the sink as soon as they are applied. Tool
/// arguments arrive as JSON fragments and are parsed when their block stops.
#[derive(Debug, Default)]
pub struct StreamAccumulator {
    text: String,
    blocks: BTreeMap<u64, PendingBlock>,
    tool_calls: Vec<ModelToolCall>,
    stop_reason: Option<String>,
    done: bool,
}

impl StreamAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Apply one server-sent event. Returns `true` once `message_stop` is seen.
    pub fn apply(
        &mut self,
        event: &str,
        data: &str,
        sink: &dyn DeltaSink,
    ) -> Result<bool, ModelError> {
        if data.trim().is_empty() {
            return Ok(self.done);
        }
        let value: Value = serde_json::from_str(data)
            .map_err(|e| ModelError::Decode(format!("invalid stream event: {e}")))?;
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or(event)
            .to_string();
        let index = value.get("index").and_then(Value::as_u64).unwrap_or(0);

        match kind.as_str() {
            "content_block_start" => {
                let block = value.get("content_block").cloned().unwrap_or(Value::Null);
                match block.get("type").and_then(Value::as_str) {
                    Some("tool_use") => {
                        let id = str_field(&block, "id");
                        let name = str_field(&block, "name");
                        debug!(tool = %name, index, "Tool use block started");
                        self.blocks.insert(
                            index,
                            PendingBlock::ToolUse {
                                id,
                                name,
                                initial: block.get("input").cloned().unwrap_or(Value::Null),
                                partial_json: String::new(),
                            },
                        );
                    }
                    _ => {
                        if let Some(text) = block.get("text").and_then(Value::as_str) {
                            self.push_text(text, sink);
                        }
                        self.blocks.insert(index, PendingBlock::Text);
                    }
                }
            }
            "content_block_delta" => {
                let delta = value.get("delta").cloned().unwrap_or(Value::Null);
                match delta.get("type").and_then(Value::as_str) {
                    Some("text_delta") => {
                        if let Some(text) = delta.get("text").and_then(Value::as_str) {
                            self.push_text(text, sink);
                        }
                    }
                    Some("input_json_delta") => {
                        let fragment = delta
                            .get("partial_json")
                            .and_then(Value::as_str)
                            .unwrap_or_default();
                        if let Some(PendingBlock::ToolUse { partial_json, .. }) =
                            self.blocks.get_mut(&index)
                        {
                            partial_json.push_str(fragment);
                        }
                    }
                    other => trace!(delta = ?other, "Ignoring delta"),
                }
            }
            "content_block_stop" => {
                if let Some(block) = self.blocks.remove(&index) {
                    self.close_block(block)?;
                }
            }
            "message_delta" => {
                if let Some(reason) = value
                    .get("delta")
                    .and_then(|d| d.get("stop_reason"))
                    .and_then(Value::as_str)
                {
                    self.stop_reason = Some(reason.to_string());
                }
            }
            "message_stop" => self.done = true,
            "error" => {
                let message = value
                    .get("error")
                    .and_then(|e| e.get("message"))
                    .and_then(Value::as_str)
                    .unwrap_or("unknown stream error");
                return Err(ModelError::Stream(message.to_string()));
            }
            _ => {}
        }
        Ok(self.done)
    }

    /// Close any blocks left open and return the finished step.
    pub fn finish(mut self) -> Result<ModelStep, ModelError> {
        let open = std::mem::take(&mut self.blocks);
        for (_, block) in open {
            self.close_block(block)?;
        }
        Ok(ModelStep {
            text: self.text,
            tool_calls: self.tool_calls,
            stop_reason: self.stop_reason,
        })
    }

    fn push_text(&mut self, text: &str, sink: &dyn DeltaSink) {
        if text.is_empty() {
            return;
        }
        self.text.push_str(text);
        sink.push(text);
    }

    fn close_block(&mut self, block: PendingBlock) -> Result<(), ModelError> {
        if let PendingBlock::ToolUse {
            id,
            name,
            initial,
            partial_json,
        } = block
        {
            let input = if partial_json.trim().is_empty() {
                match initial {
                    Value::Null => Value::Object(Map::new()),
                    other => other,
                }
            } else {
                serde_json::from_str(&partial_json).map_err(|e| {
                    ModelError::Decode(format!("tool arguments for {name} are not valid JSON: {e}"))
                })?
            };
            self.tool_calls.push(ModelToolCall { id, name, input });
        }
        Ok(())
    }
}

fn str_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
