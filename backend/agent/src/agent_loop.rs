//! Multi-step generation loop.
//!
//! Each step streams one model turn; when the model asks for tools they are
//! executed in order and their results fed back for the next step.

use std::sync::Arc;

use copilot_core::{
    ContentBlock, DeltaSink, LanguageModel, ModelError, ModelMessage, ModelRequest, Role,
    ToolChoice,
};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::tool_dispatcher::{ToolDispatcher, ToolOutcome};

/// Default upper bound on generation steps.
pub const DEFAULT_MAX_STEPS: usize = 5;

/// One executed tool call, in the order the model requested it.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallResult {
    pub tool_call_id: String,
    pub tool_name: String,
    pub outcome: ToolOutcome,
}

/// A model failure part way through a run, with the tool calls that already executed.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct RunFailure {
    pub error: ModelError,
    pub results: Vec<ToolCallResult>,
}

/// Drives a language model through at most `max_steps` generation steps.
pub struct AgentRunner {
    model: Arc<dyn LanguageModel>,
    tool_dispatcher: Arc<ToolDispatcher>,
    max_steps: usize,
}

impl AgentRunner {
    pub fn new(model: Arc<dyn LanguageModel>, tool_dispatcher: Arc<ToolDispatcher>) -> Self {
        Self {
            model,
            tool_dispatcher,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps.max(1);
        self
    }

    /// Run the loop until the model stops calling tools or the step limit is hit.
    ///
    /// A forced tool choice applies to the first step only; later steps fall
    /// back to automatic choice over the same active tools.
    #[instrument(skip_all, fields(model = %self.model.name(), max_steps = self.max_steps))]
    pub async fn run(
        &self,
        mut request: ModelRequest,
        sink: &dyn DeltaSink,
    ) -> Result<Vec<ToolCallResult>, RunFailure> {
        let mut results = Vec::new();

        for step in 0..self.max_steps {
            if step > 0 {
                request.tool_choice = ToolChoice::Auto;
            }
            debug!(step, messages = request.messages.len(), "Starting generation step");

            let output = match self.model.stream(&request, sink).await {
                Ok(output) => output,
                Err(error) => return Err(RunFailure { error, results }),
            };
            if output.tool_calls.is_empty() {
                debug!(step, stop_reason = ?output.stop_reason, "Model finished");
                return Ok(results);
            }

            info!(step, tool_calls = output.tool_calls.len(), "Model invoked tools");

            let mut assistant = Vec::new();
            if !output.text.is_empty() {
                assistant.push(ContentBlock::Text {
                    text: output.text.clone(),
                });
            }
            let mut tool_results = Vec::new();
            for call in &output.tool_calls {
                assistant.push(ContentBlock::ToolUse {
                    id: call.id.clone(),
                    name: call.name.clone(),
                    input: call.input.clone(),
                });

                let outcome = self.tool_dispatcher.execute(call).await;
                if let ToolOutcome::Failure(error) = &outcome {
                    warn!(tool = %call.name, %error, "Tool call failed");
                }
                tool_results.push(ContentBlock::ToolResult {
                    tool_use_id: call.id.clone(),
                    content: outcome.text().to_string(),
                    is_error: !outcome.is_success(),
                });
                results.push(ToolCallResult {
                    tool_call_id: call.id.clone(),
                    tool_name: call.name.clone(),
                    outcome,
                });
            }

            request.messages.push(ModelMessage {
                role: Role::Assistant,
                content: assistant,
            });
            request.messages.push(ModelMessage {
                role: Role::User,
                content: tool_results,
            });
        }

        warn!("Max steps ({}) reached, stopping loop", self.max_steps);
        Ok(results)
    }
}
