//! Streaming chat orchestrator.
//!
//! One run per inbound request: validate, build the model input, stream the
//! generation, then close the text segment and emit the finish metadata.
//! Every run ends with exactly one `start .. finish` event sequence, whatever
//! fails along the way.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use copilot_core::{
    ChatRequest, ChatTurn, DeltaSink, LanguageModel, Mode, ModelMessage, ModelRequest,
    OrchestrationMetadata, Role, StreamEvent, ToolChoice, generate_id,
};
use copilot_executor::InstructionDispatcher;
use copilot_logging::{CopilotEvent, EventLogger};
use copilot_tools::{ToolDefinition, ToolRegistry};
use thiserror::Error;
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::{debug, info, instrument, warn};

use crate::agent_loop::{AgentRunner, DEFAULT_MAX_STEPS, RunFailure, ToolCallResult};
use crate::context_window::{
    DEFAULT_HISTORY_WINDOW, build_history, contextual_messages, latest_user_text,
};
use crate::system_prompt::{DEFAULT_LABEL, SYSTEM_PROMPT, tool_instruction, unknown_tool_label};
use crate::tool_dispatcher::{ToolDispatcher, ToolOutcome};

pub const EMPTY_RESPONSE_MESSAGE: &str = "Resolve Copilot did not return any text.";

/// Why a request was refused before any model or bridge call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("The selected tool is unavailable. Refresh the page and try again.")]
    UnknownTool,
    #[error("Provide scripting content for this Resolve tool.")]
    MissingToolInput,
    #[error("Please provide a prompt for Resolve.")]
    EmptyPrompt,
    #[error("No model credential is configured. Set ANTHROPIC_API_KEY to enable Resolve Copilot.")]
    MissingCredential,
}

/// Model parameters and limits for every run.
#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub max_steps: usize,
    pub history_window: usize,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            model: "claude-3-7-sonnet-latest".to_string(),
            temperature: 0.3,
            max_tokens: 4096,
            max_steps: DEFAULT_MAX_STEPS,
            history_window: DEFAULT_HISTORY_WINDOW,
        }
    }
}

/// A validated request, ready for the model.
struct Plan<'a> {
    tool: Option<&'a ToolDefinition>,
    user_input: String,
    prompt: String,
    history: Vec<ChatTurn>,
}

/// Writes events for one text segment; dropped receivers are ignored.
struct Emitter {
    tx: UnboundedSender<StreamEvent>,
    id: String,
    wrote_text: AtomicBool,
}

impl Emitter {
    fn new(tx: UnboundedSender<StreamEvent>) -> Self {
        Self {
            tx,
            id: generate_id(),
            wrote_text: AtomicBool::new(false),
        }
    }

    fn send(&self, event: StreamEvent) {
        if self.tx.send(event).is_err() {
            debug!("Event receiver dropped");
        }
    }

    fn start(&self, metadata: OrchestrationMetadata) {
        self.send(StreamEvent::Start {
            message_metadata: metadata,
        });
        self.send(StreamEvent::TextStart {
            id: self.id.clone(),
        });
    }

    fn delta(&self, delta: impl Into<String>) {
        self.wrote_text.store(true, Ordering::Relaxed);
        self.send(StreamEvent::TextDelta {
            id: self.id.clone(),
            delta: delta.into(),
        });
    }

    fn finish(&self, metadata: OrchestrationMetadata) {
        self.send(StreamEvent::TextEnd {
            id: self.id.clone(),
        });
        self.send(StreamEvent::Finish {
            message_metadata: metadata,
        });
    }

    fn wrote_text(&self) -> bool {
        self.wrote_text.load(Ordering::Relaxed)
    }
}

impl DeltaSink for Emitter {
    fn push(&self, delta: &str) {
        self.delta(delta);
    }
}

pub struct ChatOrchestrator {
    registry: Arc<ToolRegistry>,
    tool_dispatcher: Arc<ToolDispatcher>,
    model: Option<Arc<dyn LanguageModel>>,
    settings: OrchestratorSettings,
}

impl ChatOrchestrator {
    /// `model` is `None` when no credential is configured; every run is then rejected.
    pub fn new(
        registry: Arc<ToolRegistry>,
        dispatcher: InstructionDispatcher,
        model: Option<Arc<dyn LanguageModel>>,
        settings: OrchestratorSettings,
    ) -> Self {
        let tool_dispatcher = Arc::new(ToolDispatcher::new(registry.clone(), dispatcher));
        Self {
            registry,
            tool_dispatcher,
            model,
            settings,
        }
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    /// Run to completion and return every event in order.
    pub async fn collect(&self, request: ChatRequest) -> Vec<StreamEvent> {
        let (tx, mut rx) = mpsc::unbounded_channel();
        self.run(request, tx).await;
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    /// Handle one request, writing its event sequence to `events`.
    #[instrument(skip_all, fields(mode = ?request.mode, tool_id = ?request.tool_id))]
    pub async fn run(&self, request: ChatRequest, events: UnboundedSender<StreamEvent>) {
        let mode = request.mode();
        let selected = match mode {
            Mode::Tool => request.tool_id.as_deref().and_then(|id| self.registry.find(id)),
            Mode::Chat => None,
        };
        let base = OrchestrationMetadata::new(
            mode,
            selected.map_or(DEFAULT_LABEL, |t| t.label.as_str()),
            selected.map(|t| t.id.clone()),
        );
        let emitter = Emitter::new(events);

        let (plan, model) = match self.validate(&request, selected) {
            Ok(ready) => ready,
            Err(rejection) => {
                let message = rejection.to_string();
                info!(%message, "Request rejected");
                emitter.start(base.clone());
                emitter.delta(message.clone());
                let finished = base.finished(false, Some(message), 0);
                log_finished(&finished);
                emitter.finish(finished);
                return;
            }
        };

        emitter.start(base.clone());
        let started = Instant::now();

        let model_request = self.build_request(&plan);
        let runner = AgentRunner::new(model, self.tool_dispatcher.clone())
            .with_max_steps(self.settings.max_steps);

        let (results, failure) = match runner.run(model_request, &emitter).await {
            Ok(results) => (results, None),
            Err(RunFailure { error, results }) => (results, Some(error)),
        };

        // Tools that ran before a failure are still reported.
        let mut resolved = plan.tool.map(|t| t.id.clone());
        for result in &results {
            resolved = Some(result.tool_name.clone());
            emitter.delta(render_tool_result(result, plan.tool));
        }

        let (ok, error) = match failure {
            None => {
                if !emitter.wrote_text() {
                    emitter.delta(EMPTY_RESPONSE_MESSAGE);
                }
                (true, None)
            }
            Some(e) => {
                let message = e.to_string();
                warn!(error = %message, tools_run = results.len(), "Generation failed");
                emitter.delta(format!("Resolve Copilot error: {message}"));
                (false, Some(message))
            }
        };

        let finished = self
            .resolve_metadata(base, resolved)
            .finished(ok, error, started.elapsed().as_millis() as u64);
        log_finished(&finished);
        emitter.finish(finished);
    }

    fn validate<'a>(
        &'a self,
        request: &ChatRequest,
        selected: Option<&'a ToolDefinition>,
    ) -> Result<(Plan<'a>, Arc<dyn LanguageModel>), Rejection> {
        let prompt = latest_user_text(&request.messages);
        match request.mode() {
            Mode::Tool => {
                let tool = selected.ok_or(Rejection::UnknownTool)?;
                if tool.requires_input && request.user_input().trim().is_empty() {
                    return Err(Rejection::MissingToolInput);
                }
            }
            Mode::Chat => {
                if prompt.is_empty() {
                    return Err(Rejection::EmptyPrompt);
                }
            }
        }
        let model = self.model.clone().ok_or(Rejection::MissingCredential)?;

        Ok((
            Plan {
                tool: selected,
                user_input: request.user_input().to_string(),
                prompt,
                history: build_history(&request.messages, self.settings.history_window),
            },
            model,
        ))
    }

    fn build_request(&self, plan: &Plan<'_>) -> ModelRequest {
        let mut messages = contextual_messages(&plan.history);
        let new_turn = match plan.tool {
            Some(tool) => tool_instruction(tool, &plan.user_input),
            None => plan.prompt.clone(),
        };
        messages.push(ModelMessage::text(Role::User, new_turn));

        let (tool_choice, active_tools) = match plan.tool {
            Some(tool) => (
                ToolChoice::Tool {
                    name: tool.id.clone(),
                },
                Some(vec![tool.id.clone()]),
            ),
            None => (ToolChoice::Auto, None),
        };

        ModelRequest {
            model: self.settings.model.clone(),
            system: SYSTEM_PROMPT.to_string(),
            messages,
            tools: self.registry.model_specs(),
            tool_choice,
            active_tools,
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        }
    }

    /// Label, tool id and mode for the tool that actually ran.
    fn resolve_metadata(
        &self,
        base: OrchestrationMetadata,
        resolved: Option<String>,
    ) -> OrchestrationMetadata {
        let Some(id) = resolved else {
            return base;
        };
        let label = self
            .registry
            .find(&id)
            .map(|t| t.label.clone())
            .unwrap_or_else(|| unknown_tool_label(&id));
        OrchestrationMetadata::new(Mode::Tool, label, Some(id))
    }
}

fn render_tool_result(result: &ToolCallResult, selected: Option<&ToolDefinition>) -> String {
    let body = match &result.outcome {
        ToolOutcome::Success(text) => text.clone(),
        ToolOutcome::Failure(error) => format!("Error: {error}"),
    };
    let header = match selected {
        Some(tool) if tool.id == result.tool_name => "Resolve tool response:\n".to_string(),
        _ => format!("Tool \"{}\" response:\n", result.tool_name),
    };
    format!("\n\n{header}{body}")
}

fn log_finished(metadata: &OrchestrationMetadata) {
    EventLogger::log_event(
        "orchestrator",
        CopilotEvent::OrchestrationFinished {
            mode: metadata.mode.to_string(),
            label: metadata.label.clone(),
            tool_id: metadata.tool_id.clone(),
            ok: metadata.ok.unwrap_or(false),
            duration_ms: metadata.duration_ms.unwrap_or(0),
            error: metadata.error.clone(),
        },
    );
}
