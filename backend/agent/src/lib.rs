//! Resolve Copilot Agent Runner
//!
//! The streaming chat orchestrator and the pieces it drives: history windowing,
//! prompt building, model-facing tool dispatch and the multi-step generation loop.

pub mod agent_loop;
pub mod context_window;
pub mod orchestrator;
pub mod system_prompt;
pub mod tool_dispatcher;

pub use agent_loop::{AgentRunner, RunFailure, ToolCallResult};
pub use context_window::{build_history, contextual_messages, latest_user_text};
pub use orchestrator::{ChatOrchestrator, OrchestratorSettings, Rejection};
pub use system_prompt::{tool_instruction, unknown_tool_label, DEFAULT_LABEL, SYSTEM_PROMPT};
pub use tool_dispatcher::{format_response_payload, ToolDispatcher, ToolOutcome};
