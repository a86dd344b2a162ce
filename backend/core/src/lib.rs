pub mod error;
pub mod event;
pub mod message;
pub mod traits;
pub mod types;

pub use error::{BridgeError, CopilotError, ModelError};
pub use event::{generate_id, iso_timestamp, StreamEvent};
pub use message::{ChatRequest, MessagePart, UiMessage, UiRole};
pub use traits::{
    Bridge, BridgeResponse, ContentBlock, DeltaSink, LanguageModel, ModelMessage, ModelRequest,
    ModelStep, ModelToolCall, ToolChoice, ToolSpec,
};
pub use types::{ChatTurn, Instruction, InstructionResult, Mode, OrchestrationMetadata, Role};
