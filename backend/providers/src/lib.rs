//! Language model providers.
//!
//! [`AnthropicProvider`] streams from the Messages API; [`ScriptedModel`]
//! replays canned steps for tests and offline runs.

pub mod anthropic;
pub mod mock;
pub mod stream;

pub use anthropic::{AnthropicProvider, ANTHROPIC_VERSION, DEFAULT_BASE_URL};
pub use mock::{ScriptedModel, ScriptedStep};
pub use stream::StreamAccumulator;
