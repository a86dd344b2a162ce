//! Tool registry for Resolve Copilot.
//!
//! Each tool turns free-form input into an instruction payload for the bridge.

pub mod builtin;
pub mod definition;
pub mod registry;

pub use builtin::{builtin_tools, LIST_FUSION_TOOLS, PING_BRIDGE, RUN_PYTHON_SCRIPT};
pub use definition::{PayloadKind, ToolDefinition, ToolSummary};
pub use registry::{RegistryError, ToolRegistry};
