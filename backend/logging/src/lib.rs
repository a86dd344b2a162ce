//! Telemetry and structured logging for Resolve Copilot.
//!
//! Handles log redaction, console/NDJSON output, file rotation, and structured
//! runtime events (bridge responses, tool calls, finished runs).

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{CopilotEvent, EventLogEntry, EventLogger};
pub use logger::init_logger;
pub use redact::redact_sensitive_data;
