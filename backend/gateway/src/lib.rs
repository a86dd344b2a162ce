//! Resolve Copilot Gateway HTTP API Server
//!
//! Serves the streaming chat endpoint, the tool catalog and a health probe.

pub mod chat_api;
pub mod health_api;
pub mod server;
pub mod tools_api;

pub use server::{router, start_server, GatewayState};
