//! Instruction dispatch for Resolve Copilot.
//!
//! Wraps a [`copilot_core::Bridge`] so every call resolves to an
//! [`copilot_core::InstructionResult`], success or not.

pub mod dispatcher;

pub use dispatcher::{InstructionDispatcher, REPORTED_FAILURE_MESSAGE, UNREACHABLE_MESSAGE};
