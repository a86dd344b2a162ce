use std::sync::Arc;
use std::time::Instant;

use copilot_core::{Bridge, Instruction, InstructionResult};
use copilot_logging::{CopilotEvent, EventLogger};
use tracing::{info, instrument, warn};

/// Used when a bridge failure carries no message of its own.
pub const UNREACHABLE_MESSAGE: &str =
    "Davinci Resolve is unreachable. Ensure the integration bridge is running.";

/// Used when the bridge answers `ok: false` without an `err` text.
pub const REPORTED_FAILURE_MESSAGE: &str = "Davinci Resolve reported a failure.";

/// Sends instructions over a bridge and normalizes the outcome.
///
/// `dispatch` never fails: transport errors and bridge-reported failures both
/// come back as `InstructionResult { ok: false, .. }` with an error message.
#[derive(Clone)]
pub struct InstructionDispatcher {
    bridge: Arc<dyn Bridge>,
}

impl InstructionDispatcher {
    pub fn new(bridge: Arc<dyn Bridge>) -> Self {
        Self { bridge }
    }

    pub fn bridge_address(&self) -> String {
        self.bridge.address()
    }

    #[instrument(skip_all, fields(label = %instruction.label, op = instruction.op().unwrap_or("-")))]
    pub async fn dispatch(&self, instruction: Instruction) -> InstructionResult {
        let start = Instant::now();
        let outcome = self.bridge.call(&instruction.payload).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        let Instruction { label, payload } = instruction;
        let op = payload.get("op").and_then(|v| v.as_str()).map(String::from);

        match outcome {
            Err(e) => {
                let message = e.to_string();
                let error = if message.trim().is_empty() {
                    UNREACHABLE_MESSAGE.to_string()
                } else {
                    message
                };
                warn!(error = %error, duration_ms, "Bridge dispatch failed");
                InstructionResult {
                    ok: false,
                    label,
                    response: None,
                    error: Some(error),
                    duration_ms,
                    payload,
                }
            }
            Ok(response) => {
                EventLogger::log_event(
                    &label,
                    CopilotEvent::BridgeResponse {
                        op,
                        ok: !response.is_failure(),
                        duration_ms,
                        response: response.as_value().to_string(),
                    },
                );

                if response.is_failure() {
                    let error = response
                        .err()
                        .unwrap_or(REPORTED_FAILURE_MESSAGE)
                        .to_string();
                    warn!(error = %error, duration_ms, "Bridge reported a failure");
                    return InstructionResult {
                        ok: false,
                        label,
                        response: Some(response.into_value()),
                        error: Some(error),
                        duration_ms,
                        payload,
                    };
                }

                info!(duration_ms, "Instruction dispatched");
                InstructionResult {
                    ok: true,
                    label,
                    response: Some(response.into_value()),
                    error: None,
                    duration_ms,
                    payload,
                }
            }
        }
    }
}
