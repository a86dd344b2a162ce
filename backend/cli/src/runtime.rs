//! Wiring of the runtime components from a loaded config.

use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use copilot_agent::{ChatOrchestrator, OrchestratorSettings};
use copilot_bridge::BridgeClient;
use copilot_config::CopilotConfig;
use copilot_core::{Bridge, LanguageModel};
use copilot_executor::InstructionDispatcher;
use copilot_providers::AnthropicProvider;
use copilot_tools::ToolRegistry;

/// Shared components, built once at startup.
pub struct Runtime {
    pub registry: Arc<ToolRegistry>,
    pub dispatcher: InstructionDispatcher,
    pub orchestrator: Arc<ChatOrchestrator>,
}

impl Runtime {
    pub fn build(config: &CopilotConfig) -> Result<Self> {
        let registry = Arc::new(ToolRegistry::builtin()?);
        let bridge: Arc<dyn Bridge> = Arc::new(bridge_client(config));
        let dispatcher = InstructionDispatcher::new(bridge);

        let orchestrator = Arc::new(ChatOrchestrator::new(
            registry.clone(),
            dispatcher.clone(),
            build_model(config),
            orchestrator_settings(config),
        ));

        Ok(Self {
            registry,
            dispatcher,
            orchestrator,
        })
    }
}

pub fn bridge_client(config: &CopilotConfig) -> BridgeClient {
    BridgeClient::new(config.bridge_host(), config.bridge_port())
        .with_timeout(config.bridge_timeout())
}

/// The configured model, or `None` when no API key is available.
pub fn build_model(config: &CopilotConfig) -> Option<Arc<dyn LanguageModel>> {
    let Some(api_key) = config.api_key() else {
        warn!("No API key configured; chat requests will be rejected");
        return None;
    };
    info!(provider = config.provider(), model = config.model_name(), "Registered model provider");
    let provider = AnthropicProvider::new(api_key).with_base_url(config.base_url());
    Some(Arc::new(provider))
}

pub fn orchestrator_settings(config: &CopilotConfig) -> OrchestratorSettings {
    OrchestratorSettings {
        model: config.model_name().to_string(),
        temperature: config.temperature(),
        max_tokens: config.max_tokens(),
        max_steps: config.max_steps(),
        history_window: config.history_window(),
    }
}
