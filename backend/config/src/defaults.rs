//! Config defaults.

use crate::schema::{
    BridgeConfig, ChatConfig, CopilotConfig, GatewayConfig, LoggingConfig, ModelConfig,
};

pub const DEFAULT_BRIDGE_HOST: &str = "127.0.0.1";
pub const DEFAULT_BRIDGE_PORT: u16 = 8765;
pub const DEFAULT_BRIDGE_TIMEOUT_MS: u64 = 30_000;

pub const DEFAULT_PROVIDER: &str = "anthropic";
pub const DEFAULT_MODEL: &str = "claude-3-7-sonnet-latest";
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_TEMPERATURE: f32 = 0.3;
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

pub const DEFAULT_HISTORY_WINDOW: usize = 12;
pub const DEFAULT_MAX_STEPS: usize = 5;

pub const DEFAULT_GATEWAY_BIND: &str = "127.0.0.1";
pub const DEFAULT_GATEWAY_PORT: u16 = 3000;

pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Providers this build knows how to construct.
pub const KNOWN_PROVIDERS: &[&str] = &["anthropic"];

/// Fill every unset field with its default.
pub fn apply_all_defaults(config: CopilotConfig) -> CopilotConfig {
    let config = apply_bridge_defaults(config);
    let config = apply_model_defaults(config);
    let config = apply_chat_defaults(config);
    let config = apply_gateway_defaults(config);
    apply_logging_defaults(config)
}

fn apply_bridge_defaults(mut config: CopilotConfig) -> CopilotConfig {
    let bridge = config.bridge.get_or_insert_with(BridgeConfig::default);
    bridge.host.get_or_insert_with(|| DEFAULT_BRIDGE_HOST.to_string());
    bridge.port.get_or_insert(DEFAULT_BRIDGE_PORT);
    bridge.timeout_ms.get_or_insert(DEFAULT_BRIDGE_TIMEOUT_MS);
    config
}

/// The API key is left unset; it has no default.
fn apply_model_defaults(mut config: CopilotConfig) -> CopilotConfig {
    let model = config.model.get_or_insert_with(ModelConfig::default);
    model.provider.get_or_insert_with(|| DEFAULT_PROVIDER.to_string());
    model.model.get_or_insert_with(|| DEFAULT_MODEL.to_string());
    model.base_url.get_or_insert_with(|| DEFAULT_BASE_URL.to_string());
    model.temperature.get_or_insert(DEFAULT_TEMPERATURE);
    model.max_tokens.get_or_insert(DEFAULT_MAX_TOKENS);
    config
}

fn apply_chat_defaults(mut config: CopilotConfig) -> CopilotConfig {
    let chat = config.chat.get_or_insert_with(ChatConfig::default);
    chat.history_window.get_or_insert(DEFAULT_HISTORY_WINDOW);
    chat.max_steps.get_or_insert(DEFAULT_MAX_STEPS);
    config
}

fn apply_gateway_defaults(mut config: CopilotConfig) -> CopilotConfig {
    let gateway = config.gateway.get_or_insert_with(GatewayConfig::default);
    gateway.bind.get_or_insert_with(|| DEFAULT_GATEWAY_BIND.to_string());
    gateway.port.get_or_insert(DEFAULT_GATEWAY_PORT);
    config
}

fn apply_logging_defaults(mut config: CopilotConfig) -> CopilotConfig {
    let logging = config.logging.get_or_insert_with(LoggingConfig::default);
    logging.level.get_or_insert_with(|| DEFAULT_LOG_LEVEL.to_string());
    logging.json.get_or_insert(false);
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_empty_config() {
        let config = apply_all_defaults(CopilotConfig::default());
        let bridge = config.bridge.as_ref().unwrap();
        assert_eq!(bridge.port, Some(8765));
        assert_eq!(bridge.timeout_ms, Some(30_000));
        let model = config.model.as_ref().unwrap();
        assert_eq!(model.provider.as_deref(), Some("anthropic"));
        assert!(model.api_key.is_none());
        assert_eq!(config.chat.as_ref().unwrap().max_steps, Some(5));
        assert!(config.logging.as_ref().unwrap().dir.is_none());
    }

    #[test]
    fn test_defaults_keep_explicit_values() {
        let config = CopilotConfig {
            gateway: Some(GatewayConfig {
                bind: None,
                port: Some(8080),
            }),
            ..CopilotConfig::default()
        };
        let config = apply_all_defaults(config);
        let gateway = config.gateway.unwrap();
        assert_eq!(gateway.port, Some(8080));
        assert_eq!(gateway.bind.as_deref(), Some("127.0.0.1"));
    }
}
