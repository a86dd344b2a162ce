//! Config validation with field paths and readable messages.

use crate::defaults::KNOWN_PROVIDERS;
use crate::schema::CopilotConfig;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the config and return every error and warning found.
pub fn validate(config: &CopilotConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_bridge(config, &mut report);
    validate_model(config, &mut report);
    validate_chat(config, &mut report);
    validate_gateway(config, &mut report);
    report
}

fn validate_bridge(config: &CopilotConfig, report: &mut ValidationReport) {
    if config.bridge_host().trim().is_empty() {
        report.error("bridge.host", "Bridge host cannot be empty");
    }
    if config.bridge_port() == 0 {
        report.error("bridge.port", "Bridge port must be between 1 and 65535");
    }
    if config.bridge_timeout().is_none() {
        report.warn(
            "bridge.timeoutMs",
            "Bridge timeout is disabled; a silent bridge will stall requests",
        );
    }
}

fn validate_model(config: &CopilotConfig, report: &mut ValidationReport) {
    let provider = config.provider();
    if !KNOWN_PROVIDERS.contains(&provider) {
        report.error(
            "model.provider",
            format!(
                "Unknown provider \"{provider}\" (expected one of: {})",
                KNOWN_PROVIDERS.join(", ")
            ),
        );
    }
    if config.model_name().trim().is_empty() {
        report.error("model.model", "Model name cannot be empty");
    }
    let temperature = config.temperature();
    if !(0.0..=1.0).contains(&temperature) {
        report.error(
            "model.temperature",
            format!("Temperature must be within [0, 1], got {temperature}"),
        );
    }
    if config.max_tokens() == 0 {
        report.error("model.maxTokens", "maxTokens must be at least 1");
    }
    if config.api_key().is_none() {
        report.warn(
            "model.apiKey",
            "No API key configured; chat requests will be rejected until ANTHROPIC_API_KEY is set",
        );
    }
}

fn validate_chat(config: &CopilotConfig, report: &mut ValidationReport) {
    if config.history_window() == 0 {
        report.error("chat.historyWindow", "historyWindow must be at least 1");
    }
    if config.max_steps() == 0 {
        report.error("chat.maxSteps", "maxSteps must be at least 1");
    }
}

fn validate_gateway(config: &CopilotConfig, report: &mut ValidationReport) {
    if config.gateway_port() == 0 {
        report.error("gateway.port", "Gateway port must be between 1 and 65535");
    }
    if config.gateway_bind().trim().is_empty() {
        report.error("gateway.bind", "Gateway bind address cannot be empty");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ChatConfig, GatewayConfig, ModelConfig};

    fn keyed() -> CopilotConfig {
        CopilotConfig {
            model: Some(ModelConfig {
                api_key: Some("sk-ant-test".into()),
                ..ModelConfig::default()
            }),
            ..CopilotConfig::default()
        }
    }

    #[test]
    fn test_defaults_with_key_are_clean() {
        let report = validate(&keyed());
        assert!(report.is_valid());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_missing_key_is_only_a_warning() {
        let report = validate(&CopilotConfig::default());
        assert!(report.is_valid());
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].path, "model.apiKey");
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = keyed();
        config.model.as_mut().unwrap().provider = Some("openai".into());
        config.model.as_mut().unwrap().temperature = Some(1.5);
        config.chat = Some(ChatConfig {
            history_window: Some(0),
            max_steps: Some(0),
        });
        config.gateway = Some(GatewayConfig {
            bind: None,
            port: Some(0),
        });

        let report = validate(&config);
        let paths: Vec<&str> = report.errors.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "model.provider",
                "model.temperature",
                "chat.historyWindow",
                "chat.maxSteps",
                "gateway.port"
            ]
        );
    }
}
