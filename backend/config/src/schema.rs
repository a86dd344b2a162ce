//! Resolve Copilot runtime configuration schema.
//!
//! Every field is optional in the file; accessors fall back to the defaults
//! in [`crate::defaults`].

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::defaults::*;

/// Root configuration (`config.yaml`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CopilotConfig {
    /// Connection to the Resolve bridge
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bridge: Option<BridgeConfig>,

    /// Language model provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelConfig>,

    /// Orchestration limits
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat: Option<ChatConfig>,

    /// HTTP gateway
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway: Option<GatewayConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BridgeConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// Deadline for one bridge exchange; `0` waits forever.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ModelConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatConfig {
    /// Trailing user/assistant turns sent to the model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_window: Option<usize>,
    /// Upper bound on generation steps per request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_steps: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    /// Directory for the rolling log file; console only when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json: Option<bool>,
}

impl CopilotConfig {
    pub fn bridge_host(&self) -> &str {
        self.bridge
            .as_ref()
            .and_then(|b| b.host.as_deref())
            .unwrap_or(DEFAULT_BRIDGE_HOST)
    }

    pub fn bridge_port(&self) -> u16 {
        self.bridge
            .as_ref()
            .and_then(|b| b.port)
            .unwrap_or(DEFAULT_BRIDGE_PORT)
    }

    /// `None` when the deadline is disabled.
    pub fn bridge_timeout(&self) -> Option<Duration> {
        let ms = self
            .bridge
            .as_ref()
            .and_then(|b| b.timeout_ms)
            .unwrap_or(DEFAULT_BRIDGE_TIMEOUT_MS);
        (ms > 0).then(|| Duration::from_millis(ms))
    }

    pub fn provider(&self) -> &str {
        self.model
            .as_ref()
            .and_then(|m| m.provider.as_deref())
            .unwrap_or(DEFAULT_PROVIDER)
    }

    pub fn model_name(&self) -> &str {
        self.model
            .as_ref()
            .and_then(|m| m.model.as_deref())
            .unwrap_or(DEFAULT_MODEL)
    }

    /// The API key, if one is set and non-blank.
    pub fn api_key(&self) -> Option<&str> {
        self.model
            .as_ref()
            .and_then(|m| m.api_key.as_deref())
            .filter(|k| !k.trim().is_empty())
    }

    pub fn base_url(&self) -> &str {
        self.model
            .as_ref()
            .and_then(|m| m.base_url.as_deref())
            .unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn temperature(&self) -> f32 {
        self.model
            .as_ref()
            .and_then(|m| m.temperature)
            .unwrap_or(DEFAULT_TEMPERATURE)
    }

    pub fn max_tokens(&self) -> u32 {
        self.model
            .as_ref()
            .and_then(|m| m.max_tokens)
            .unwrap_or(DEFAULT_MAX_TOKENS)
    }

    pub fn history_window(&self) -> usize {
        self.chat
            .as_ref()
            .and_then(|c| c.history_window)
            .unwrap_or(DEFAULT_HISTORY_WINDOW)
    }

    pub fn max_steps(&self) -> usize {
        self.chat
            .as_ref()
            .and_then(|c| c.max_steps)
            .unwrap_or(DEFAULT_MAX_STEPS)
    }

    pub fn gateway_bind(&self) -> &str {
        self.gateway
            .as_ref()
            .and_then(|g| g.bind.as_deref())
            .unwrap_or(DEFAULT_GATEWAY_BIND)
    }

    pub fn gateway_port(&self) -> u16 {
        self.gateway
            .as_ref()
            .and_then(|g| g.port)
            .unwrap_or(DEFAULT_GATEWAY_PORT)
    }

    pub fn log_level(&self) -> &str {
        self.logging
            .as_ref()
            .and_then(|l| l.level.as_deref())
            .unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn log_dir(&self) -> Option<&std::path::Path> {
        self.logging.as_ref().and_then(|l| l.dir.as_deref())
    }

    pub fn log_json(&self) -> bool {
        self.logging.as_ref().and_then(|l| l.json).unwrap_or(false)
    }
}
