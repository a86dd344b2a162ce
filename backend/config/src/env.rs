//! Environment handling for config values.
//!
//! `${VAR_NAME}` in any string value is replaced at load time; only uppercase
//! `[A-Z_][A-Z0-9_]*` names are matched and `$${VAR}` stays a literal `${VAR}`.
//! A fixed set of variables then overrides individual fields.

use anyhow::Result;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

use crate::schema::{BridgeConfig, CopilotConfig, GatewayConfig, ModelConfig};

/// A reference, optionally escaped by a leading `$`.
static ENV_REF_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\$?)\$\{([A-Z_][A-Z0-9_]*)\}").unwrap());

pub const API_KEY_VAR: &str = "ANTHROPIC_API_KEY";
pub const BRIDGE_HOST_VAR: &str = "COPILOT_BRIDGE_HOST";
pub const BRIDGE_PORT_VAR: &str = "COPILOT_BRIDGE_PORT";
pub const BIND_VAR: &str = "COPILOT_BIND";
pub const PORT_VAR: &str = "COPILOT_PORT";
pub const MODEL_VAR: &str = "COPILOT_MODEL";

#[derive(Debug, thiserror::Error)]
#[error("Missing env var \"{var_name}\" referenced at config path: {config_path}")]
pub struct MissingEnvVarError {
    pub var_name: String,
    pub config_path: String,
}

#[derive(Debug, thiserror::Error)]
#[error("Env var {var_name} is not a valid port: \"{value}\"")]
pub struct InvalidPortError {
    pub var_name: String,
    pub value: String,
}

/// Substitute `${VAR}` references from the process environment.
pub fn resolve_env_vars(value: &Value) -> Result<Value, MissingEnvVarError> {
    resolve_env_vars_with(value, &std::env::vars().collect())
}

/// Substitute `${VAR}` references from `env`.
pub fn resolve_env_vars_with(
    value: &Value,
    env: &HashMap<String, String>,
) -> Result<Value, MissingEnvVarError> {
    substitute(value, env, "")
}

fn substitute(
    value: &Value,
    env: &HashMap<String, String>,
    path: &str,
) -> Result<Value, MissingEnvVarError> {
    Ok(match value {
        Value::String(s) => Value::String(substitute_string(s, env, path)?),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .enumerate()
                .map(|(i, v)| substitute(v, env, &format!("{path}[{i}]")))
                .collect::<Result<_, _>>()?,
        ),
        Value::Object(map) => {
            let mut out = serde_json::Map::with_capacity(map.len());
            for (key, v) in map {
                let child = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{path}.{key}")
                };
                out.insert(key.clone(), substitute(v, env, &child)?);
            }
            Value::Object(out)
        }
        other => other.clone(),
    })
}

fn substitute_string(
    s: &str,
    env: &HashMap<String, String>,
    path: &str,
) -> Result<String, MissingEnvVarError> {
    if !s.contains("${") {
        return Ok(s.to_string());
    }
    let mut missing = None;
    let replaced = ENV_REF_PATTERN.replace_all(s, |caps: &Captures| {
        let name = &caps[2];
        if !caps[1].is_empty() {
            return format!("${{{name}}}");
        }
        match env.get(name) {
            Some(v) if !v.is_empty() => v.clone(),
            _ => {
                missing.get_or_insert_with(|| MissingEnvVarError {
                    var_name: name.to_string(),
                    config_path: path.to_string(),
                });
                String::new()
            }
        }
    });
    match missing {
        Some(err) => Err(err),
        None => Ok(replaced.into_owned()),
    }
}

/// Apply overrides from the process environment.
pub fn apply_env_overrides(config: CopilotConfig) -> Result<CopilotConfig> {
    apply_env_overrides_with(config, &std::env::vars().collect())
}

/// Apply overrides from `env`; blank values are ignored.
pub fn apply_env_overrides_with(
    mut config: CopilotConfig,
    env: &HashMap<String, String>,
) -> Result<CopilotConfig> {
    let get = |name: &str| env.get(name).map(|v| v.trim()).filter(|v| !v.is_empty());

    if let Some(key) = get(API_KEY_VAR) {
        debug!("Model API key taken from {}", API_KEY_VAR);
        config.model.get_or_insert_with(ModelConfig::default).api_key = Some(key.to_string());
    }
    if let Some(model) = get(MODEL_VAR) {
        config.model.get_or_insert_with(ModelConfig::default).model = Some(model.to_string());
    }
    if let Some(host) = get(BRIDGE_HOST_VAR) {
        config.bridge.get_or_insert_with(BridgeConfig::default).host = Some(host.to_string());
    }
    if let Some(port) = get(BRIDGE_PORT_VAR) {
        config.bridge.get_or_insert_with(BridgeConfig::default).port =
            Some(parse_port(BRIDGE_PORT_VAR, port)?);
    }
    if let Some(bind) = get(BIND_VAR) {
        config.gateway.get_or_insert_with(GatewayConfig::default).bind = Some(bind.to_string());
    }
    if let Some(port) = get(PORT_VAR) {
        config.gateway.get_or_insert_with(GatewayConfig::default).port =
            Some(parse_port(PORT_VAR, port)?);
    }
    Ok(config)
}

fn parse_port(var_name: &str, value: &str) -> Result<u16, InvalidPortError> {
    value.parse().map_err(|_| InvalidPortError {
        var_name: var_name.to_string(),
        value: value.to_string(),
    })
}
