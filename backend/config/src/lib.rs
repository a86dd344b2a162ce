//! `copilot-config`: Resolve Copilot runtime configuration.
//!
//! Provides:
//! - Typed config schema (bridge, model, chat, gateway, logging)
//! - YAML loading from the config directory
//! - `${ENV_VAR}` substitution and environment overrides
//! - Default value application
//! - Validation with errors and warnings

pub mod defaults;
pub mod env;
pub mod io;
pub mod schema;
pub mod validation;

pub use defaults::apply_all_defaults;
pub use env::{
    apply_env_overrides, apply_env_overrides_with, resolve_env_vars, resolve_env_vars_with,
    MissingEnvVarError,
};
pub use io::{config_dir, config_file_path, load_config};
pub use schema::CopilotConfig;
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use std::path::Path;

/// Load, substitute env vars, apply overrides and defaults, then validate.
///
/// This is the main entry point for loading a config at runtime.
pub async fn load_and_prepare(path: &Path) -> Result<CopilotConfig> {
    load_and_prepare_with(path, &std::env::vars().collect()).await
}

/// [`load_and_prepare`] against an explicit environment.
pub async fn load_and_prepare_with(
    path: &Path,
    env: &HashMap<String, String>,
) -> Result<CopilotConfig> {
    let raw = io::load_raw(path).await?;
    let value = resolve_env_vars_with(&raw, env).context("Failed to resolve env vars in config")?;

    let config: CopilotConfig = serde_json::from_value(value)
        .with_context(|| format!("Invalid config structure in: {}", path.display()))?;
    let config = apply_env_overrides_with(config, env)?;
    let config = apply_all_defaults(config);

    let report = validate(&config);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for error in &report.errors {
        tracing::error!(path = %error.path, message = %error.message, "Config error");
    }
    if !report.is_valid() {
        let details: Vec<String> = report.errors.iter().map(ToString::to_string).collect();
        bail!("Invalid configuration:\n  {}", details.join("\n  "));
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(name: &str, yaml: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("copilot-config-lib-{}-{name}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = config_file_path(&dir);
        std::fs::write(&path, yaml).unwrap();
        path
    }

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[tokio::test]
    async fn test_full_pipeline() {
        let path = write_config(
            "full",
            "model:\n  apiKey: ${MY_KEY}\nbridge:\n  port: 9001\n",
        );
        let config = load_and_prepare_with(&path, &env(&[("MY_KEY", "sk-ant-file"), ("COPILOT_PORT", "3100")]))
            .await
            .unwrap();
        assert_eq!(config.api_key(), Some("sk-ant-file"));
        assert_eq!(config.bridge_port(), 9001);
        assert_eq!(config.gateway_port(), 3100);
        assert_eq!(config.bridge.as_ref().unwrap().timeout_ms, Some(30_000));
    }

    #[tokio::test]
    async fn test_env_key_overrides_file_key() {
        let path = write_config("override", "model:\n  apiKey: sk-ant-file\n");
        let config = load_and_prepare_with(&path, &env(&[("ANTHROPIC_API_KEY", "sk-ant-env")]))
            .await
            .unwrap();
        assert_eq!(config.api_key(), Some("sk-ant-env"));
    }

    #[tokio::test]
    async fn test_invalid_config_is_rejected() {
        let path = write_config("invalid", "chat:\n  maxSteps: 0\n");
        let err = load_and_prepare_with(&path, &HashMap::new()).await.unwrap_err();
        assert!(err.to_string().contains("chat.maxSteps"));
    }

    #[tokio::test]
    async fn test_missing_env_var_fails() {
        let path = write_config("missing-var", "model:\n  apiKey: ${NOT_SET_ANYWHERE}\n");
        let err = load_and_prepare_with(&path, &HashMap::new()).await.unwrap_err();
        assert!(format!("{err:#}").contains("NOT_SET_ANYWHERE"));
    }
}
