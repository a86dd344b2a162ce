//! CLI Status Command
//!
//! Queries a running gateway's health endpoint.

use std::time::Duration;

use anyhow::Result;
use serde_json::Value;

use crate::terminal_output::{note_info, note_success, note_warn};

pub async fn run(host: &str, port: u16) -> Result<bool> {
    let url = format!("http://{host}:{port}/api/health");
    note_info(&format!("Checking {url}"));

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()?;
    let response = match client.get(&url).send().await {
        Ok(response) => response,
        Err(_) => {
            note_warn(&format!("Resolve Copilot is not running on {host}:{port}"));
            return Ok(false);
        }
    };

    let body: Value = response.json().await?;
    note_success(&format!(
        "Resolve Copilot {} is up ({}s)",
        body["version"].as_str().unwrap_or("?"),
        body["uptimeSeconds"].as_u64().unwrap_or(0)
    ));
    if body["modelConfigured"] == Value::Bool(false) {
        note_warn("No model credential configured; chat requests are rejected");
    }
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(true)
}
