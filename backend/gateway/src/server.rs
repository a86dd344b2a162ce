//! Main HTTP Gateway Server.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use copilot_agent::ChatOrchestrator;
use tokio::net::TcpListener;
use tracing::{info, instrument};

use crate::{chat_api, health_api, tools_api};

/// Application state shared across routes.
#[derive(Clone)]
pub struct GatewayState {
    pub orchestrator: Arc<ChatOrchestrator>,
    pub bridge_addr: String,
    pub started_at: Instant,
}

impl GatewayState {
    pub fn new(orchestrator: Arc<ChatOrchestrator>, bridge_addr: impl Into<String>) -> Self {
        Self {
            orchestrator,
            bridge_addr: bridge_addr.into(),
            started_at: Instant::now(),
        }
    }
}

/// All gateway routes, bound to `state`.
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/api/chat", post(chat_api::chat))
        .route("/api/tools", get(tools_api::list_tools))
        .route("/api/health", get(health_api::get_health))
        .with_state(state)
}

/// Serve `app` on `addr` until Ctrl-C.
#[instrument(skip(app))]
pub async fn start_server(addr: SocketAddr, app: Router) -> Result<()> {
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind gateway to {addr}"))?;
    info!("Gateway HTTP server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Gateway HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use copilot_agent::OrchestratorSettings;
    use copilot_core::{Bridge, BridgeError, BridgeResponse, LanguageModel};
    use copilot_executor::InstructionDispatcher;
    use copilot_providers::{ScriptedModel, ScriptedStep};
    use copilot_tools::ToolRegistry;
    use serde_json::{json, Map, Value};

    struct OkBridge;

    #[async_trait]
    impl Bridge for OkBridge {
        fn address(&self) -> String {
            "127.0.0.1:8765".into()
        }

        async fn call(&self, _payload: &Map<String, Value>) -> Result<BridgeResponse, BridgeError> {
            Ok(BridgeResponse::new(json!({"ok": true, "result": 2})))
        }
    }

    async fn spawn_gateway(model: Option<Arc<dyn LanguageModel>>) -> String {
        let orchestrator = ChatOrchestrator::new(
            Arc::new(ToolRegistry::builtin().unwrap()),
            InstructionDispatcher::new(Arc::new(OkBridge)),
            model,
            OrchestratorSettings::default(),
        );
        let app = router(GatewayState::new(Arc::new(orchestrator), "127.0.0.1:8765"));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn data_lines(body: &str) -> Vec<&str> {
        body.lines()
            .filter_map(|line| line.strip_prefix("data: "))
            .collect()
    }

    #[tokio::test]
    async fn test_chat_streams_events_then_done() {
        let model = Arc::new(ScriptedModel::new([
            ScriptedStep::tool_call("run-python-script", json!({"script": "result = 1+1"})),
            ScriptedStep::text(["Done."]),
        ]));
        let base = spawn_gateway(Some(model as Arc<dyn LanguageModel>)).await;

        let response = reqwest::Client::new()
            .post(format!("{base}/api/chat"))
            .json(&json!({
                "messages": [],
                "mode": "tool",
                "toolId": "run-python-script",
                "userInput": "result = 1+1"
            }))
            .send()
            .await
            .unwrap();
        assert!(response.status().is_success());
        assert_eq!(
            response.headers()["x-vercel-ai-ui-message-stream"],
            "v1"
        );
        assert!(response.headers()["content-type"]
            .to_str()
            .unwrap()
            .starts_with("text/event-stream"));

        let body = response.text().await.unwrap();
        let lines = data_lines(&body);
        assert_eq!(lines.last(), Some(&"[DONE]"));

        let events: Vec<Value> = lines[..lines.len() - 1]
            .iter()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        let kinds: Vec<&str> = events.iter().map(|e| e["type"].as_str().unwrap()).collect();
        assert_eq!(kinds.first(), Some(&"start"));
        assert_eq!(kinds.last(), Some(&"finish"));

        let finish = &events[events.len() - 1]["messageMetadata"];
        assert_eq!(finish["ok"], true);
        assert_eq!(finish["toolId"], "run-python-script");
        assert_eq!(finish["mode"], "tool");

        let text: String = events
            .iter()
            .filter(|e| e["type"] == "text-delta")
            .map(|e| e["delta"].as_str().unwrap().to_string())
            .collect();
        assert!(text.contains("\"result\": 2"));
    }

    #[tokio::test]
    async fn test_chat_without_credential_still_streams() {
        let base = spawn_gateway(None).await;
        let body = reqwest::Client::new()
            .post(format!("{base}/api/chat"))
            .json(&json!({"messages": [{"id": "1", "role": "user", "parts": [{"type": "text", "text": "hi"}]}]}))
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        let lines = data_lines(&body);
        assert_eq!(lines.len(), 6);
        let finish: Value = serde_json::from_str(lines[4]).unwrap();
        assert_eq!(finish["messageMetadata"]["ok"], false);
        assert_eq!(finish["messageMetadata"]["durationMs"], 0);
    }

    #[tokio::test]
    async fn test_malformed_body_gets_rejected_stream() {
        let model = Arc::new(ScriptedModel::new([ScriptedStep::text(["unused"])]));
        let base = spawn_gateway(Some(model.clone() as Arc<dyn LanguageModel>)).await;
        let response = reqwest::Client::new()
            .post(format!("{base}/api/chat"))
            .header("content-type", "application/json")
            .body(r#"{"messages": "not a list""#)
            .send()
            .await
            .unwrap();
        assert!(response.status().is_success());
        assert_eq!(response.headers()["x-vercel-ai-ui-message-stream"], "v1");

        let body = response.text().await.unwrap();
        let lines = data_lines(&body);
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[5], "[DONE]");
        let kinds: Vec<String> = lines[..5]
            .iter()
            .map(|l| serde_json::from_str::<Value>(l).unwrap()["type"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(kinds, ["start", "text-start", "text-delta", "text-end", "finish"]);

        let finish: Value = serde_json::from_str(lines[4]).unwrap();
        assert_eq!(finish["messageMetadata"]["ok"], false);
        assert_eq!(finish["messageMetadata"]["durationMs"], 0);
        assert!(finish["messageMetadata"]["error"]
            .as_str()
            .unwrap()
            .starts_with("The chat request could not be read"));
        assert_eq!(model.request_count(), 0);
    }

    #[tokio::test]
    async fn test_tools_catalog() {
        let base = spawn_gateway(None).await;
        let tools: Vec<Value> = reqwest::get(format!("{base}/api/tools"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(tools.len(), 3);
        assert_eq!(tools[0]["id"], "run-python-script");
        assert_eq!(tools[0]["requiresInput"], true);
        assert!(tools[0]["placeholder"].is_string());
        assert_eq!(tools[1]["requiresInput"], false);
    }

    #[tokio::test]
    async fn test_health_reports_bridge() {
        let base = spawn_gateway(None).await;
        let health: Value = reqwest::get(format!("{base}/api/health"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(health["status"], "ok");
        assert_eq!(health["bridge"], "127.0.0.1:8765");
        assert_eq!(health["modelConfigured"], false);
        assert_eq!(health["tools"], 3);
    }
}
