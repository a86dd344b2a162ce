//! Gateway Health API

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::server::GatewayState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub bridge: String,
    pub model_configured: bool,
    pub tools: usize,
    pub timestamp: DateTime<Utc>,
}

/// Handler for `GET /api/health`
///
/// Reports the gateway process itself; the bridge is not contacted.
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthReport> {
    Json(HealthReport {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        bridge: state.bridge_addr.clone(),
        model_configured: state.orchestrator.has_model(),
        tools: state.orchestrator.registry().len(),
        timestamp: Utc::now(),
    })
}
