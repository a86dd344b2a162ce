//! Tool catalog for the chat surface.

use axum::{extract::State, Json};
use copilot_tools::ToolSummary;

use crate::server::GatewayState;

/// Handler for `GET /api/tools`
pub async fn list_tools(State(state): State<GatewayState>) -> Json<Vec<ToolSummary>> {
    Json(state.orchestrator.registry().catalog())
}
