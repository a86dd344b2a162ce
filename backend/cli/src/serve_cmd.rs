//! CLI Serve Command
//!
//! Runs the HTTP gateway.

use std::net::{IpAddr, SocketAddr};

use anyhow::{Context, Result};
use copilot_config::CopilotConfig;
use copilot_gateway::{router, start_server, GatewayState};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::runtime::Runtime;

pub async fn run(config: &CopilotConfig, runtime: Runtime, port: Option<u16>) -> Result<()> {
    let port = port.unwrap_or(config.gateway_port());
    let ip: IpAddr = config
        .gateway_bind()
        .parse()
        .with_context(|| format!("Invalid gateway bind address: {}", config.gateway_bind()))?;
    let addr = SocketAddr::new(ip, port);

    info!(
        %addr,
        bridge = %runtime.dispatcher.bridge_address(),
        model = config.model_name(),
        tools = runtime.registry.len(),
        "Starting Resolve Copilot gateway"
    );

    let state = GatewayState::new(runtime.orchestrator, runtime.dispatcher.bridge_address());
    let app = router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    start_server(addr, app).await
}
