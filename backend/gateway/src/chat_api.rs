//! Streaming chat endpoint.
//!
//! Each request gets its own orchestration run on a spawned task; events are
//! relayed as server-sent events, one JSON object per `data:` line, followed by
//! a final `[DONE]` marker. A body that is not a valid chat request still gets
//! a complete, rejected event sequence.

use std::convert::Infallible;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderName, HeaderValue},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
};
use copilot_agent::DEFAULT_LABEL;
use copilot_core::{ChatRequest, Mode, OrchestrationMetadata, StreamEvent, generate_id};
use futures::stream::{self, Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, info, warn};

use crate::server::GatewayState;

pub const UI_STREAM_HEADER: &str = "x-vercel-ai-ui-message-stream";
pub const UI_STREAM_VERSION: &str = "v1";

fn to_sse(event: StreamEvent) -> Event {
    match Event::default().json_data(&event) {
        Ok(sse) => sse,
        Err(e) => {
            warn!(kind = event.kind(), error = %e, "Failed to encode stream event");
            Event::default().comment("encode error")
        }
    }
}

fn event_stream(
    rx: mpsc::UnboundedReceiver<StreamEvent>,
) -> impl Stream<Item = Result<Event, Infallible>> {
    UnboundedReceiverStream::new(rx)
        .map(to_sse)
        .chain(stream::once(async { Event::default().data("[DONE]") }))
        .map(Ok::<_, Infallible>)
}

/// Write the rejected sequence for a body that could not be decoded.
fn reject_malformed(tx: &mpsc::UnboundedSender<StreamEvent>, message: String) {
    let base = OrchestrationMetadata::new(Mode::Chat, DEFAULT_LABEL, None);
    let id = generate_id();
    let events = [
        StreamEvent::Start {
            message_metadata: base.clone(),
        },
        StreamEvent::TextStart { id: id.clone() },
        StreamEvent::TextDelta {
            id: id.clone(),
            delta: message.clone(),
        },
        StreamEvent::TextEnd { id },
        StreamEvent::Finish {
            message_metadata: base.finished(false, Some(message), 0),
        },
    ];
    for event in events {
        let _ = tx.send(event);
    }
}

/// Handler for `POST /api/chat`
pub async fn chat(State(state): State<GatewayState>, body: Bytes) -> impl IntoResponse {
    let (tx, rx) = mpsc::unbounded_channel();

    match serde_json::from_slice::<ChatRequest>(&body) {
        Ok(request) => start_run(&state, request, tx),
        Err(e) => {
            warn!(error = %e, bytes = body.len(), "Malformed chat request");
            reject_malformed(&tx, format!("The chat request could not be read: {e}"));
        }
    }

    (
        [
            (
                HeaderName::from_static(UI_STREAM_HEADER),
                HeaderValue::from_static(UI_STREAM_VERSION),
            ),
            (
                HeaderName::from_static("x-accel-buffering"),
                HeaderValue::from_static("no"),
            ),
        ],
        Sse::new(event_stream(rx)).keep_alive(KeepAlive::default()),
    )
}

fn start_run(state: &GatewayState, request: ChatRequest, tx: mpsc::UnboundedSender<StreamEvent>) {
    info!(
        mode = %request.mode(),
        tool_id = request.tool_id.as_deref().unwrap_or("-"),
        messages = request.messages.len(),
        "Chat request received"
    );

    let orchestrator = state.orchestrator.clone();
    tokio::spawn(async move {
        orchestrator.run(request, tx).await;
        debug!("Orchestration run finished");
    });
}
