use std::time::{Duration, Instant};

use async_trait::async_trait;
use copilot_core::{Bridge, BridgeError, BridgeResponse};
use serde_json::{Map, Value};
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, instrument, warn};

use crate::framing::read_response;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8765;

/// Client for the bridge target's line-delimited JSON protocol.
///
/// Connections are never pooled: each call connects, sends one request line,
/// waits for the first response line and tears the socket down.
#[derive(Debug, Clone)]
pub struct BridgeClient {
    host: String,
    port: u16,
    deadline: Option<Duration>,
}

impl BridgeClient {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            deadline: None,
        }
    }

    /// Bound the whole exchange (connect, write, first line). `None` waits forever.
    pub fn with_timeout(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.deadline
    }

    async fn exchange(&self, payload: &Map<String, Value>) -> Result<BridgeResponse, BridgeError> {
        let mut stream = TcpStream::connect((self.host.as_str(), self.port))
            .await
            .map_err(|source| BridgeError::Unreachable {
                addr: self.address(),
                source,
            })?;

        let mut line = serde_json::to_vec(payload).map_err(BridgeError::Encode)?;
        line.push(b'\n');
        stream.write_all(&line).await?;
        stream.flush().await?;

        let result = {
            let mut reader = BufReader::new(&mut stream);
            read_response(&mut reader).await
        };

        // Close as soon as the first line is in, whatever else is pending.
        if let Err(e) = stream.shutdown().await {
            debug!(error = %e, "Bridge socket shutdown failed");
        }
        result
    }
}

impl Default for BridgeClient {
    fn default() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_PORT)
    }
}

#[async_trait]
impl Bridge for BridgeClient {
    fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    #[instrument(skip(self, payload), fields(addr = %self.address(), op = payload.get("op").and_then(serde_json::Value::as_str).unwrap_or("-")))]
    async fn call(&self, payload: &Map<String, Value>) -> Result<BridgeResponse, BridgeError> {
        let start = Instant::now();
        let result = match self.deadline {
            Some(limit) => timeout(limit, self.exchange(payload))
                .await
                .map_err(|_| BridgeError::Timeout(limit))?,
            None => self.exchange(payload).await,
        };

        match &result {
            Ok(_) => debug!(elapsed_ms = start.elapsed().as_millis() as u64, "Bridge responded"),
            Err(e) => warn!(error = %e, "Bridge call failed"),
        }
        result
    }
}
