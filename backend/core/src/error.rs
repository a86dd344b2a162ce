use std::time::Duration;

use thiserror::Error;

/// Top-level error type for the Resolve Copilot runtime.
#[derive(Debug, Error)]
pub enum CopilotError {
    #[error(transparent)]
    Bridge(#[from] BridgeError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Failure to obtain a response line from the bridge target.
///
/// Every variant is a connectivity problem from the caller's point of view;
/// a well-formed `{"ok": false}` reply is not an error at this layer.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Davinci Resolve is unreachable at {addr} ({source}). Ensure the integration bridge is running.")]
    Unreachable {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("bridge connection failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode bridge request: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("bridge response is not valid JSON: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("bridge did not respond within {} ms", .0.as_millis())]
    Timeout(Duration),

    #[error("bridge closed the connection without responding")]
    ClosedWithoutResponse,
}

/// Failure raised while streaming a generation from a language model.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model request failed: {0}")]
    Http(String),

    #[error("model provider returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("model stream error: {0}")]
    Stream(String),

    #[error("failed to decode model output: {0}")]
    Decode(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreachable_message_names_address() {
        let err = BridgeError::Unreachable {
            addr: "127.0.0.1:8765".into(),
            source: std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused"),
        };
        let msg = err.to_string();
        assert!(msg.contains("127.0.0.1:8765"));
        assert!(msg.contains("unreachable"));
    }

    #[test]
    fn test_timeout_message_in_millis() {
        let err = BridgeError::Timeout(Duration::from_millis(1500));
        assert_eq!(err.to_string(), "bridge did not respond within 1500 ms");
    }

    #[test]
    fn test_wraps_into_copilot_error() {
        let err: CopilotError = BridgeError::ClosedWithoutResponse.into();
        assert!(matches!(err, CopilotError::Bridge(_)));
    }
}
