use copilot_core::{BridgeError, BridgeResponse};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Read the first response from the bridge.
///
/// Blank lines are skipped. The first non-blank newline-terminated line is
/// parsed and returned; nothing after it is consumed. If the peer closes
/// before a newline arrives, whatever trailing text is buffered is parsed
/// instead. A peer that closes having sent nothing is an error.
pub async fn read_response<R>(reader: &mut R) -> Result<BridgeResponse, BridgeError>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = Vec::new();
    loop {
        line.clear();
        let read = reader.read_until(b'\n', &mut line).await?;
        if read == 0 {
            return Err(BridgeError::ClosedWithoutResponse);
        }

        let terminated = line.last() == Some(&b'\n');
        let text = line.trim_ascii();
        if terminated && text.is_empty() {
            continue;
        }

        let value: Value = serde_json::from_slice(text).map_err(BridgeError::Parse)?;
        return Ok(BridgeResponse::new(value));
    }
}
