//! Bridge RPC client.
//!
//! One TCP connection per call: write `<json>\n`, read the first non-blank
//! line back, close. Only the first response line is ever used.

pub mod client;
pub mod framing;

pub use client::BridgeClient;
pub use framing::read_response;
