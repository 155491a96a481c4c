//! The session-side contract the embedding collaborator implements.
//!
//! This crate never opens the websocket/HTTP connection to the remote
//! voice-live service itself — that, along with JSON framing and base64
//! audio decoding, is the host process's job. `SessionTransport` is the
//! seam between the wire protocol and what happens to the bytes once
//! decoded.

use async_trait::async_trait;

use super::events::ClientEvent;
use crate::error::Result;

#[async_trait]
pub trait SessionTransport: Send + Sync {
    /// Send raw PCM16 little-endian audio at the configured sample rate.
    /// Implementations should not block the caller on network I/O; this is
    /// a logical `bytes -> future<()>` dispatch, fire-and-forget from the
    /// uplink pipeline's point of view.
    async fn send_input_audio(&self, pcm16_le: Vec<u8>) -> Result<()>;

    /// Send a control event (`session.update`, `response.create`, ...).
    async fn send_event(&self, event: ClientEvent) -> Result<()>;
}
