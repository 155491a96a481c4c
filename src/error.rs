//! Error taxonomy for the bridging core.
//!
//! Most faults inside a running bridge are handled locally: logged once and
//! absorbed, since a handler error must never propagate into the event
//! dispatcher or break the RTP callback mid-call. The variants here cover
//! the subset of conditions that a caller — the signalling collaborator
//! embedding this crate — actually needs to branch on: bridge construction,
//! explicit session sends, and queries against a closed bridge.

use std::time::Duration;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The remote session never reached `Ready` before the deadline. Fatal
    /// to the call; there is no audio path to recover into.
    #[error("session did not reach Ready within {0:?}")]
    SessionReadinessTimeout(Duration),

    /// Uplink audio arrived while the session was not ready to accept it —
    /// either before `session.updated` or after the session closed.
    #[error("session is not ready to accept audio (state = {0})")]
    SessionNotReady(&'static str),

    /// The bridge (or one of its pipelines) was closed and can no longer be used.
    #[error("bridge is closed")]
    Closed,

    /// The underlying session transport rejected a send that was not the
    /// suppressed best-effort audio chunk case.
    #[error("session send failed: {0}")]
    SessionSend(String),
}
