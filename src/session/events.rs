//! Typed server-sent events from the remote voice-live session.
//!
//! The embedding collaborator owns the wire format (JSON parsing, base64
//! audio decoding); by the time an event reaches [`SessionController`](super::controller::SessionController)
//! it is already one of these variants with plain bytes/strings.

#[derive(Debug, Clone)]
pub enum ServerEvent {
    SessionCreated { session_id: String },
    SessionUpdated,
    ResponseCreated,
    /// Raw PCM16 little-endian bytes at 24 kHz.
    ResponseAudioDelta { audio: Vec<u8> },
    ResponseAudioDone,
    ResponseTextDelta { text: String },
    ResponseAudioTimestampDelta,
    SpeechStarted,
    SpeechStopped,
    InputTranscriptionCompleted { text: String },
    Error { message: String },
    /// Any event variant this controller does not act on.
    Other(String),
}

/// Client-originated control events sent out to the session. The
/// `session.update` payload is built ad hoc as a `serde_json::Value`
/// rather than through a dedicated wire-format struct, since it is sent
/// once per call and never matched on.
#[derive(Debug, Clone)]
pub enum ClientEvent {
    SessionUpdate(serde_json::Value),
    ResponseCreate,
}
