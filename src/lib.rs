//! Audio bridging core for a real-time voice gateway: the per-call pipeline
//! that sits between a SIP/RTP leg speaking G.711 µ-law at 8 kHz and a
//! cloud voice-live session speaking PCM16 at 24 kHz.
//!
//! This crate owns transcoding, resampling, pacing, buffering, and the
//! session event lifecycle (readiness, proactive greeting, transcription,
//! barge-in). It does not open sockets: the signalling collaborator owns
//! the RTP stack and the session transport, and talks to a [`bridge::MediaBridge`]
//! through two opaque byte handles ([`bridge::UplinkSink`], [`bridge::DownlinkSource`]).

pub mod bridge;
pub mod codec;
pub mod config;
pub mod downlink;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod resample;
pub mod session;
pub mod uplink;

pub use bridge::{DownlinkSource, MediaBridge, UplinkSink};
pub use config::{BridgeConfig, NoiseReductionMode, SessionConfig, TranscriptionMode, VadConfig};
pub use error::{Error, Result};
pub use session::{ClientEvent, ServerEvent, SessionTransport};
