//! Overridable tunables for the bridging core.
//!
//! This crate has no CLI surface of its own — the embedding signalling
//! process constructs these structs in-process — so configuration is a
//! plain `Default`-implementing struct, one field per knob, rather than a
//! `clap::Parser`.

use std::time::Duration;

/// Tunables governing packet sizing, watermarks, and downlink pacing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BridgeConfig {
    /// Size of one downlink RTP payload packet (20 ms @ 8 kHz µ-law).
    pub rtp_payload_bytes: usize,
    /// Packets the downlink queue must hold before the reader starts flowing.
    pub min_prebuffer_packets: usize,
    /// Below this queue size (with `responseDone == false`) the reader pauses.
    pub low_water_packets: usize,
    /// At/above this queue size (or on `responseDone`) the reader resumes.
    pub high_water_packets: usize,
    /// Warn-only threshold for a pathologically large downlink queue.
    pub queue_warn_packets: usize,
    /// Hard safety cap on the downlink queue; oldest packets are dropped past this.
    pub queue_hard_cap_packets: usize,
    /// Oversized audio deltas are split into pieces no larger than this.
    pub max_delta_chunk_bytes: usize,
    /// Minimum uplink flush granularity, in milliseconds of 24 kHz PCM16.
    pub min_uplink_chunk_ms: u64,
    /// Downlink reader poll timeout for the first packet of a batch.
    pub read_first_timeout: Duration,
    /// Downlink reader poll timeout for subsequent packets of a batch.
    pub read_batch_timeout: Duration,
    /// Maximum time to wait for `session.updated` before failing the call.
    pub session_ready_timeout: Duration,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            rtp_payload_bytes: 160,
            min_prebuffer_packets: 25,
            low_water_packets: 100,
            high_water_packets: 150,
            queue_warn_packets: 800,
            queue_hard_cap_packets: 1200,
            max_delta_chunk_bytes: 9600,
            min_uplink_chunk_ms: 100,
            read_first_timeout: Duration::from_millis(40),
            read_batch_timeout: Duration::from_millis(5),
            session_ready_timeout: Duration::from_secs(10),
        }
    }
}

impl BridgeConfig {
    /// Minimum whole-sample uplink chunk size, in bytes of PCM16 @ 24 kHz.
    ///
    /// `min_uplink_chunk_ms` of audio at 24_000 samples/sec, 2 bytes/sample.
    pub fn min_uplink_chunk_bytes(&self) -> usize {
        let samples = (24_000u64 * self.min_uplink_chunk_ms) / 1000;
        (samples as usize) * 2
    }

    /// `max_delta_chunk_bytes` rounded down to a multiple of 6 (3 PCM16 @
    /// 24 kHz samples = one `downsample24to8` group). Splitting an oversized
    /// delta on any other boundary truncates a partial sample group at every
    /// split, not just the delta's true end, silently dropping 1-2 samples
    /// per split. Only used as a chunk-splitting bound, never the field
    /// itself, so an overridden `max_delta_chunk_bytes` stays safe.
    pub fn max_delta_chunk_bytes_aligned(&self) -> usize {
        let aligned = self.max_delta_chunk_bytes - (self.max_delta_chunk_bytes % 6);
        aligned.max(6)
    }
}

/// Voice-activity detection tuning forwarded to the remote session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VadConfig {
    pub threshold: f32,
    pub prefix_padding: Duration,
    pub silence_duration: Duration,
}

impl Default for VadConfig {
    fn default() -> Self {
        Self {
            threshold: 0.3,
            prefix_padding: Duration::from_millis(300),
            silence_duration: Duration::from_millis(500),
        }
    }
}

/// Noise suppression aggressiveness forwarded to the remote session's
/// `input_audio_noise_reduction` field. SPEC_FULL.md §4.5 calls for "deep"
/// suppression by default; `NearField`/`FarField` are the provider's lighter
/// alternatives, kept overridable for deployments with different mic setups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoiseReductionMode {
    /// Aggressive suppression suited to a close telephony-leg microphone.
    Deep,
    NearField,
    FarField,
}

impl NoiseReductionMode {
    /// The wire string the remote session's `type` field expects.
    pub fn as_wire_str(&self) -> &'static str {
        match self {
            NoiseReductionMode::Deep => "deep",
            NoiseReductionMode::NearField => "near_field",
            NoiseReductionMode::FarField => "far_field",
        }
    }
}

impl Default for NoiseReductionMode {
    fn default() -> Self {
        NoiseReductionMode::Deep
    }
}

/// Selectable transcription backend for the remote session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptionMode {
    /// The provider's reference ASR model, tagged with a BCP-47 language code.
    ReferenceAsr { language: String },
    /// A Whisper-style transcription model.
    Whisper,
}

impl Default for TranscriptionMode {
    fn default() -> Self {
        TranscriptionMode::Whisper
    }
}

/// Per-session configuration sent once to the remote voice-live service
/// immediately after the session starts.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Free-text system prompt.
    pub instructions: String,
    /// Opaque voice identifier understood by the remote service.
    pub voice: String,
    /// Whether the controller proactively greets the caller on `session.updated`.
    pub proactive_greeting: bool,
    /// Transcription backend for the caller's audio.
    pub transcription: TranscriptionMode,
    /// Voice-activity detection tuning.
    pub vad: VadConfig,
    /// Noise suppression aggressiveness sent to the remote session.
    pub noise_reduction: NoiseReductionMode,
    /// Locally invoke `clear_buffer()` as soon as `speech_started` arrives,
    /// rather than relying solely on server-side interruption. Defaults to
    /// `false`, since server-side interruption is configured and assumed
    /// reliable; flip to `true` if measured barge-in latency is unacceptable
    /// on a given deployment.
    pub clear_on_speech_started: bool,
    // `max_response_output_tokens` is intentionally not a field here — the
    // remote API does not accept it yet. Add it back once it is honored
    // server-side.
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            instructions: String::new(),
            voice: "alloy".to_string(),
            proactive_greeting: false,
            transcription: TranscriptionMode::default(),
            vad: VadConfig::default(),
            noise_reduction: NoiseReductionMode::default(),
            clear_on_speech_started: false,
        }
    }
}
