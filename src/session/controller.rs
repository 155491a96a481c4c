//! Configures the remote session, dispatches its typed events onto the two
//! pipelines, and owns the greeting/readiness/interrupt lifecycle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::events::{ClientEvent, ServerEvent};
use super::readiness::Readiness;
use super::transport::SessionTransport;
use crate::config::{SessionConfig, TranscriptionMode};
use crate::downlink::DownlinkPipeline;
use crate::error::Result;
use crate::metrics::BridgeMetrics;

pub struct SessionController {
    config: SessionConfig,
    transport: Arc<dyn SessionTransport>,
    downlink: Arc<DownlinkPipeline>,
    metrics: Arc<BridgeMetrics>,
    readiness: Arc<Readiness>,
    conversation_started: AtomicBool,
    transcript: Mutex<String>,
}

impl SessionController {
    pub fn new(
        config: SessionConfig,
        transport: Arc<dyn SessionTransport>,
        downlink: Arc<DownlinkPipeline>,
        metrics: Arc<BridgeMetrics>,
        readiness: Arc<Readiness>,
    ) -> Self {
        Self {
            config,
            transport,
            downlink,
            metrics,
            readiness,
            conversation_started: AtomicBool::new(false),
            transcript: Mutex::new(String::new()),
        }
    }

    /// Send the one-time `session.update` configuration.
    pub async fn configure(&self) -> Result<()> {
        let transcription = match &self.config.transcription {
            TranscriptionMode::Whisper => json!({ "model": "whisper-1" }),
            TranscriptionMode::ReferenceAsr { language } => json!({
                "model": "reference-asr",
                "language": language,
            }),
        };

        let payload = json!({
            "type": "session.update",
            "session": {
                "instructions": self.config.instructions,
                "modalities": ["audio", "text"],
                "voice": self.config.voice,
                "input_audio_format": "pcm16",
                "output_audio_format": "pcm16",
                "input_audio_transcription": transcription,
                "turn_detection": {
                    "type": "semantic_vad",
                    "threshold": self.config.vad.threshold,
                    "prefix_padding_ms": self.config.vad.prefix_padding.as_millis() as u64,
                    "silence_duration_ms": self.config.vad.silence_duration.as_millis() as u64,
                    "interrupt_response": true,
                    "create_response": true,
                },
                "input_audio_noise_reduction": { "type": self.config.noise_reduction.as_wire_str() },
                "echo_cancellation": true,
            },
        });

        self.transport
            .send_event(ClientEvent::SessionUpdate(payload))
            .await
    }

    /// Block until `session.updated` arrives, or fail after `timeout`.
    pub async fn await_ready(&self, timeout: Duration) -> Result<()> {
        self.readiness.wait(timeout).await
    }

    pub fn is_ready(&self) -> bool {
        self.readiness.is_ready()
    }

    /// Dispatch one server event. Errors are absorbed locally: a bad event
    /// must never kill the dispatcher or propagate into the RTP path.
    pub async fn dispatch(&self, event: ServerEvent) {
        match event {
            ServerEvent::SessionCreated { session_id } => {
                info!(session_id, "voice-live session created");
            }
            ServerEvent::SessionUpdated => {
                info!("voice-live session ready");
                self.readiness.mark_ready();
                if self.config.proactive_greeting
                    && !self.conversation_started.swap(true, Ordering::SeqCst)
                {
                    if let Err(err) = self.transport.send_event(ClientEvent::ResponseCreate).await {
                        warn!(error = %err, "failed to send proactive greeting response.create");
                    }
                }
            }
            ServerEvent::ResponseCreated => {
                self.downlink.on_response_created();
            }
            ServerEvent::ResponseAudioDelta { audio } => {
                self.downlink.enqueue_delta(&audio).await;
            }
            ServerEvent::ResponseAudioDone => {
                self.downlink.on_response_done();
            }
            ServerEvent::ResponseTextDelta { text } => {
                self.transcript.lock().await.push_str(&text);
            }
            ServerEvent::ResponseAudioTimestampDelta => {
                debug!("response.audio_timestamp.delta (diagnostic only)");
            }
            ServerEvent::SpeechStarted => {
                info!("caller speech started");
                if self.config.clear_on_speech_started {
                    self.downlink.clear_buffer().await;
                    self.metrics.record_interrupt();
                }
            }
            ServerEvent::SpeechStopped => {
                debug!("caller speech stopped");
            }
            ServerEvent::InputTranscriptionCompleted { text } => {
                info!(transcript = %text, "caller transcript completed");
            }
            ServerEvent::Error { message } => {
                warn!(message, "voice-live session reported an error event");
            }
            ServerEvent::Other(tag) => {
                debug!(tag, "unhandled session event");
            }
        }
    }
}
