//! Uplink audio path: RTP receiver's µ-law bytes -> accumulated PCM16
//! 24 kHz chunks dispatched to the remote session.
//!
//! `write` is called synchronously from the RTP receive context with
//! whatever payload just arrived (typically 160 bytes every 20 ms) and
//! must never block on the session send. Ready chunks are handed to a
//! single mailbox task over an unbounded channel rather than spawned
//! independently: two freestanding `tokio::spawn`ed sends race the
//! executor and can land out of order if one send happens to take longer
//! than the next, which would violate arrival-order delivery. The mailbox
//! task drains the channel and awaits each send before starting the next,
//! so order is preserved while `write` itself never blocks.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::codec;
use crate::config::BridgeConfig;
use crate::metrics::BridgeMetrics;
use crate::resample;
use crate::session::{ClientEvent, Readiness, SessionTransport};

const STANDALONE_AUDIO_CHUNK_MARKER: &str = "standalone audio chunk";

pub struct UplinkPipeline {
    config: BridgeConfig,
    metrics: Arc<BridgeMetrics>,
    accumulator: Mutex<Vec<u8>>,
    readiness: Arc<Readiness>,
    dropped_warned: AtomicBool,
    mailbox: mpsc::UnboundedSender<Vec<u8>>,
}

impl UplinkPipeline {
    pub fn new(config: BridgeConfig, transport: Arc<dyn SessionTransport>, metrics: Arc<BridgeMetrics>, readiness: Arc<Readiness>) -> Self {
        let (mailbox, mut inbox) = mpsc::unbounded_channel::<Vec<u8>>();
        let mailbox_metrics = metrics.clone();
        tokio::spawn(async move {
            while let Some(chunk) = inbox.recv().await {
                mailbox_metrics.record_uplink_chunk_emitted();
                if let Err(err) = transport.send_input_audio(chunk).await {
                    let message = err.to_string();
                    if message.contains(STANDALONE_AUDIO_CHUNK_MARKER) {
                        debug!("suppressed expected standalone-audio-chunk send error");
                    } else {
                        warn!(error = %message, "uplink audio send failed");
                    }
                }
            }
        });

        Self {
            config,
            metrics,
            accumulator: Mutex::new(Vec::new()),
            readiness,
            dropped_warned: AtomicBool::new(false),
            mailbox,
        }
    }

    /// Accept one µ-law payload from the RTP receiver.
    pub async fn write(&self, ulaw: &[u8]) {
        self.metrics.record_uplink_write(ulaw.len());

        if !self.readiness.is_ready() {
            if !self.dropped_warned.swap(true, Ordering::SeqCst) {
                warn!("session not ready, dropping uplink audio (further drops logged at debug)");
            } else {
                debug!(bytes = ulaw.len(), "dropping uplink audio, session not ready");
            }
            self.metrics.record_uplink_dropped_not_ready();
            return;
        }
        self.dropped_warned.store(false, Ordering::SeqCst);

        let pcm8 = codec::decode(ulaw);
        let pcm24 = resample::upsample8to24(&pcm8);

        let ready_chunk = {
            let mut acc = self.accumulator.lock().await;
            acc.extend_from_slice(&pcm24);
            let min_chunk = self.config.min_uplink_chunk_bytes();
            if acc.len() >= min_chunk {
                let usable = acc.len() - (acc.len() % 2);
                let remainder = acc.split_off(usable);
                Some(std::mem::replace(&mut *acc, remainder))
            } else {
                None
            }
        };

        if let Some(chunk) = ready_chunk {
            self.dispatch(chunk);
        }
    }

    /// Emit any residual buffered audio (e.g. on call teardown).
    pub async fn flush(&self) {
        let mut acc = self.accumulator.lock().await;
        if acc.is_empty() {
            return;
        }
        let usable = acc.len() - (acc.len() % 2);
        let chunk = acc[..usable].to_vec();
        acc.clear();
        drop(acc);
        if !chunk.is_empty() {
            self.dispatch(chunk);
        }
    }

    /// Hand a chunk to the mailbox task. The channel is unbounded and the
    /// task never exits while `self` is alive, so this only fails if the
    /// pipeline is already being torn down, in which case dropping the
    /// chunk is correct (there is no receiver left to preserve order for).
    fn dispatch(&self, chunk: Vec<u8>) {
        let _ = self.mailbox.send(chunk);
    }
}
