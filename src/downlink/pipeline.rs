//! Bridges a bursty PCM16 24 kHz producer to a strict 20 ms-paced µ-law
//! RTP consumer.
//!
//! The producer side (driven by the session controller's `response.audio.*`
//! handlers) downsamples, encodes, and packetises into fixed 160-byte
//! payloads, holding any partial packet across calls in a mutex shared with
//! `clear_buffer`. The consumer side is a small state machine
//! (`NotReady` / `Flowing` / `Paused` / `Closed`, expressed through a few
//! atomics rather than an explicit enum since each bit is written and read
//! from a different task) that a 20 ms RTP send loop polls.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::Mutex;
use tracing::debug;

use super::queue::DownlinkQueue;
use crate::codec;
use crate::config::BridgeConfig;
use crate::metrics::BridgeMetrics;
use crate::resample;

/// Outcome of one `read` call. `Closed` is the Rust-native stand-in for the
/// RTP-side contract's "-1 means stream closed"; `Data(0)` for "no data now".
#[derive(Debug, PartialEq, Eq)]
pub enum ReadOutcome {
    Data(usize),
    Closed,
}

pub struct DownlinkPipeline {
    config: BridgeConfig,
    metrics: Arc<BridgeMetrics>,
    queue: DownlinkQueue,
    partial: Mutex<Vec<u8>>,
    prebuffered: AtomicBool,
    paused: AtomicBool,
    response_done: AtomicBool,
    closed: AtomicBool,
}

impl DownlinkPipeline {
    pub fn new(config: BridgeConfig, metrics: Arc<BridgeMetrics>) -> Self {
        Self {
            config,
            metrics,
            queue: DownlinkQueue::new(),
            partial: Mutex::new(Vec::new()),
            prebuffered: AtomicBool::new(false),
            paused: AtomicBool::new(false),
            response_done: AtomicBool::new(false),
            closed: AtomicBool::new(false),
        }
    }

    // --- producer side, called from the session controller ---

    pub fn on_response_created(&self) {
        self.response_done.store(false, Ordering::SeqCst);
    }

    pub fn on_response_done(&self) {
        self.response_done.store(true, Ordering::SeqCst);
    }

    /// Handle one `response.audio.delta` payload (raw PCM16 24 kHz bytes).
    pub async fn enqueue_delta(&self, pcm24: &[u8]) {
        for chunk in pcm24.chunks(self.config.max_delta_chunk_bytes_aligned()) {
            let pcm8 = resample::downsample24to8(chunk);
            let ulaw = codec::encode(&pcm8);

            let payload_size = self.config.rtp_payload_bytes;
            let mut produced = 0u64;
            {
                let mut partial = self.partial.lock().await;
                partial.extend_from_slice(&ulaw);
                while partial.len() >= payload_size {
                    let packet: Vec<u8> = partial.drain(..payload_size).collect();
                    self.queue
                        .enqueue(Bytes::from(packet), &self.config, &self.metrics)
                        .await;
                    produced += 1;
                }
            }
            if produced > 0 {
                self.metrics.record_downlink_produced(produced);
                if !self.prebuffered.load(Ordering::SeqCst) {
                    let len = self.queue.len().await;
                    if len >= self.config.min_prebuffer_packets {
                        debug!(queue_len = len, "downlink prebuffer threshold reached");
                        self.prebuffered.store(true, Ordering::SeqCst);
                    }
                }
            }
        }
    }

    /// Server-side interruption / barge-in: drop all queued and partial
    /// audio so no pre-clear data is ever delivered to a later read.
    pub async fn clear_buffer(&self) {
        let mut partial = self.partial.lock().await;
        partial.clear();
        drop(partial);
        self.queue.clear().await;
        self.prebuffered.store(false, Ordering::SeqCst);
        self.paused.store(false, Ordering::SeqCst);
        self.metrics.record_interrupt();
    }

    pub async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.queue.clear().await;
    }

    // --- consumer side, polled by the RTP send loop ---

    pub async fn read(&self, buf: &mut [u8]) -> ReadOutcome {
        if self.closed.load(Ordering::SeqCst) {
            return ReadOutcome::Closed;
        }

        let response_done = self.response_done.load(Ordering::SeqCst);
        if !self.prebuffered.load(Ordering::SeqCst) && !response_done {
            fill_silence(buf);
            return ReadOutcome::Data(buf.len());
        }

        let queue_len = self.queue.len().await;
        if self.paused.load(Ordering::SeqCst) {
            if queue_len >= self.config.high_water_packets || response_done {
                self.paused.store(false, Ordering::SeqCst);
                self.metrics.record_downlink_resume();
            }
        } else if queue_len < self.config.low_water_packets && !response_done {
            self.paused.store(true, Ordering::SeqCst);
            self.metrics.record_downlink_pause();
        }

        if self.paused.load(Ordering::SeqCst) {
            fill_silence(buf);
            return ReadOutcome::Data(buf.len());
        }

        let payload_size = self.config.rtp_payload_bytes;
        let mut written = 0usize;

        match self.queue.dequeue_timeout(self.config.read_first_timeout).await {
            Some(packet) => {
                written += copy_packet(buf, written, &packet);
                self.metrics.record_downlink_delivered();
            }
            None => {
                if self.response_done.load(Ordering::SeqCst) {
                    self.prebuffered.store(false, Ordering::SeqCst);
                }
                return ReadOutcome::Data(0);
            }
        }

        while buf.len() - written >= payload_size {
            match self.queue.dequeue_timeout(self.config.read_batch_timeout).await {
                Some(packet) => {
                    written += copy_packet(buf, written, &packet);
                    self.metrics.record_downlink_delivered();
                }
                None => break,
            }
        }

        ReadOutcome::Data(written)
    }
}

fn fill_silence(buf: &mut [u8]) {
    buf.fill(0xFF);
}

fn copy_packet(buf: &mut [u8], offset: usize, packet: &[u8]) -> usize {
    let end = offset + packet.len();
    buf[offset..end].copy_from_slice(packet);
    packet.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pipeline_with(config: BridgeConfig) -> DownlinkPipeline {
        DownlinkPipeline::new(config, BridgeMetrics::new())
    }

    #[tokio::test]
    async fn silence_only_call_returns_all_ff() {
        let pipeline = pipeline_with(BridgeConfig::default());
        let mut buf = [0u8; 160];
        for _ in 0..50 {
            let outcome = pipeline.read(&mut buf).await;
            assert_eq!(outcome, ReadOutcome::Data(160));
            assert!(buf.iter().all(|&b| b == 0xFF));
        }
    }

    #[tokio::test]
    async fn small_greeting_drains_despite_low_prebuffer_when_response_done() {
        let mut config = BridgeConfig::default();
        config.read_first_timeout = std::time::Duration::from_millis(5);
        config.read_batch_timeout = std::time::Duration::from_millis(1);
        let pipeline = pipeline_with(config);

        pipeline.on_response_created();
        // 150ms @ 24kHz PCM16 (3600 samples, 7200 bytes). Downsampling to
        // 8kHz keeps the 150ms duration (1200 samples), µ-law-encodes to
        // 1200 bytes: 7 full 160B packets plus an 80B remainder that never
        // completes a packet.
        let pcm24 = vec![0u8; 7200];
        pipeline.enqueue_delta(&pcm24).await;
        pipeline.on_response_done();

        let mut buf = [0u8; 1120];
        let outcome = pipeline.read(&mut buf).await;
        assert_eq!(outcome, ReadOutcome::Data(1120));
    }

    #[tokio::test]
    async fn reader_pauses_below_low_water_and_resumes_at_high_water() {
        let mut config = BridgeConfig::default();
        config.min_prebuffer_packets = 2;
        config.low_water_packets = 3;
        config.high_water_packets = 5;
        config.read_first_timeout = std::time::Duration::from_millis(5);
        config.read_batch_timeout = std::time::Duration::from_millis(1);
        let pipeline = pipeline_with(config.clone());

        pipeline.on_response_created();
        let one_packet_pcm24 = vec![0u8; 480]; // 480B @ 24kHz -> 160B @ 8kHz -> 160B ulaw
        for _ in 0..2 {
            pipeline.enqueue_delta(&one_packet_pcm24).await;
        }

        let mut buf = [0u8; 160];
        let outcome = pipeline.read(&mut buf).await;
        assert_eq!(outcome, ReadOutcome::Data(160));

        // Queue now at 1 packet, below low_water (3), responseDone still false -> pauses.
        let outcome = pipeline.read(&mut buf).await;
        assert_eq!(outcome, ReadOutcome::Data(160));
        assert!(buf.iter().all(|&b| b == 0xFF));

        for _ in 0..5 {
            pipeline.enqueue_delta(&one_packet_pcm24).await;
        }
        let outcome = pipeline.read(&mut buf).await;
        assert_eq!(outcome, ReadOutcome::Data(160));
        assert!(!buf.iter().all(|&b| b == 0xFF));
    }

    #[tokio::test]
    async fn clear_buffer_drops_everything_queued() {
        let mut config = BridgeConfig::default();
        config.min_prebuffer_packets = 1;
        let pipeline = pipeline_with(config);
        pipeline.on_response_created();
        pipeline.enqueue_delta(&vec![0u8; 480]).await;
        pipeline.clear_buffer().await;

        let mut buf = [0u8; 160];
        let outcome = pipeline.read(&mut buf).await;
        assert_eq!(outcome, ReadOutcome::Data(160));
        assert!(buf.iter().all(|&b| b == 0xFF));
    }

    #[tokio::test]
    async fn closed_pipeline_reports_closed() {
        let pipeline = pipeline_with(BridgeConfig::default());
        pipeline.close().await;
        let mut buf = [0u8; 160];
        assert_eq!(pipeline.read(&mut buf).await, ReadOutcome::Closed);
    }

    #[tokio::test]
    async fn oversized_delta_split_on_a_misaligned_boundary_loses_no_samples() {
        // max_delta_chunk_bytes = 1000 is not a multiple of 6 (3 samples *
        // 2 bytes). Splitting directly on that boundary truncates 2 of
        // every 500-sample chunk at `downsample24to8`'s group rounding,
        // losing 6 whole output bytes across this delta and leaving the
        // queue one packet short. Splitting on the alignment-corrected
        // boundary must deliver every full packet the input actually
        // contains.
        let mut config = BridgeConfig::default();
        config.max_delta_chunk_bytes = 1000;
        config.min_prebuffer_packets = 1;
        let pipeline = pipeline_with(config);

        pipeline.on_response_created();
        // 9600 bytes @ 24kHz PCM16 = 4800 samples = 1600 downsampled/encoded
        // bytes = exactly 10 RTP packets with no remainder, so the correct
        // delivered total is unambiguous.
        pipeline.enqueue_delta(&vec![0u8; 9600]).await;
        pipeline.on_response_done();

        let mut total = 0usize;
        loop {
            let mut buf = [0u8; 160];
            match pipeline.read(&mut buf).await {
                ReadOutcome::Data(0) => break,
                ReadOutcome::Data(n) => total += n,
                ReadOutcome::Closed => panic!("unexpected close"),
            }
        }
        assert_eq!(total, 1600, "misaligned chunk boundaries must not drop samples");
    }
}
