//! Lock-free counters for a single call's bridge activity.
//!
//! One [`BridgeMetrics`] is shared (via `Arc`) across the uplink pipeline,
//! downlink pipeline, and session controller for the lifetime of a call;
//! `snapshot` is cheap enough to call from a periodic log line or an
//! end-of-call summary.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct BridgeMetrics {
    pub uplink_bytes_in: AtomicU64,
    pub uplink_chunks_emitted: AtomicU64,
    pub uplink_dropped_not_ready: AtomicU64,
    pub downlink_packets_produced: AtomicU64,
    pub downlink_packets_delivered: AtomicU64,
    pub downlink_packets_dropped: AtomicU64,
    pub downlink_pauses: AtomicU64,
    pub downlink_resumes: AtomicU64,
    pub interrupts: AtomicU64,
}

impl BridgeMetrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    #[inline(always)]
    pub fn record_uplink_write(&self, bytes: usize) {
        self.uplink_bytes_in.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn record_uplink_chunk_emitted(&self) {
        self.uplink_chunks_emitted.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn record_uplink_dropped_not_ready(&self) {
        self.uplink_dropped_not_ready.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn record_downlink_produced(&self, packets: u64) {
        self.downlink_packets_produced.fetch_add(packets, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn record_downlink_delivered(&self) {
        self.downlink_packets_delivered.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn record_downlink_dropped(&self, packets: u64) {
        self.downlink_packets_dropped.fetch_add(packets, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn record_downlink_pause(&self) {
        self.downlink_pauses.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn record_downlink_resume(&self) {
        self.downlink_resumes.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn record_interrupt(&self) {
        self.interrupts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            uplink_bytes_in: self.uplink_bytes_in.load(Ordering::Relaxed),
            uplink_chunks_emitted: self.uplink_chunks_emitted.load(Ordering::Relaxed),
            uplink_dropped_not_ready: self.uplink_dropped_not_ready.load(Ordering::Relaxed),
            downlink_packets_produced: self.downlink_packets_produced.load(Ordering::Relaxed),
            downlink_packets_delivered: self.downlink_packets_delivered.load(Ordering::Relaxed),
            downlink_packets_dropped: self.downlink_packets_dropped.load(Ordering::Relaxed),
            downlink_pauses: self.downlink_pauses.load(Ordering::Relaxed),
            downlink_resumes: self.downlink_resumes.load(Ordering::Relaxed),
            interrupts: self.interrupts.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub uplink_bytes_in: u64,
    pub uplink_chunks_emitted: u64,
    pub uplink_dropped_not_ready: u64,
    pub downlink_packets_produced: u64,
    pub downlink_packets_delivered: u64,
    pub downlink_packets_dropped: u64,
    pub downlink_pauses: u64,
    pub downlink_resumes: u64,
    pub interrupts: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_start_at_zero() {
        let m = BridgeMetrics::new();
        let snap = m.snapshot();
        assert_eq!(snap.uplink_bytes_in, 0);
        assert_eq!(snap.downlink_packets_dropped, 0);
    }

    #[test]
    fn records_accumulate() {
        let m = BridgeMetrics::new();
        m.record_uplink_write(160);
        m.record_uplink_write(160);
        m.record_downlink_dropped(5);
        let snap = m.snapshot();
        assert_eq!(snap.uplink_bytes_in, 320);
        assert_eq!(snap.downlink_packets_dropped, 5);
    }
}
