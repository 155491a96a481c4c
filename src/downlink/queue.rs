//! Thread-safe FIFO of downlink RTP payloads.
//!
//! Multi-producer (the session's audio-delta handler, serialised by the
//! event dispatcher in practice) / single-consumer (the paced reader).
//! `dequeue_timeout` re-checks the queue after every wakeup rather than
//! trusting a single `notified()` call, since a previous waiter (or the
//! hard-cap drop path) may have raced it.

use std::collections::VecDeque;
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::{Mutex, Notify};
use tokio::time::Instant;
use tracing::warn;

use crate::config::BridgeConfig;
use crate::metrics::BridgeMetrics;

#[derive(Default)]
struct Inner {
    packets: VecDeque<Bytes>,
}

pub struct DownlinkQueue {
    inner: Mutex<Inner>,
    notify: Notify,
}

impl DownlinkQueue {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            notify: Notify::new(),
        }
    }

    /// Push one packet, logging a soft warning past `queue_warn_packets` and
    /// dropping the oldest packets past `queue_hard_cap_packets`.
    pub async fn enqueue(&self, packet: Bytes, config: &BridgeConfig, metrics: &BridgeMetrics) {
        let mut dropped = 0u64;
        {
            let mut guard = self.inner.lock().await;
            guard.packets.push_back(packet);
            let len = guard.packets.len();
            if len > config.queue_warn_packets {
                warn!(queue_len = len, "downlink queue is pathologically large");
            }
            while guard.packets.len() > config.queue_hard_cap_packets {
                guard.packets.pop_front();
                dropped += 1;
            }
        }
        if dropped > 0 {
            metrics.record_downlink_dropped(dropped);
            warn!(dropped, "downlink queue hard cap exceeded, dropped oldest packets");
        }
        self.notify.notify_one();
    }

    /// Wait up to `timeout` for a packet. Returns `None` on timeout.
    pub async fn dequeue_timeout(&self, timeout: Duration) -> Option<Bytes> {
        let deadline = Instant::now() + timeout;
        loop {
            {
                let mut guard = self.inner.lock().await;
                if let Some(packet) = guard.packets.pop_front() {
                    return Some(packet);
                }
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return None;
            }
            let _ = tokio::time::timeout(remaining, self.notify.notified()).await;
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.packets.len()
    }

    pub async fn clear(&self) {
        self.inner.lock().await.packets.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> BridgeConfig {
        BridgeConfig::default()
    }

    #[tokio::test]
    async fn enqueue_then_dequeue_preserves_order() {
        let q = DownlinkQueue::new();
        let cfg = test_config();
        let metrics = BridgeMetrics::new();
        q.enqueue(Bytes::from_static(&[1u8; 160]), &cfg, &metrics).await;
        q.enqueue(Bytes::from_static(&[2u8; 160]), &cfg, &metrics).await;
        let a = q.dequeue_timeout(Duration::from_millis(10)).await.unwrap();
        let b = q.dequeue_timeout(Duration::from_millis(10)).await.unwrap();
        assert_eq!(a[0], 1);
        assert_eq!(b[0], 2);
    }

    #[tokio::test]
    async fn dequeue_times_out_on_empty_queue() {
        let q = DownlinkQueue::new();
        let result = q.dequeue_timeout(Duration::from_millis(5)).await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn hard_cap_drops_oldest_packets() {
        let q = DownlinkQueue::new();
        let mut cfg = test_config();
        cfg.queue_hard_cap_packets = 3;
        let metrics = BridgeMetrics::new();
        for i in 0u8..5 {
            q.enqueue(Bytes::from(vec![i; 160]), &cfg, &metrics).await;
        }
        assert_eq!(q.len().await, 3);
        let first = q.dequeue_timeout(Duration::from_millis(10)).await.unwrap();
        assert_eq!(first[0], 2);
        assert_eq!(metrics.snapshot().downlink_packets_dropped, 2);
    }

    #[tokio::test]
    async fn clear_empties_the_queue() {
        let q = DownlinkQueue::new();
        let cfg = test_config();
        let metrics = BridgeMetrics::new();
        q.enqueue(Bytes::from_static(&[0u8; 160]), &cfg, &metrics).await;
        q.clear().await;
        assert_eq!(q.len().await, 0);
    }
}
