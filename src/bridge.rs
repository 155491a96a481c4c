//! [`MediaBridge`]: the per-call glue that owns both pipelines and the
//! session controller, and hands the signalling collaborator two opaque
//! byte handles instead of pipeline internals.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use crate::config::{BridgeConfig, SessionConfig};
use crate::downlink::{DownlinkPipeline, ReadOutcome};
use crate::error::Result;
use crate::metrics::BridgeMetrics;
use crate::session::{Readiness, ServerEvent, SessionController, SessionTransport};
use crate::uplink::UplinkPipeline;

/// Byte sink handed to the RTP receive context. Cloning is cheap; every
/// clone writes into the same uplink pipeline.
#[derive(Clone)]
pub struct UplinkSink {
    pipeline: Arc<UplinkPipeline>,
}

impl UplinkSink {
    /// Accept one received RTP payload (µ-law bytes, typically 160B/20ms).
    pub async fn write(&self, ulaw: &[u8]) {
        self.pipeline.write(ulaw).await;
    }

    /// Emit any residual buffered audio. Called on call teardown.
    pub async fn flush(&self) {
        self.pipeline.flush().await;
    }
}

/// Byte source handed to the RTP send context. Cloning is cheap; every
/// clone reads from the same downlink pipeline.
#[derive(Clone)]
pub struct DownlinkSource {
    pipeline: Arc<DownlinkPipeline>,
}

impl DownlinkSource {
    /// Fill `buf` with the next paced downlink payload. Returns the number
    /// of bytes written, or `None` once the bridge has been closed — the
    /// RTP-side contract's "-1 means stream closed" expressed natively.
    pub async fn read(&self, buf: &mut [u8]) -> Option<usize> {
        match self.pipeline.read(buf).await {
            ReadOutcome::Data(n) => Some(n),
            ReadOutcome::Closed => None,
        }
    }
}

/// The per-call assembly: one uplink pipeline, one downlink pipeline, one
/// session controller, and the shared readiness signal binding them.
///
/// Construction sends the session configuration and blocks until
/// `session.updated` arrives or the readiness timeout elapses; a timeout
/// here is fatal to the call and the construction fails outright rather
/// than handing back a bridge that will drop every uplink write forever.
pub struct MediaBridge {
    uplink: Arc<UplinkPipeline>,
    downlink: Arc<DownlinkPipeline>,
    controller: Arc<SessionController>,
    metrics: Arc<BridgeMetrics>,
}

impl MediaBridge {
    pub async fn start(
        bridge_config: BridgeConfig,
        session_config: SessionConfig,
        transport: Arc<dyn SessionTransport>,
    ) -> Result<Self> {
        let metrics = BridgeMetrics::new();
        let readiness = Arc::new(Readiness::new());

        let downlink = Arc::new(DownlinkPipeline::new(bridge_config.clone(), metrics.clone()));
        let uplink = Arc::new(UplinkPipeline::new(
            bridge_config.clone(),
            transport.clone(),
            metrics.clone(),
            readiness.clone(),
        ));
        let controller = Arc::new(SessionController::new(
            session_config,
            transport,
            downlink.clone(),
            metrics.clone(),
            readiness,
        ));

        controller.configure().await?;
        if let Err(err) = controller.await_ready(bridge_config.session_ready_timeout).await {
            error!(error = %err, "session never became ready, failing call");
            return Err(err);
        }
        info!("media bridge ready");

        Ok(Self { uplink, downlink, controller, metrics })
    }

    /// The byte sink for the RTP receive context.
    pub fn uplink_sink(&self) -> UplinkSink {
        UplinkSink { pipeline: self.uplink.clone() }
    }

    /// The byte source for the RTP send context.
    pub fn downlink_source(&self) -> DownlinkSource {
        DownlinkSource { pipeline: self.downlink.clone() }
    }

    /// Dispatch one event from the session's event stream. Never fails:
    /// per-event errors are absorbed inside the controller so a single bad
    /// event can never kill whatever loop is driving `receiveEvents()`.
    pub async fn dispatch_event(&self, event: ServerEvent) {
        self.controller.dispatch(event).await;
    }

    pub fn metrics(&self) -> Arc<BridgeMetrics> {
        self.metrics.clone()
    }

    /// Tear down the bridge: close the downlink (wakes any blocked reader
    /// with `None`/-1), flush residual uplink audio, and drop the session
    /// handle. Bridge lifetime equals call lifetime; there is no reuse
    /// after `close`.
    pub async fn close(&self) {
        self.downlink.close().await;
        self.uplink.flush().await;
        info!("media bridge closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::ClientEvent;
    use std::sync::Mutex as StdMutex;

    struct NullTransport {
        events: StdMutex<Vec<ClientEvent>>,
    }

    impl NullTransport {
        fn new() -> Self {
            Self { events: StdMutex::new(Vec::new()) }
        }
    }

    #[async_trait::async_trait]
    impl SessionTransport for NullTransport {
        async fn send_input_audio(&self, _pcm16_le: Vec<u8>) -> Result<()> {
            Ok(())
        }

        async fn send_event(&self, event: ClientEvent) -> Result<()> {
            self.events.lock().unwrap().push(event);
            Ok(())
        }
    }

    #[tokio::test]
    async fn start_times_out_without_session_updated() {
        let mut bridge_config = BridgeConfig::default();
        bridge_config.session_ready_timeout = Duration::from_millis(5);
        let transport = Arc::new(NullTransport::new());

        let result = MediaBridge::start(bridge_config, SessionConfig::default(), transport).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn uplink_write_before_readiness_is_dropped_then_flows_after() {
        let mut bridge_config = BridgeConfig::default();
        bridge_config.session_ready_timeout = Duration::from_secs(10);
        let transport = Arc::new(NullTransport::new());

        let metrics = BridgeMetrics::new();
        let readiness = Arc::new(Readiness::new());
        let downlink = Arc::new(DownlinkPipeline::new(bridge_config.clone(), metrics.clone()));
        let uplink = Arc::new(UplinkPipeline::new(
            bridge_config,
            transport.clone(),
            metrics.clone(),
            readiness.clone(),
        ));

        uplink.write(&[0xFFu8; 160]).await;
        assert_eq!(metrics.snapshot().uplink_dropped_not_ready, 1);

        readiness.mark_ready();
        uplink.write(&[0u8; 160]).await;
        assert_eq!(metrics.snapshot().uplink_dropped_not_ready, 1);

        drop(downlink);
    }

    #[tokio::test]
    async fn close_wakes_the_downlink_reader_with_closed() {
        let bridge_config = BridgeConfig::default();
        let metrics = BridgeMetrics::new();
        let downlink = Arc::new(DownlinkPipeline::new(bridge_config, metrics));
        downlink.close().await;

        let mut buf = [0u8; 160];
        assert_eq!(downlink.read(&mut buf).await, ReadOutcome::Closed);
    }
}
