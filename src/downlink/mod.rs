//! Downlink audio path: remote-service PCM16 deltas -> paced µ-law RTP reads.

mod queue;
mod pipeline;

pub use pipeline::{DownlinkPipeline, ReadOutcome};
