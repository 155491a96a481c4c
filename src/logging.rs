//! Subscriber setup for the host process to opt into.
//!
//! This crate has no binary entry point of its own — logging is initialized
//! once by whatever process embeds the bridge — but it ships the same
//! subscriber construction the underlying stack has always used, so that
//! call is one line rather than boilerplate repeated at every call site.

use tracing_subscriber::EnvFilter;

/// Initialize a global `tracing` subscriber: env-filtered (defaulting to
/// `info`), no target module noise, thread ids for correlating concurrent
/// calls, ANSI colour gated on whether stderr is a real terminal.
pub fn init() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_thread_ids(true)
        .with_ansi(atty::is(atty::Stream::Stderr))
        .init();
}
