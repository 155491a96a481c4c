//! Shared session-ready signal, read by the uplink pipeline (fast
//! non-blocking check on every `write`) and resolved by the session
//! controller once `session.updated` arrives.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::Notify;

use crate::error::Error;

#[derive(Default)]
pub struct Readiness {
    ready: AtomicBool,
    notify: Notify,
}

impl Readiness {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    pub async fn wait(&self, timeout: Duration) -> Result<(), Error> {
        // The notified future must be constructed before the is_ready()
        // recheck: notify_waiters() only wakes futures that already exist,
        // so polling is_ready() first would lose a mark_ready() that lands
        // in between and block until the timeout every time.
        let notified = self.notify.notified();
        if self.is_ready() {
            return Ok(());
        }
        tokio::time::timeout(timeout, notified)
            .await
            .map_err(|_| Error::SessionReadinessTimeout(timeout))?;
        Ok(())
    }
}
