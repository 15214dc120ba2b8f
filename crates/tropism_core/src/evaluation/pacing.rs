//! Real-time pacing primitive.
//!
//! The evaluation thread waits on a mutex-guarded condition variable; a
//! timer owned by the embedding application signals it once per
//! time-step-size interval. Signals are counted, not latched, so a tick
//! that fires while the loop is still busy is not lost.

use std::io;
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use crate::context::EngineContext;

/// Condition-variable gate between the pacing timer and the evaluation
/// thread.
#[derive(Default)]
pub struct RealtimePacer {
    pending: Mutex<u64>,
    condvar: Condvar,
}

impl RealtimePacer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called by the timer thread once per pacing interval.
    pub fn signal(&self) {
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        *pending += 1;
        self.condvar.notify_one();
    }

    /// Consumes one pending signal, waiting up to `timeout` for it.
    /// Returns `true` if a signal was consumed.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        if *pending > 0 {
            *pending -= 1;
            return true;
        }
        let (mut pending, _result) = self
            .condvar
            .wait_timeout(pending, timeout)
            .unwrap_or_else(|e| e.into_inner());
        if *pending > 0 {
            *pending -= 1;
            true
        } else {
            false
        }
    }

    /// Spawns the pacing timer on its own thread, signaling every
    /// `interval` until shutdown is requested. The thread registers with
    /// the context's shutdown registry for coordinated teardown.
    pub fn spawn_timer(
        self: &Arc<Self>,
        ctx: Arc<EngineContext>,
        interval: Duration,
    ) -> io::Result<()> {
        let pacer = self.clone();
        let registry_ctx = ctx.clone();
        let handle = std::thread::Builder::new()
            .name("pacing-timer".to_string())
            .spawn(move || {
                tracing::debug!(interval_ms = interval.as_millis() as u64, "Pacing timer started");
                while !ctx.shutdown_requested() {
                    std::thread::sleep(interval);
                    pacer.signal();
                }
            })?;
        registry_ctx.shutdown().register_thread(handle);
        Ok(())
    }
}
