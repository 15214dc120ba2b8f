//! Shutdown coordination for the engine.
//!
//! A request flag is checked cooperatively at every loop boundary; an
//! acknowledge flag lets the embedding application confirm it has seen
//! the request and finished its cleanup. Worker threads register here so
//! the application can join them on the way out.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::thread::JoinHandle;

/// Process-wide shutdown flag plus thread registry.
#[derive(Default)]
pub struct ShutdownCoordinator {
    requested: AtomicBool,
    acknowledged: AtomicBool,
    threads: Mutex<Vec<JoinHandle<()>>>,
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests shutdown. Idempotent.
    pub fn request(&self) {
        if !self.requested.swap(true, Ordering::SeqCst) {
            tracing::info!("Shutdown requested");
        }
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    /// Confirms the shutdown request was observed and cleanup is done.
    pub fn acknowledge(&self) {
        self.acknowledged.store(true, Ordering::SeqCst);
    }

    pub fn is_acknowledged(&self) -> bool {
        self.acknowledged.load(Ordering::SeqCst)
    }

    /// Registers a worker thread for coordinated teardown.
    pub fn register_thread(&self, handle: JoinHandle<()>) {
        let mut threads = self.threads.lock().unwrap_or_else(|e| e.into_inner());
        threads.push(handle);
    }

    /// Joins every registered thread. Call after `request()`; a thread
    /// that never checks the flag will block this forever, which is a bug
    /// in that thread.
    pub fn join_all(&self) {
        let handles: Vec<_> = {
            let mut threads = self.threads.lock().unwrap_or_else(|e| e.into_inner());
            threads.drain(..).collect()
        };
        for handle in handles {
            if handle.join().is_err() {
                tracing::error!("A registered thread panicked during shutdown");
            }
        }
    }
}
