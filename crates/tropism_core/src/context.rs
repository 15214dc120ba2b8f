//! The explicitly constructed engine context.
//!
//! Everything the engine previously would have reached through global
//! registries - events, values, tasks, shutdown - is bundled here and
//! passed by `Arc` into the orchestrator and loop constructors.

use std::sync::Arc;

use crate::events::EventBus;
use crate::shutdown::ShutdownCoordinator;
use crate::tasks::TaskQueue;
use crate::topics;
use crate::values::ValueStore;

/// Shared engine services.
#[derive(Default)]
pub struct EngineContext {
    events: EventBus,
    values: ValueStore,
    tasks: TaskQueue,
    shutdown: ShutdownCoordinator,
}

impl EngineContext {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn values(&self) -> &ValueStore {
        &self.values
    }

    pub fn tasks(&self) -> &TaskQueue {
        &self.tasks
    }

    pub fn shutdown(&self) -> &ShutdownCoordinator {
        &self.shutdown
    }

    /// Cooperative yield point: drains pending tasks, then reports whether
    /// shutdown was requested. Loop bodies bail out when this returns
    /// `true`.
    pub fn yield_point(&self) -> bool {
        self.tasks.drain();
        self.shutdown.is_requested()
    }

    /// Requests engine shutdown and notifies subscribers.
    pub fn request_shutdown(&self) {
        self.shutdown.request();
        self.events.trigger(topics::SYSTEM_SHUTDOWN);
    }

    pub fn shutdown_requested(&self) -> bool {
        self.shutdown.is_requested()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_yield_point_drains_and_reports() {
        let ctx = EngineContext::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let c = counter.clone();
        ctx.tasks().schedule(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });

        assert!(!ctx.yield_point());
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        ctx.shutdown().request();
        assert!(ctx.yield_point());
    }

    #[test]
    fn test_request_shutdown_triggers_event() {
        let ctx = EngineContext::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let c = counter.clone();
        let _sub = ctx.events().subscribe(topics::SYSTEM_SHUTDOWN, move || {
            c.fetch_add(1, Ordering::SeqCst);
        });

        ctx.request_shutdown();
        assert!(ctx.shutdown_requested());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
