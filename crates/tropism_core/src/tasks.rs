//! Cooperative task channel.
//!
//! Collaborators schedule closures from any thread; the engine drains the
//! channel at phase and step boundaries. This is the only way external
//! code gets to mutate engine-owned state, which keeps every mutation
//! phase-aligned.

use std::collections::VecDeque;
use std::sync::Mutex;

type Task = Box<dyn FnOnce() + Send>;

/// A queue of externally scheduled tasks, drained at engine yield points.
#[derive(Default)]
pub struct TaskQueue {
    queue: Mutex<VecDeque<Task>>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules a task for the next yield point.
    pub fn schedule<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let mut queue = self.queue.lock().unwrap_or_else(|e| e.into_inner());
        queue.push_back(Box::new(task));
    }

    /// Runs every pending task in scheduling order, including tasks
    /// scheduled by tasks run during this drain. Returns how many ran.
    pub fn drain(&self) -> usize {
        let mut executed = 0;
        loop {
            let task = {
                let mut queue = self.queue.lock().unwrap_or_else(|e| e.into_inner());
                queue.pop_front()
            };
            match task {
                Some(task) => {
                    task();
                    executed += 1;
                }
                None => return executed,
            }
        }
    }

    pub fn pending(&self) -> usize {
        let queue = self.queue.lock().unwrap_or_else(|e| e.into_inner());
        queue.len()
    }
}
