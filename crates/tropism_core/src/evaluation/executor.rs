//! Threaded evaluation driver.
//!
//! Wraps the try/step loop in a per-individual outer loop and runs it on a
//! dedicated thread. When the loop runs out of individuals without an
//! external shutdown request, the executor schedules a shutdown task
//! itself and waits for the embedding application to acknowledge it, so
//! the application decides whether "no more individuals" ends the
//! process.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use crate::context::EngineContext;
use crate::evaluation::{EvaluationLoop, RealtimePacer};
use crate::values::Value;
use crate::{paths, topics};

const ACK_POLL: Duration = Duration::from_millis(10);

/// Runs the individual/try/step loop on its own thread.
pub struct EvaluationLoopExecutor {
    ctx: Arc<EngineContext>,
    eval_loop: EvaluationLoop,
}

impl EvaluationLoopExecutor {
    pub fn new(ctx: Arc<EngineContext>, evolutionary_mode: bool) -> Self {
        let values = ctx.values();
        values.register(paths::NUMBER_OF_INDIVIDUALS, Value::Int(1));
        values.register(paths::CURRENT_INDIVIDUAL, Value::Int(0));
        let eval_loop = EvaluationLoop::new(ctx.clone(), evolutionary_mode);
        Self { ctx, eval_loop }
    }

    /// The gate an external pacing timer signals in real-time mode.
    pub fn pacer(&self) -> Arc<RealtimePacer> {
        self.eval_loop.pacer()
    }

    /// Runs the individual loop to completion on the calling thread.
    pub fn run(&mut self) {
        let ctx = self.ctx.clone();
        tracing::info!("Evaluation loop executor started");

        let mut individual: i64 = 0;
        loop {
            if ctx.shutdown_requested() {
                break;
            }
            // Re-read each round; evaluation methods adjust it per pass.
            // Negative means unbounded.
            let count = ctx
                .values()
                .get_int(paths::NUMBER_OF_INDIVIDUALS)
                .unwrap_or(1);
            if count >= 0 && individual >= count {
                break;
            }
            ctx.values().set_int(paths::CURRENT_INDIVIDUAL, individual);
            ctx.events().trigger(topics::NEXT_INDIVIDUAL);

            self.eval_loop.execute();

            if ctx.shutdown_requested() {
                break;
            }
            ctx.events().trigger(topics::INDIVIDUAL_COMPLETED);
            individual += 1;
        }

        if !ctx.shutdown_requested() {
            // Ran out of individuals. Hand the decision to the embedding
            // application and keep draining tasks until it acknowledges.
            tracing::info!("Individual loop finished; requesting shutdown");
            let requester = ctx.clone();
            ctx.tasks().schedule(move || requester.request_shutdown());
            while !ctx.shutdown().is_acknowledged() {
                ctx.tasks().drain();
                std::thread::sleep(ACK_POLL);
            }
        }
        tracing::info!("Evaluation loop executor finished");
    }

    /// Spawns the executor on a dedicated thread registered with the
    /// context's shutdown registry.
    pub fn spawn(mut self) -> io::Result<()> {
        let ctx = self.ctx.clone();
        let handle = std::thread::Builder::new()
            .name("evaluation-loop".to_string())
            .spawn(move || self.run())?;
        ctx.shutdown().register_thread(handle);
        Ok(())
    }
}
