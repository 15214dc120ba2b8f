//! The nested try/step evaluation loop.
//!
//! One [`EvaluationLoop::execute`] call runs a bounded or unbounded number
//! of tries, each a bounded or unbounded number of steps, triggering the
//! try/step boundary events and honoring pause, try-termination and
//! shutdown at every loop boundary. The threaded
//! [`EvaluationLoopExecutor`] wraps it in a per-individual outer loop on a
//! dedicated thread.

mod executor;
mod pacing;

pub use executor::EvaluationLoopExecutor;
pub use pacing::RealtimePacer;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::context::EngineContext;
use crate::events::Subscription;
use crate::values::Value;
use crate::{paths, topics};

/// Poll interval while paused, and the upper bound on one pacing sleep
/// chunk, so cancellation latency stays low regardless of configured
/// delays.
const MAX_SLEEP_CHUNK: Duration = Duration::from_millis(10);
/// Re-check interval while waiting for an external pacing signal.
const PACING_POLL: Duration = Duration::from_millis(50);

/// Executes tries and steps for one evaluation unit.
pub struct EvaluationLoop {
    ctx: Arc<EngineContext>,
    evolutionary_mode: bool,
    pacer: Arc<RealtimePacer>,
    realtime_supported: bool,
    terminate_try: Arc<AtomicBool>,
    refresh_requested: Arc<AtomicBool>,
    cached_tries: i64,
    cached_steps: i64,
    tries_revision: u64,
    steps_revision: u64,
    _subscriptions: Vec<Subscription>,
}

impl EvaluationLoop {
    /// Creates a loop bound to the context.
    ///
    /// In evolutionary mode try/step counts are clamped to at least 1 and
    /// re-read whenever an evaluation pass starts; outside it, a try count
    /// of −1 runs unbounded and a step count ≤ 0 runs each try unbounded.
    pub fn new(ctx: Arc<EngineContext>, evolutionary_mode: bool) -> Self {
        let values = ctx.values();
        values.register(paths::NUMBER_OF_TRIES, Value::Int(1));
        values.register(paths::NUMBER_OF_STEPS, Value::Int(1000));
        values.register(paths::CURRENT_TRY, Value::Int(0));
        values.register(paths::CURRENT_STEP, Value::Int(0));
        values.register(paths::PAUSE, Value::Bool(false));
        values.register(paths::RUN_IN_REALTIME, Value::Bool(false));
        values.register(paths::TIME_STEP_SIZE, Value::Double(0.01));
        values.register(paths::STEP_DELAY, Value::Int(0));

        let realtime_supported = match values.get_double(paths::TIME_STEP_SIZE) {
            Some(step) if step > 0.0 => true,
            _ => {
                tracing::warn!(
                    "Time step size is missing or non-positive; real-time support disabled"
                );
                false
            }
        };

        let terminate_try = Arc::new(AtomicBool::new(false));
        let refresh_requested = Arc::new(AtomicBool::new(false));

        let mut subscriptions = Vec::new();
        let terminate = terminate_try.clone();
        subscriptions.push(ctx.events().subscribe(topics::TERMINATE_TRY, move || {
            terminate.store(true, Ordering::SeqCst);
        }));
        if evolutionary_mode {
            let refresh = refresh_requested.clone();
            subscriptions.push(ctx.events().subscribe(topics::EVALUATION_STARTED, move || {
                refresh.store(true, Ordering::SeqCst);
            }));
        }

        let mut this = Self {
            ctx,
            evolutionary_mode,
            pacer: Arc::new(RealtimePacer::new()),
            realtime_supported,
            terminate_try,
            refresh_requested,
            cached_tries: 1,
            cached_steps: 1,
            tries_revision: 0,
            steps_revision: 0,
            _subscriptions: subscriptions,
        };
        this.refresh_counts(true);
        this
    }

    /// The gate an external pacing timer signals in real-time mode.
    pub fn pacer(&self) -> Arc<RealtimePacer> {
        self.pacer.clone()
    }

    /// Runs the configured tries. Returns early, without triggering the
    /// remaining boundary events, when shutdown is requested.
    pub fn execute(&mut self) {
        let ctx = self.ctx.clone();
        let mut try_index: i64 = 0;
        loop {
            self.refresh_counts(false);
            if ctx.shutdown_requested() {
                return;
            }
            let tries = self.cached_tries;
            if tries >= 0 && try_index >= tries {
                break;
            }
            self.terminate_try.store(false, Ordering::SeqCst);
            ctx.values().set_int(paths::CURRENT_TRY, try_index);
            ctx.events().trigger(topics::NEXT_TRY);
            ctx.events().trigger(topics::RESET);
            ctx.events().trigger(topics::RESET_COMPLETED);

            self.run_steps(&ctx);

            if ctx.shutdown_requested() {
                return;
            }
            ctx.events().trigger(topics::TRY_COMPLETED);
            try_index += 1;
        }
    }

    fn run_steps(&self, ctx: &EngineContext) {
        let steps = self.cached_steps;
        let mut step_index: i64 = 0;
        loop {
            if steps > 0 && step_index >= steps {
                break;
            }
            // Pause gate; shutdown is re-checked so a paused loop stays
            // cancellable.
            while self.is_paused(ctx) && !ctx.shutdown_requested() {
                ctx.tasks().drain();
                std::thread::sleep(MAX_SLEEP_CHUNK);
            }
            if ctx.shutdown_requested() {
                break;
            }
            ctx.values().set_int(paths::CURRENT_STEP, step_index);
            ctx.events().trigger(topics::NEXT_STEP);
            ctx.tasks().drain();
            if ctx.shutdown_requested() {
                break;
            }
            ctx.events().trigger(topics::PRE_STEP_COMPLETED);
            ctx.events().trigger(topics::STEP_COMPLETED);
            ctx.tasks().drain();
            self.wait_for_pacing(ctx);
            if ctx.shutdown_requested() || self.terminate_try.load(Ordering::SeqCst) {
                break;
            }
            step_index += 1;
        }
    }

    fn is_paused(&self, ctx: &EngineContext) -> bool {
        ctx.values().get_bool(paths::PAUSE).unwrap_or(false)
    }

    fn wait_for_pacing(&self, ctx: &EngineContext) {
        let realtime = ctx
            .values()
            .get_bool(paths::RUN_IN_REALTIME)
            .unwrap_or(false);
        if realtime && self.realtime_supported {
            let step_seconds = ctx
                .values()
                .get_double(paths::TIME_STEP_SIZE)
                .unwrap_or(0.01);
            // Wait for the external tick, bounded so a stalled timer
            // degrades to unpaced stepping instead of hanging the loop.
            let bound = Duration::from_millis(((step_seconds * 1000.0) as u64).max(1) * 4)
                .max(PACING_POLL);
            let mut waited = Duration::ZERO;
            while !ctx.shutdown_requested() && waited < bound {
                let chunk = PACING_POLL.min(bound - waited);
                if self.pacer.wait_timeout(chunk) {
                    return;
                }
                waited += chunk;
            }
        } else {
            let delay_ms = ctx.values().get_int(paths::STEP_DELAY).unwrap_or(0).max(0) as u64;
            if delay_ms == 0 {
                return;
            }
            // Chunked so shutdown stays responsive through long delays.
            let mut remaining = Duration::from_millis(delay_ms);
            while !ctx.shutdown_requested() && remaining > Duration::ZERO {
                let chunk = remaining.min(MAX_SLEEP_CHUNK);
                std::thread::sleep(chunk);
                remaining = remaining.saturating_sub(chunk);
            }
        }
    }

    fn refresh_counts(&mut self, force: bool) {
        let values = self.ctx.values();
        let tries_revision = values.revision(paths::NUMBER_OF_TRIES).unwrap_or(0);
        let steps_revision = values.revision(paths::NUMBER_OF_STEPS).unwrap_or(0);
        let requested = self.refresh_requested.swap(false, Ordering::SeqCst);
        if !force
            && !requested
            && tries_revision == self.tries_revision
            && steps_revision == self.steps_revision
        {
            return;
        }
        self.tries_revision = tries_revision;
        self.steps_revision = steps_revision;

        let raw_tries = values.get_int(paths::NUMBER_OF_TRIES).unwrap_or(1);
        let raw_steps = values.get_int(paths::NUMBER_OF_STEPS).unwrap_or(1);
        if self.evolutionary_mode {
            // Unbounded runs are only permitted outside evolutionary mode.
            self.cached_tries = raw_tries.max(1);
            self.cached_steps = raw_steps.max(1);
        } else {
            self.cached_tries = if raw_tries == -1 { -1 } else { raw_tries.max(1) };
            self.cached_steps = raw_steps;
        }
    }
}
