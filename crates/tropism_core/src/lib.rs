//! # Tropism Core
//!
//! The generation/evaluation orchestration engine for Tropism - an
//! evolutionary robotics research toolkit.
//!
//! This crate contains:
//! - **EngineContext**: event bus, value store, task channel and shutdown
//!   coordination, passed explicitly instead of living in process-wide
//!   singletons
//! - **GenerationOrchestrator**: one generation cycle per call, selection
//!   through variation to evaluation, with evaluation-only restart
//! - **EvaluationLoop / EvaluationLoopExecutor**: the nested try/step
//!   simulation loop with pause, try-termination, shutdown and real-time
//!   pacing
//! - The pluggable method contracts (selection, evolution algorithm,
//!   evaluation method) and the population/world aggregates they act on
//!
//! ## Architecture
//!
//! The orchestrator is single-threaded and cooperative: between phases it
//! drains the task channel and checks the shutdown flag, so collaborators
//! always observe a phase-aligned view of the data model. The threaded
//! executor owns a dedicated evaluation thread; only the real-time pacing
//! condvar is shared with the timer that drives it.

/// Explicitly constructed engine context.
pub mod context;
/// Engine error taxonomy.
pub mod error;
/// Topic-keyed event bus with scoped subscriptions.
pub mod events;
/// The try/step evaluation loop and its threaded executor.
pub mod evaluation;
/// Pluggable method contracts.
pub mod methods;
/// Generation processing.
pub mod orchestrator;
/// Well-known value paths.
pub mod paths;
/// Population aggregate.
pub mod population;
/// Shutdown flag and thread registry.
pub mod shutdown;
/// Cooperative task channel.
pub mod tasks;
/// Well-known event topics.
pub mod topics;
/// Tagged-variant value store.
pub mod values;
/// World aggregate.
pub mod world;

pub use context::EngineContext;
pub use error::EngineError;
pub use evaluation::{EvaluationLoop, EvaluationLoopExecutor, RealtimePacer};
pub use events::{EventBus, Subscription};
pub use methods::{EvaluationMethod, EvaluationView, EvolutionAlgorithm, GenerationView, SelectionMethod};
pub use orchestrator::GenerationOrchestrator;
pub use population::{Population, SelectionEntry};
pub use shutdown::ShutdownCoordinator;
pub use tasks::TaskQueue;
pub use values::{Value, ValueStore};
pub use world::World;
