//! Well-known event topics.
//!
//! Topics are opaque strings on the event bus; these constants are the
//! ones the engine itself triggers or consumes. Collaborators are free to
//! register additional topics of their own.

pub const GENERATION_STARTED: &str = "/evolution/generation-started";
pub const GENERATION_COMPLETED: &str = "/evolution/generation-completed";
pub const SELECTION_STARTED: &str = "/evolution/selection-started";
pub const SELECTION_COMPLETED: &str = "/evolution/selection-completed";
pub const EVOLUTION_ALGORITHM_STARTED: &str = "/evolution/algorithm-started";
pub const EVOLUTION_ALGORITHM_COMPLETED: &str = "/evolution/algorithm-completed";
pub const EVALUATION_STARTED: &str = "/evolution/evaluation-started";
pub const EVALUATION_COMPLETED: &str = "/evolution/evaluation-completed";
pub const EVOLUTION_TERMINATED: &str = "/evolution/terminated";
pub const EVOLUTION_RESTARTED: &str = "/evolution/restarted";

pub const NEXT_TRY: &str = "/execution/next-try";
pub const TRY_COMPLETED: &str = "/execution/try-completed";
pub const TERMINATE_TRY: &str = "/execution/terminate-try";
pub const NEXT_STEP: &str = "/execution/next-step";
/// Triggered immediately before [`STEP_COMPLETED`].
pub const PRE_STEP_COMPLETED: &str = "/execution/pre-step-completed";
pub const STEP_COMPLETED: &str = "/execution/step-completed";
pub const RESET: &str = "/execution/reset";
pub const RESET_COMPLETED: &str = "/execution/reset-completed";
pub const NEXT_INDIVIDUAL: &str = "/execution/next-individual";
pub const INDIVIDUAL_COMPLETED: &str = "/execution/individual-completed";

pub const SYSTEM_SHUTDOWN: &str = "/system/shutdown";
