//! Well-known value paths.
//!
//! Every path the engine registers on the value store lives here, so
//! observers and front-ends can read them without string duplication.

pub const CURRENT_GENERATION: &str = "/evolution/current-generation";
pub const RESTART_GENERATION: &str = "/evolution/restart-generation";
pub const WORKING_DIRECTORY: &str = "/evolution/working-directory";

pub const RUN_EVOLUTION: &str = "/control/run-evolution";
pub const PAUSE: &str = "/control/pause";
pub const RUN_IN_REALTIME: &str = "/control/run-in-realtime";
/// Simulated seconds per step; drives the real-time pacing interval.
pub const TIME_STEP_SIZE: &str = "/control/time-step-size";
/// Extra per-step delay in milliseconds when real-time pacing is off.
pub const STEP_DELAY: &str = "/control/step-delay";

pub const NUMBER_OF_TRIES: &str = "/execution/number-of-tries";
pub const NUMBER_OF_STEPS: &str = "/execution/number-of-steps";
pub const NUMBER_OF_INDIVIDUALS: &str = "/execution/number-of-individuals";
pub const CURRENT_TRY: &str = "/execution/current-try";
pub const CURRENT_STEP: &str = "/execution/current-step";
pub const CURRENT_INDIVIDUAL: &str = "/execution/current-individual";

/// Published size of one population.
pub fn population_size(world: &str, population: &str) -> String {
    format!("/evolution/{world}/{population}/size")
}

/// Elapsed milliseconds of one orchestrator phase (observability only).
pub fn phase_elapsed(phase: &str) -> String {
    format!("/statistics/elapsed/{phase}")
}

/// Best fitness seen in one population during the last evaluation pass.
pub fn population_best_fitness(population: &str) -> String {
    format!("/statistics/{population}/best-fitness")
}

/// Mean fitness of one population during the last evaluation pass.
pub fn population_mean_fitness(population: &str) -> String {
    format!("/statistics/{population}/mean-fitness")
}
