//! Demo model layer: a weight-vector genome plus the built-in selection,
//! variation and evaluation methods the headless runner wires together.

/// Loop-driving evaluation with a pluggable fitness function.
pub mod evaluation;
/// Flat weight-vector genome.
pub mod genome;
/// Gaussian weight mutation.
pub mod mutation;
/// Fitness-based tournament selection.
pub mod selection;

pub use evaluation::ScriptedEvaluation;
pub use genome::WeightGenome;
pub use mutation::MutationAlgorithm;
pub use selection::TournamentSelection;
