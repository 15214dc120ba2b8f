//! Pluggable method contracts.
//!
//! Selection methods, evolution algorithms and evaluation methods are the
//! three seams the orchestrator drives. They receive borrowed views of the
//! arena and the populations they act on; ownership of individuals stays
//! with the arena throughout.

use std::collections::BTreeSet;

use tropism_data::{IndividualArena, IndividualId};

use crate::context::EngineContext;
use crate::population::Population;

/// Borrowed view handed to evolution algorithms: one world's populations
/// plus the shared arena.
pub struct GenerationView<'a> {
    pub arena: &'a mut IndividualArena,
    pub populations: &'a mut [Population],
}

/// Borrowed view handed to evaluation methods.
pub struct EvaluationView<'a> {
    pub ctx: &'a EngineContext,
    pub arena: &'a mut IndividualArena,
    pub populations: &'a mut [Population],
}

/// Produces the individuals one population carries into the next
/// generation.
pub trait SelectionMethod: Send {
    fn name(&self) -> &str;

    /// Returns up to `desired_count` individual ids for the new
    /// generation. Survivors are returned as their existing ids; offspring
    /// are created in the arena with parent back-references set. The
    /// orchestrator deduplicates and pads the union afterwards.
    fn create_seed(
        &mut self,
        arena: &mut IndividualArena,
        source: &[IndividualId],
        desired_count: usize,
        preserved_parents: usize,
        parents_per_individual: usize,
    ) -> Vec<IndividualId>;

    /// Called on a full evolution restart.
    fn reset(&mut self) {}
}

/// Fills in genomes/variation for the pending new generation of a world.
pub trait EvolutionAlgorithm: Send {
    fn name(&self) -> &str;

    /// How many parents a selection method must record per offspring.
    fn required_parents_per_individual(&self) -> usize;

    /// Varies the new generation. `trashcan` holds the previous-generation
    /// individuals scheduled for destruction after this call; the
    /// algorithm may use it to skip wasted work on doomed individuals.
    /// Returns `false` on failure, which is logged by the orchestrator but
    /// does not abort the generation.
    fn create_next_generation(
        &mut self,
        view: &mut GenerationView<'_>,
        trashcan: &BTreeSet<IndividualId>,
    ) -> bool;

    /// Called on a full evolution restart.
    fn reset(&mut self) {}
}

/// Executes and scores a world's individuals, typically by driving an
/// [`EvaluationLoop`] once per individual.
///
/// [`EvaluationLoop`]: crate::evaluation::EvaluationLoop
pub trait EvaluationMethod: Send {
    fn name(&self) -> &str;

    /// Returns `false` on failure; the orchestrator logs it and continues.
    fn evaluate_individuals(&mut self, view: &mut EvaluationView<'_>) -> bool;

    /// Called on a full evolution restart.
    fn reset(&mut self) {}

    /// Asks a running evaluation to stop at the next opportunity.
    fn stop_evaluation(&mut self) {}
}
