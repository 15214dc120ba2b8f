//! Scripted evaluation: drives the evaluation loop once per individual
//! and scores genomes with a pluggable fitness function.
//!
//! A stand-in for a physics-backed evaluation method; the loop still runs
//! every try and step with the full event traffic, so listeners cannot
//! tell the difference.

use std::sync::Arc;

use crate::model::genome::WeightGenome;
use tropism_core::{
    paths, topics, EngineContext, EvaluationLoop, EvaluationMethod, EvaluationView, RealtimePacer,
};

/// Scores one genome.
pub type FitnessFn = Box<dyn FnMut(&WeightGenome) -> f64 + Send>;

pub struct ScriptedEvaluation {
    ctx: Arc<EngineContext>,
    eval_loop: EvaluationLoop,
    fitness: FitnessFn,
    stop_requested: bool,
}

impl ScriptedEvaluation {
    pub fn new(ctx: Arc<EngineContext>, fitness: FitnessFn) -> Self {
        Self {
            eval_loop: EvaluationLoop::new(ctx.clone(), true),
            ctx,
            fitness,
            stop_requested: false,
        }
    }

    /// The gate an external pacing timer signals in real-time mode.
    pub fn pacer(&self) -> Arc<RealtimePacer> {
        self.eval_loop.pacer()
    }

    /// The demo objective: negated sphere function, maximal at the
    /// origin.
    pub fn sphere_fitness() -> FitnessFn {
        Box::new(|genome| -genome.weights.iter().map(|w| w * w).sum::<f64>())
    }
}

impl EvaluationMethod for ScriptedEvaluation {
    fn name(&self) -> &str {
        "scripted"
    }

    fn evaluate_individuals(&mut self, view: &mut EvaluationView<'_>) -> bool {
        let total: usize = view.populations.iter().map(|p| p.size()).sum();
        self.ctx
            .values()
            .set_int(paths::NUMBER_OF_INDIVIDUALS, total as i64);

        let mut index: i64 = 0;
        for population_index in 0..view.populations.len() {
            let members = view.populations[population_index].members().to_vec();
            for id in members {
                if self.ctx.shutdown_requested() || self.stop_requested {
                    return true;
                }
                self.ctx.values().set_int(paths::CURRENT_INDIVIDUAL, index);
                self.ctx.events().trigger(topics::NEXT_INDIVIDUAL);

                self.eval_loop.execute();
                if self.ctx.shutdown_requested() {
                    return true;
                }

                if let Some(individual) = view.arena.get_mut(id) {
                    let fitness = individual
                        .genome()
                        .and_then(|g| g.as_any().downcast_ref::<WeightGenome>())
                        .map(|genome| (self.fitness)(genome));
                    if let Some(fitness) = fitness {
                        individual.set_fitness(fitness);
                    }
                }

                self.ctx.events().trigger(topics::INDIVIDUAL_COMPLETED);
                index += 1;
            }

            // Publish per-population statistics for observers.
            let population = &view.populations[population_index];
            let fitnesses: Vec<f64> = population
                .members()
                .iter()
                .filter_map(|&id| view.arena.get(id))
                .filter_map(|individual| individual.fitness())
                .collect();
            if !fitnesses.is_empty() {
                let best = fitnesses.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
                let mean = fitnesses.iter().sum::<f64>() / fitnesses.len() as f64;
                let name = population.name();
                self.ctx
                    .values()
                    .set_double(&paths::population_best_fitness(name), best);
                self.ctx
                    .values()
                    .set_double(&paths::population_mean_fitness(name), mean);
            }
        }
        true
    }

    fn reset(&mut self) {
        self.stop_requested = false;
    }

    fn stop_evaluation(&mut self) {
        self.stop_requested = true;
    }
}
