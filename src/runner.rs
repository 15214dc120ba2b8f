//! Headless run driver.
//!
//! Builds the engine from a [`RunConfig`], runs generations until the
//! configured count is reached, the run-evolution flag is cleared or
//! shutdown is requested, and collects a per-generation summary.

use anyhow::Result;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::config::RunConfig;
use crate::model::{MutationAlgorithm, ScriptedEvaluation, TournamentSelection};
use tropism_core::{paths, EngineContext, GenerationOrchestrator, Population, World};

/// One line of the run summary.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationSummary {
    pub generation: i64,
    pub best_fitness: Option<f64>,
    pub mean_fitness: Option<f64>,
}

/// Copies the loaded configuration onto the value store. Runs before the
/// engine components register their defaults, so the file settings win.
fn seed_values(ctx: &EngineContext, config: &RunConfig) {
    let values = ctx.values();
    values.set_int(paths::NUMBER_OF_TRIES, config.execution.tries);
    values.set_int(paths::NUMBER_OF_STEPS, config.execution.steps);
    values.set_bool(paths::RUN_IN_REALTIME, config.run.realtime);
    values.set_double(paths::TIME_STEP_SIZE, config.run.time_step_size);
    values.set_int(paths::STEP_DELAY, config.run.step_delay_ms);
    values.set_bool(paths::RUN_EVOLUTION, true);
}

fn build_orchestrator(
    ctx: Arc<EngineContext>,
    config: &RunConfig,
) -> Result<GenerationOrchestrator> {
    let mut orchestrator = GenerationOrchestrator::new(ctx.clone());

    let mut population = Population::new(
        "controllers",
        config.population.size,
        config.population.preserved_parents,
    );
    population.add_selection(
        1.0,
        Box::new(TournamentSelection::new(
            config.population.tournament_size,
            config.run.seed,
        )),
    );

    let mut world = World::new("main");
    world.add_population(population);
    world.set_algorithm(Box::new(MutationAlgorithm::new(
        &config.evolution,
        config.run.seed,
    )));

    let evaluation = ScriptedEvaluation::new(ctx.clone(), ScriptedEvaluation::sphere_fitness());
    if config.run.realtime {
        // The pacing timer lives outside the evaluation thread by design.
        let interval = Duration::from_secs_f64(config.run.time_step_size.max(0.001));
        evaluation.pacer().spawn_timer(ctx.clone(), interval)?;
    }
    world.set_evaluation(Box::new(evaluation));

    orchestrator.add_world(world);
    orchestrator.initialize()?;
    Ok(orchestrator)
}

/// Runs the configured evolution and returns the per-generation summary.
pub fn run(ctx: Arc<EngineContext>, config: RunConfig) -> Result<Vec<GenerationSummary>> {
    seed_values(&ctx, &config);
    let mut orchestrator = build_orchestrator(ctx.clone(), &config)?;

    let mut summaries = Vec::new();
    for _ in 0..config.run.generations {
        if ctx.shutdown_requested() {
            tracing::info!("Shutdown requested, stopping the run");
            break;
        }
        if !ctx.values().get_bool(paths::RUN_EVOLUTION).unwrap_or(true) {
            tracing::info!("Run-evolution flag cleared, stopping the run");
            break;
        }
        if !orchestrator.process_next_generation() {
            anyhow::bail!("generation processing failed");
        }

        let generation = ctx
            .values()
            .get_int(paths::CURRENT_GENERATION)
            .unwrap_or(0);
        let best_fitness = ctx
            .values()
            .get_double(&paths::population_best_fitness("controllers"));
        let mean_fitness = ctx
            .values()
            .get_double(&paths::population_mean_fitness("controllers"));
        tracing::info!(generation, ?best_fitness, "Generation complete");
        summaries.push(GenerationSummary {
            generation,
            best_fitness,
            mean_fitness,
        });
    }

    // Wind down: stop the pacing timer (if any) and confirm shutdown so
    // registered threads can be joined.
    if !ctx.shutdown_requested() {
        ctx.request_shutdown();
    }
    ctx.shutdown().acknowledge();
    ctx.shutdown().join_all();

    Ok(summaries)
}

/// Writes the run summary as pretty-printed JSON.
pub fn write_summary(path: &Path, summaries: &[GenerationSummary]) -> Result<()> {
    let file = std::fs::File::create(path)?;
    serde_json::to_writer_pretty(file, summaries)?;
    tracing::info!(path = %path.display(), "Run summary written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick_config() -> RunConfig {
        let mut config = RunConfig::default();
        config.run.generations = 3;
        config.population.size = 6;
        config.execution.steps = 2;
        config
    }

    #[test]
    fn test_run_produces_one_summary_per_generation() {
        let ctx = EngineContext::new();
        let summaries = run(ctx.clone(), quick_config()).unwrap();
        assert_eq!(summaries.len(), 3);
        assert_eq!(summaries[2].generation, 3);
        assert!(summaries.iter().all(|s| s.best_fitness.is_some()));
        assert_eq!(ctx.values().get_int(paths::CURRENT_GENERATION), Some(3));
    }

    #[test]
    fn test_shutdown_before_run_yields_no_generations() {
        let ctx = EngineContext::new();
        ctx.request_shutdown();
        let summaries = run(ctx, quick_config()).unwrap();
        assert!(summaries.is_empty());
    }
}
