//! Generation processing.
//!
//! One `process_next_generation()` call advances every registered world by
//! exactly one generation: selection, application of the new generation,
//! genome variation, destruction of the unused previous generation, then
//! evaluation with optional evaluation-only restarts. Phase boundaries
//! trigger events and pass through a cooperative yield point, so external
//! collaborators observe a consistent, phase-aligned data model and a
//! shutdown request is honored within one phase step.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use tropism_data::{props, IndividualArena, IndividualId};

use crate::context::EngineContext;
use crate::error::{EngineError, Result};
use crate::methods::{EvaluationMethod, EvaluationView, GenerationView};
use crate::population::Population;
use crate::world::World;
use crate::{paths, topics};

/// Nominal floor substituted for a zero proportion sum, so share
/// computation never divides by zero.
const MIN_PROPORTION_SUM: f64 = 1e-5;

/// Splits `desired_size` across selection methods by relative proportion.
///
/// Each share is `floor(desired_size * proportion / sum)` over the
/// positive proportions only; non-positive proportions always receive 0.
/// Flooring means the shares may sum to less than `desired_size`; the
/// selection phase pads the difference with fresh individuals.
pub fn allot_shares(desired_size: usize, proportions: &[f64]) -> Vec<usize> {
    let mut total: f64 = proportions.iter().filter(|p| **p > 0.0).sum();
    if total <= 0.0 {
        total = MIN_PROPORTION_SUM;
    }
    proportions
        .iter()
        .map(|&proportion| {
            if proportion <= 0.0 {
                0
            } else {
                (desired_size as f64 * (proportion / total)).floor() as usize
            }
        })
        .collect()
}

/// Drives the generation cycle across all registered worlds.
pub struct GenerationOrchestrator {
    ctx: Arc<EngineContext>,
    arena: IndividualArena,
    worlds: Vec<World>,
    default_evaluation: Option<Box<dyn EvaluationMethod>>,
    initialized: bool,
}

impl GenerationOrchestrator {
    /// Creates an orchestrator and registers its values on the store.
    /// Values seeded earlier (e.g. from a configuration file) are kept.
    pub fn new(ctx: Arc<EngineContext>) -> Self {
        let values = ctx.values();
        values.register(paths::CURRENT_GENERATION, crate::values::Value::Int(0));
        values.register(paths::RESTART_GENERATION, crate::values::Value::Bool(false));
        values.register(
            paths::WORKING_DIRECTORY,
            crate::values::Value::Text(".".to_string()),
        );
        values.register(paths::RUN_EVOLUTION, crate::values::Value::Bool(true));
        Self {
            ctx,
            arena: IndividualArena::new(),
            worlds: Vec::new(),
            default_evaluation: None,
            initialized: true,
        }
    }

    pub fn add_world(&mut self, world: World) {
        self.worlds.push(world);
    }

    pub fn worlds(&self) -> &[World] {
        &self.worlds
    }

    pub fn worlds_mut(&mut self) -> &mut [World] {
        &mut self.worlds
    }

    pub fn arena(&self) -> &IndividualArena {
        &self.arena
    }

    pub fn arena_mut(&mut self) -> &mut IndividualArena {
        &mut self.arena
    }

    /// Installs the optional evaluation method shared across worlds. It is
    /// invoked once per world on every evaluation pass, after the
    /// world-specific methods.
    pub fn set_default_evaluation(&mut self, evaluation: Box<dyn EvaluationMethod>) {
        self.default_evaluation = Some(evaluation);
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Validates the configuration and (re-)arms the orchestrator. Must be
    /// called again after a fatal configuration error before generation
    /// processing can resume.
    pub fn initialize(&mut self) -> Result<()> {
        for world in &self.worlds {
            if world.algorithm().is_none() {
                self.initialized = false;
                return Err(EngineError::MissingEvolutionAlgorithm(
                    world.name().to_string(),
                ));
            }
        }
        self.initialized = true;
        Ok(())
    }

    /// Advances every world by one generation.
    ///
    /// Returns `false` when the orchestrator is uninitialized or a world
    /// has no evolution algorithm (a fatal configuration error that also
    /// marks it uninitialized). A shutdown request observed between phases
    /// aborts the remaining phases and returns `true`; the partially
    /// processed generation is left as-is and cleaned up by
    /// [`restart_evolution`].
    ///
    /// [`restart_evolution`]: GenerationOrchestrator::restart_evolution
    pub fn process_next_generation(&mut self) -> bool {
        if !self.initialized {
            tracing::warn!("Generation processing refused: orchestrator is not initialized");
            return false;
        }
        for world in &self.worlds {
            if world.algorithm().is_none() {
                tracing::error!(
                    world = world.name(),
                    "World has no evolution algorithm; marking orchestrator uninitialized"
                );
                self.initialized = false;
                return false;
            }
        }

        let ctx = self.ctx.clone();
        let generation_timer = Instant::now();

        // Listeners observe the outgoing generation number during this
        // event only; every later phase sees the incremented value.
        ctx.events().trigger(topics::GENERATION_STARTED);
        let generation = ctx.values().get_int(paths::CURRENT_GENERATION).unwrap_or(0) + 1;
        ctx.values().set_int(paths::CURRENT_GENERATION, generation);
        tracing::info!(generation, "Processing generation");

        if ctx.yield_point() {
            return true;
        }

        // Selection.
        let phase_timer = Instant::now();
        ctx.events().trigger(topics::SELECTION_STARTED);
        let mut trashcan: BTreeSet<IndividualId> = BTreeSet::new();
        let mut pending: Vec<Vec<Vec<IndividualId>>> = Vec::with_capacity(self.worlds.len());
        for world in &mut self.worlds {
            let parents_required = world
                .algorithm()
                .map(|a| a.required_parents_per_individual())
                .unwrap_or(1);
            let mut world_pending = Vec::with_capacity(world.populations().len());
            for population in world.populations_mut() {
                world_pending.push(select_population(
                    &mut self.arena,
                    population,
                    parents_required,
                    &mut trashcan,
                ));
            }
            pending.push(world_pending);
        }
        // An id selected anywhere survives, even when a different
        // population's pass put it in the trashcan.
        for id in pending.iter().flatten().flatten() {
            trashcan.remove(id);
        }
        ctx.events().trigger(topics::SELECTION_COMPLETED);
        ctx.values().set_int(
            &paths::phase_elapsed("selection"),
            phase_timer.elapsed().as_millis() as i64,
        );

        if ctx.yield_point() {
            return true;
        }

        // Apply the pending generation.
        for (world, world_pending) in self.worlds.iter_mut().zip(pending) {
            let world_name = world.name().to_string();
            for (population, new_members) in world.populations_mut().iter_mut().zip(world_pending) {
                population.set_members(new_members);
                for &id in population.members() {
                    if let Some(individual) = self.arena.get_mut(id) {
                        individual.set_genome_significantly_changed(false);
                    }
                }
                ctx.values().set_int(
                    &paths::population_size(&world_name, population.name()),
                    population.size() as i64,
                );
            }
        }

        if ctx.yield_point() {
            return true;
        }

        // Variation.
        let phase_timer = Instant::now();
        ctx.events().trigger(topics::EVOLUTION_ALGORITHM_STARTED);
        for world in &mut self.worlds {
            let Some(mut algorithm) = world.take_algorithm() else {
                continue;
            };
            let mut view = GenerationView {
                arena: &mut self.arena,
                populations: world.populations_mut(),
            };
            if !algorithm.create_next_generation(&mut view, &trashcan) {
                tracing::warn!(
                    world = world.name(),
                    algorithm = algorithm.name(),
                    "Evolution algorithm reported failure"
                );
            }
            world.put_back_algorithm(algorithm);
        }
        ctx.events().trigger(topics::EVOLUTION_ALGORITHM_COMPLETED);
        ctx.values().set_int(
            &paths::phase_elapsed("variation"),
            phase_timer.elapsed().as_millis() as i64,
        );

        // Parent back-references are cleared before the trashcan is
        // emptied, so destruction never leaves a dangling edge behind.
        for individual in self.arena.iter_mut() {
            individual.clear_parents();
        }
        let destroyed = trashcan.len();
        for id in &trashcan {
            self.arena.destroy(*id);
        }
        tracing::debug!(destroyed, "Previous generation cleaned up");

        if ctx.yield_point() {
            return true;
        }

        // Evaluation, repeated while collaborators keep requesting an
        // evaluation-only restart. Deliberately unbounded.
        let phase_timer = Instant::now();
        loop {
            ctx.events().trigger(topics::EVALUATION_STARTED);
            ctx.values().set_bool(paths::RESTART_GENERATION, false);

            for world in &mut self.worlds {
                let Some(mut evaluation) = world.take_evaluation() else {
                    continue;
                };
                let mut view = EvaluationView {
                    ctx: &ctx,
                    arena: &mut self.arena,
                    populations: world.populations_mut(),
                };
                if !evaluation.evaluate_individuals(&mut view) {
                    tracing::warn!(
                        world = world.name(),
                        method = evaluation.name(),
                        "Evaluation method reported failure"
                    );
                }
                world.put_back_evaluation(evaluation);
                if ctx.yield_point() {
                    return true;
                }
            }
            if let Some(evaluation) = self.default_evaluation.as_mut() {
                for world in &mut self.worlds {
                    let mut view = EvaluationView {
                        ctx: &ctx,
                        arena: &mut self.arena,
                        populations: world.populations_mut(),
                    };
                    if !evaluation.evaluate_individuals(&mut view) {
                        tracing::warn!(
                            world = world.name(),
                            method = evaluation.name(),
                            "Default evaluation method reported failure"
                        );
                    }
                }
                if ctx.yield_point() {
                    return true;
                }
            }

            let restart = ctx
                .values()
                .get_bool(paths::RESTART_GENERATION)
                .unwrap_or(false);
            if !restart {
                break;
            }
            tracing::info!("Evaluation restart requested; repeating evaluation phase");
        }
        ctx.events().trigger(topics::EVALUATION_COMPLETED);
        ctx.values().set_int(
            &paths::phase_elapsed("evaluation"),
            phase_timer.elapsed().as_millis() as i64,
        );

        if ctx.yield_point() {
            return true;
        }

        ctx.events().trigger(topics::GENERATION_COMPLETED);
        ctx.values().set_int(
            &paths::phase_elapsed("generation"),
            generation_timer.elapsed().as_millis() as i64,
        );
        true
    }

    /// Full evolution reset: destroys every individual, resets every
    /// method and zeroes the generation counter. Idempotent; safe to call
    /// with no individuals present.
    pub fn restart_evolution(&mut self) -> bool {
        let ctx = self.ctx.clone();
        tracing::info!("Restarting evolution");
        ctx.events().trigger(topics::EVOLUTION_TERMINATED);

        ctx.values().set_int(paths::CURRENT_GENERATION, 0);

        for world in &mut self.worlds {
            let world_name = world.name().to_string();
            for population in world.populations_mut() {
                population.take_members();
                ctx.values()
                    .set_int(&paths::population_size(&world_name, population.name()), 0);
            }
        }
        // Also collects orphans left behind by an aborted generation.
        for individual in self.arena.iter_mut() {
            individual.clear_parents();
        }
        self.arena.clear();

        for world in &mut self.worlds {
            for population in world.populations_mut() {
                for entry in population.selections_mut() {
                    entry.method.reset();
                }
            }
            if let Some(algorithm) = world.algorithm_mut() {
                algorithm.reset();
            }
            if let Some(evaluation) = world.evaluation_mut() {
                evaluation.reset();
            }
        }
        if let Some(evaluation) = self.default_evaluation.as_mut() {
            evaluation.reset();
        }

        ctx.values().set_bool(paths::RESTART_GENERATION, false);
        ctx.values().set_int(paths::CURRENT_TRY, 0);
        ctx.values().set_int(paths::CURRENT_STEP, 0);
        ctx.values().set_int(paths::CURRENT_INDIVIDUAL, 0);
        ctx.values().set_text(paths::WORKING_DIRECTORY, ".");

        ctx.events().trigger(topics::EVOLUTION_RESTARTED);
        true
    }
}

/// Computes one population's next generation and updates the shared
/// trashcan.
fn select_population(
    arena: &mut IndividualArena,
    population: &mut Population,
    parents_required: usize,
    trashcan: &mut BTreeSet<IndividualId>,
) -> Vec<IndividualId> {
    // The outgoing generation becomes fair game for variation and
    // destruction.
    for &id in population.members() {
        if let Some(individual) = arena.get_mut(id) {
            individual.set_genome_protected(false);
        }
    }

    let desired = population.effective_desired_size();
    let preserved = population.preserved_parents();
    let source: Vec<IndividualId> = population.members().to_vec();

    let proportions: Vec<f64> = population
        .selections()
        .iter()
        .map(|entry| entry.proportion)
        .collect();
    let shares = allot_shares(desired, &proportions);

    let mut new_members: Vec<IndividualId> = Vec::with_capacity(desired);
    let mut seen: HashSet<IndividualId> = HashSet::with_capacity(desired);
    for (entry, share) in population.selections_mut().iter_mut().zip(shares) {
        if share == 0 {
            continue;
        }
        let produced = entry
            .method
            .create_seed(arena, &source, share, preserved, parents_required);
        for id in produced {
            if seen.insert(id) {
                new_members.push(id);
            }
        }
    }

    // Flooring losses and under-producing methods are padded with fresh
    // empty individuals; the evolution algorithm gives them genomes.
    while new_members.len() < desired {
        let id = arena.create();
        seen.insert(id);
        new_members.push(id);
    }

    for &id in &source {
        if !seen.contains(&id) {
            trashcan.insert(id);
        }
    }
    for id in &new_members {
        trashcan.remove(id);
    }

    // Offspring bookkeeping for the individuals that made it through.
    let mut first_parent_counts: HashMap<IndividualId, u64> = HashMap::new();
    let mut any_parent_counts: HashMap<IndividualId, u64> = HashMap::new();
    for &id in &new_members {
        if let Some(individual) = arena.get(id) {
            if let Some(first) = individual.first_parent() {
                *first_parent_counts.entry(first).or_default() += 1;
            }
            for &parent in individual.parents() {
                *any_parent_counts.entry(parent).or_default() += 1;
            }
        }
    }
    for &id in &source {
        if !seen.contains(&id) {
            continue;
        }
        if let Some(individual) = arena.get_mut(id) {
            individual.set_property(
                props::OFFSPRING_FIRST_PARENT,
                first_parent_counts.get(&id).copied().unwrap_or(0).to_string(),
            );
            individual.set_property(
                props::OFFSPRING_ANY_PARENT,
                any_parent_counts.get(&id).copied().unwrap_or(0).to_string(),
            );
        }
    }

    new_members
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::methods::SelectionMethod;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[test]
    fn test_allot_shares_worked_example() {
        assert_eq!(allot_shares(100, &[0.5, 1.5]), vec![25, 75]);
        assert_eq!(allot_shares(15, &[1.0]), vec![15]);
        assert_eq!(allot_shares(20, &[2.0]), vec![20]);
    }

    #[test]
    fn test_allot_shares_ignores_non_positive() {
        assert_eq!(allot_shares(10, &[0.0, -1.0]), vec![0, 0]);
        assert_eq!(allot_shares(10, &[1.0, 0.0, 1.0]), vec![5, 0, 5]);
    }

    #[test]
    fn test_allot_shares_never_exceeds_desired() {
        let shares = allot_shares(7, &[1.0, 1.0, 1.0]);
        assert!(shares.iter().sum::<usize>() <= 7);
    }

    // ---- test doubles ----------------------------------------------------

    /// Keeps the first `keep` source individuals and breeds the rest from
    /// the first survivor.
    struct KeepAndBreed {
        keep: usize,
    }

    impl SelectionMethod for KeepAndBreed {
        fn name(&self) -> &str {
            "keep-and-breed"
        }
        fn create_seed(
            &mut self,
            arena: &mut IndividualArena,
            source: &[IndividualId],
            desired_count: usize,
            _preserved_parents: usize,
            parents_per_individual: usize,
        ) -> Vec<IndividualId> {
            let mut out: Vec<IndividualId> =
                source.iter().copied().take(self.keep.min(desired_count)).collect();
            while out.len() < desired_count {
                let child = arena.create();
                if let Some(&parent) = source.first() {
                    let individual = arena.get_mut(child).unwrap();
                    for _ in 0..parents_per_individual.max(1) {
                        individual.add_parent(parent);
                    }
                }
                out.push(child);
            }
            out
        }
    }

    /// Records the share it is asked for and produces nothing.
    struct ShareRecorder {
        shares: Arc<Mutex<Vec<usize>>>,
    }

    impl SelectionMethod for ShareRecorder {
        fn name(&self) -> &str {
            "share-recorder"
        }
        fn create_seed(
            &mut self,
            _arena: &mut IndividualArena,
            _source: &[IndividualId],
            desired_count: usize,
            _preserved_parents: usize,
            _parents_per_individual: usize,
        ) -> Vec<IndividualId> {
            self.shares.lock().unwrap().push(desired_count);
            Vec::new()
        }
    }

    #[derive(Default)]
    struct NullAlgorithm {
        resets: Arc<AtomicUsize>,
        trashcan_sizes: Arc<Mutex<Vec<usize>>>,
    }

    impl crate::methods::EvolutionAlgorithm for NullAlgorithm {
        fn name(&self) -> &str {
            "null"
        }
        fn required_parents_per_individual(&self) -> usize {
            1
        }
        fn create_next_generation(
            &mut self,
            _view: &mut GenerationView<'_>,
            trashcan: &BTreeSet<IndividualId>,
        ) -> bool {
            self.trashcan_sizes.lock().unwrap().push(trashcan.len());
            true
        }
        fn reset(&mut self) {
            self.resets.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[derive(Default)]
    struct CountingEvaluation {
        calls: Arc<AtomicUsize>,
        resets: Arc<AtomicUsize>,
        restarts_to_request: Arc<AtomicUsize>,
    }

    impl EvaluationMethod for CountingEvaluation {
        fn name(&self) -> &str {
            "counting"
        }
        fn evaluate_individuals(&mut self, view: &mut EvaluationView<'_>) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.restarts_to_request.load(Ordering::SeqCst) > 0 {
                self.restarts_to_request.fetch_sub(1, Ordering::SeqCst);
                view.ctx
                    .values()
                    .set_bool(paths::RESTART_GENERATION, true);
            }
            true
        }
        fn reset(&mut self) {
            self.resets.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn seeded_orchestrator(
        keep: usize,
        desired: usize,
        initial: usize,
    ) -> (Arc<EngineContext>, GenerationOrchestrator, Vec<IndividualId>) {
        let ctx = EngineContext::new();
        let mut orchestrator = GenerationOrchestrator::new(ctx.clone());

        let mut population = Population::new("pop", desired, 1);
        population.add_selection(1.0, Box::new(KeepAndBreed { keep }));

        let mut world = World::new("main");
        world.add_population(population);
        world.set_algorithm(Box::<NullAlgorithm>::default());
        orchestrator.add_world(world);

        let mut ids = Vec::new();
        for _ in 0..initial {
            ids.push(orchestrator.arena_mut().create());
        }
        orchestrator.worlds_mut()[0].populations_mut()[0].set_members(ids.clone());

        (ctx, orchestrator, ids)
    }

    #[test]
    fn test_missing_algorithm_marks_uninitialized() {
        let ctx = EngineContext::new();
        let mut orchestrator = GenerationOrchestrator::new(ctx);
        orchestrator.add_world(World::new("broken"));

        assert!(!orchestrator.process_next_generation());
        assert!(!orchestrator.is_initialized());
        // Fails fast until re-initialized.
        assert!(!orchestrator.process_next_generation());
        assert!(matches!(
            orchestrator.initialize(),
            Err(EngineError::MissingEvolutionAlgorithm(_))
        ));

        orchestrator.worlds_mut()[0].set_algorithm(Box::<NullAlgorithm>::default());
        orchestrator.initialize().unwrap();
        assert!(orchestrator.process_next_generation());
    }

    #[test]
    fn test_survivors_live_and_leftovers_die() {
        let (_ctx, mut orchestrator, ids) = seeded_orchestrator(2, 4, 4);
        assert!(orchestrator.process_next_generation());

        let arena = orchestrator.arena();
        // First two survive, the rest of the old generation is destroyed.
        assert!(arena.contains(ids[0]));
        assert!(arena.contains(ids[1]));
        assert!(!arena.contains(ids[2]));
        assert!(!arena.contains(ids[3]));

        let population = &orchestrator.worlds()[0].populations()[0];
        assert_eq!(population.size(), 4);
        assert_eq!(&population.members()[..2], &ids[..2]);

        // Parent edges were cleared before destruction.
        for &id in population.members() {
            assert!(arena.get(id).unwrap().parents().is_empty());
        }
    }

    #[test]
    fn test_offspring_counters_recorded_on_survivors() {
        let (_ctx, mut orchestrator, ids) = seeded_orchestrator(2, 4, 4);
        assert!(orchestrator.process_next_generation());

        let arena = orchestrator.arena();
        let breeder = arena.get(ids[0]).unwrap();
        // Two offspring, both with ids[0] as their only (first) parent.
        assert_eq!(breeder.property(props::OFFSPRING_FIRST_PARENT), Some("2"));
        assert_eq!(breeder.property(props::OFFSPRING_ANY_PARENT), Some("2"));

        let bystander = arena.get(ids[1]).unwrap();
        assert_eq!(bystander.property(props::OFFSPRING_FIRST_PARENT), Some("0"));
        assert_eq!(bystander.property(props::OFFSPRING_ANY_PARENT), Some("0"));
    }

    #[test]
    fn test_zero_proportions_pad_with_fresh_individuals() {
        let ctx = EngineContext::new();
        let mut orchestrator = GenerationOrchestrator::new(ctx);

        let shares = Arc::new(Mutex::new(Vec::new()));
        let mut population = Population::new("pop", 3, 0);
        population.add_selection(0.0, Box::new(ShareRecorder { shares: shares.clone() }));
        population.add_selection(-1.0, Box::new(ShareRecorder { shares: shares.clone() }));

        let mut world = World::new("main");
        world.add_population(population);
        world.set_algorithm(Box::<NullAlgorithm>::default());
        orchestrator.add_world(world);

        let old = orchestrator.arena_mut().create();
        orchestrator.worlds_mut()[0].populations_mut()[0].set_members(vec![old]);

        assert!(orchestrator.process_next_generation());
        // Neither method was invoked; padding produced the generation.
        assert!(shares.lock().unwrap().is_empty());
        let population = &orchestrator.worlds()[0].populations()[0];
        assert_eq!(population.size(), 3);
        assert!(!orchestrator.arena().contains(old));
    }

    #[test]
    fn test_shares_passed_to_methods_match_worked_example() {
        let ctx = EngineContext::new();
        let mut orchestrator = GenerationOrchestrator::new(ctx);

        let shares_a = Arc::new(Mutex::new(Vec::new()));
        let shares_b = Arc::new(Mutex::new(Vec::new()));
        let shares_c = Arc::new(Mutex::new(Vec::new()));

        let mut first = Population::new("first", 100, 0);
        first.add_selection(0.5, Box::new(ShareRecorder { shares: shares_a.clone() }));
        first.add_selection(1.5, Box::new(ShareRecorder { shares: shares_b.clone() }));
        let mut third = Population::new("third", 20, 0);
        third.add_selection(3.0, Box::new(ShareRecorder { shares: shares_c.clone() }));

        let mut world = World::new("main");
        world.add_population(first);
        world.add_population(third);
        world.set_algorithm(Box::<NullAlgorithm>::default());
        orchestrator.add_world(world);

        assert!(orchestrator.process_next_generation());
        assert_eq!(*shares_a.lock().unwrap(), vec![25]);
        assert_eq!(*shares_b.lock().unwrap(), vec![75]);
        assert_eq!(*shares_c.lock().unwrap(), vec![20]);
    }

    #[test]
    fn test_event_order_and_generation_visibility() {
        let ctx = EngineContext::new();
        let mut orchestrator = GenerationOrchestrator::new(ctx.clone());

        let mut world = World::new("main");
        world.add_population(Population::new("pop", 1, 0));
        world.set_algorithm(Box::<NullAlgorithm>::default());
        orchestrator.add_world(world);

        let log: Arc<Mutex<Vec<(String, i64)>>> = Arc::new(Mutex::new(Vec::new()));
        let mut subscriptions = Vec::new();
        for topic in [
            topics::GENERATION_STARTED,
            topics::SELECTION_STARTED,
            topics::SELECTION_COMPLETED,
            topics::EVOLUTION_ALGORITHM_STARTED,
            topics::EVOLUTION_ALGORITHM_COMPLETED,
            topics::EVALUATION_STARTED,
            topics::EVALUATION_COMPLETED,
            topics::GENERATION_COMPLETED,
        ] {
            let log = log.clone();
            let ctx = ctx.clone();
            subscriptions.push(ctx.clone().events().subscribe(topic, move || {
                let generation = ctx.values().get_int(paths::CURRENT_GENERATION).unwrap();
                log.lock().unwrap().push((topic.to_string(), generation));
            }));
        }

        assert!(orchestrator.process_next_generation());

        let log = log.lock().unwrap();
        let order: Vec<&str> = log.iter().map(|(topic, _)| topic.as_str()).collect();
        assert_eq!(
            order,
            vec![
                topics::GENERATION_STARTED,
                topics::SELECTION_STARTED,
                topics::SELECTION_COMPLETED,
                topics::EVOLUTION_ALGORITHM_STARTED,
                topics::EVOLUTION_ALGORITHM_COMPLETED,
                topics::EVALUATION_STARTED,
                topics::EVALUATION_COMPLETED,
                topics::GENERATION_COMPLETED,
            ]
        );
        // Pre-increment value inside generation-started, post-increment after.
        assert_eq!(log[0].1, 0);
        assert!(log.iter().skip(1).all(|(_, generation)| *generation == 1));
    }

    #[test]
    fn test_shutdown_between_phases_aborts_cleanly() {
        let (ctx, mut orchestrator, ids) = seeded_orchestrator(2, 4, 4);

        let algorithm_started = Arc::new(AtomicUsize::new(0));
        let started = algorithm_started.clone();
        let _count_sub = ctx
            .events()
            .subscribe(topics::EVOLUTION_ALGORITHM_STARTED, move || {
                started.fetch_add(1, Ordering::SeqCst);
            });

        let ctx_clone = ctx.clone();
        let _shutdown_sub = ctx.events().subscribe(topics::SELECTION_COMPLETED, move || {
            ctx_clone.request_shutdown();
        });

        // Shutdown is a clean early return, not a failure.
        assert!(orchestrator.process_next_generation());
        assert_eq!(algorithm_started.load(Ordering::SeqCst), 0);
        // The aborted generation left the old individuals alive; a restart
        // sweeps them up.
        assert!(orchestrator.arena().contains(ids[2]));
        assert!(orchestrator.restart_evolution());
        assert!(orchestrator.arena().is_empty());
    }

    #[test]
    fn test_restart_generation_flag_reruns_evaluation_phase() {
        let ctx = EngineContext::new();
        let mut orchestrator = GenerationOrchestrator::new(ctx.clone());

        let evaluation = CountingEvaluation::default();
        let calls = evaluation.calls.clone();
        evaluation.restarts_to_request.store(1, Ordering::SeqCst);

        let mut world = World::new("main");
        world.add_population(Population::new("pop", 1, 0));
        world.set_algorithm(Box::<NullAlgorithm>::default());
        world.set_evaluation(Box::new(evaluation));
        orchestrator.add_world(world);

        let started = Arc::new(AtomicUsize::new(0));
        let completed = Arc::new(AtomicUsize::new(0));
        let s = started.clone();
        let _s_sub = ctx.events().subscribe(topics::EVALUATION_STARTED, move || {
            s.fetch_add(1, Ordering::SeqCst);
        });
        let c = completed.clone();
        let _c_sub = ctx.events().subscribe(topics::EVALUATION_COMPLETED, move || {
            c.fetch_add(1, Ordering::SeqCst);
        });

        assert!(orchestrator.process_next_generation());
        // One restart: the evaluation phase ran twice, completed once.
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(started.load(Ordering::SeqCst), 2);
        assert_eq!(completed.load(Ordering::SeqCst), 1);
        assert_eq!(
            ctx.values().get_bool(paths::RESTART_GENERATION),
            Some(false)
        );
    }

    #[test]
    fn test_restart_evolution_resets_everything_once() {
        let ctx = EngineContext::new();
        let mut orchestrator = GenerationOrchestrator::new(ctx.clone());

        let algorithm = NullAlgorithm::default();
        let algorithm_resets = algorithm.resets.clone();
        let evaluation = CountingEvaluation::default();
        let evaluation_resets = evaluation.resets.clone();
        let default_evaluation = CountingEvaluation::default();
        let default_resets = default_evaluation.resets.clone();

        let mut population = Population::new("pop", 2, 0);
        population.add_selection(1.0, Box::new(KeepAndBreed { keep: 1 }));
        let mut world = World::new("main");
        world.add_population(population);
        world.set_algorithm(Box::new(algorithm));
        world.set_evaluation(Box::new(evaluation));
        orchestrator.add_world(world);
        orchestrator.set_default_evaluation(Box::new(default_evaluation));

        assert!(orchestrator.process_next_generation());
        assert_eq!(ctx.values().get_int(paths::CURRENT_GENERATION), Some(1));
        assert!(!orchestrator.arena().is_empty());

        assert!(orchestrator.restart_evolution());
        assert_eq!(ctx.values().get_int(paths::CURRENT_GENERATION), Some(0));
        assert!(orchestrator.arena().is_empty());
        assert_eq!(algorithm_resets.load(Ordering::SeqCst), 1);
        assert_eq!(evaluation_resets.load(Ordering::SeqCst), 1);
        assert_eq!(default_resets.load(Ordering::SeqCst), 1);

        // Second restart with nothing left must not crash.
        assert!(orchestrator.restart_evolution());
        assert_eq!(ctx.values().get_int(paths::CURRENT_GENERATION), Some(0));
        assert_eq!(algorithm_resets.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_trashcan_passed_to_algorithm_before_destruction() {
        let (_ctx, mut orchestrator, _ids) = seeded_orchestrator(2, 4, 4);
        let algorithm = NullAlgorithm::default();
        let sizes = algorithm.trashcan_sizes.clone();
        orchestrator.worlds_mut()[0].set_algorithm(Box::new(algorithm));

        assert!(orchestrator.process_next_generation());
        // Two of four source individuals were not re-selected.
        assert_eq!(*sizes.lock().unwrap(), vec![2]);
    }
}
