//! Tournament selection.
//!
//! Carries the best individuals over unchanged (elite preservation) and
//! fills the rest of its share with offspring shells whose parents are
//! picked by k-way tournaments on the fitness property. Genomes are left
//! empty; the evolution algorithm fills them in the variation phase.

use chrono::Utc;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::cmp::Ordering;

use tropism_core::SelectionMethod;
use tropism_data::{props, IndividualArena, IndividualId};

pub struct TournamentSelection {
    tournament_size: usize,
    seed: u64,
    rng: ChaCha8Rng,
}

impl TournamentSelection {
    pub fn new(tournament_size: usize, seed: u64) -> Self {
        Self {
            tournament_size: tournament_size.max(1),
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    fn tournament(&mut self, arena: &IndividualArena, source: &[IndividualId]) -> IndividualId {
        let mut best = source[self.rng.gen_range(0..source.len())];
        for _ in 1..self.tournament_size {
            let candidate = source[self.rng.gen_range(0..source.len())];
            if fitness_of(arena, candidate) > fitness_of(arena, best) {
                best = candidate;
            }
        }
        best
    }
}

fn fitness_of(arena: &IndividualArena, id: IndividualId) -> f64 {
    arena.get(id).and_then(|i| i.fitness()).unwrap_or(0.0)
}

impl SelectionMethod for TournamentSelection {
    fn name(&self) -> &str {
        "tournament"
    }

    fn create_seed(
        &mut self,
        arena: &mut IndividualArena,
        source: &[IndividualId],
        desired_count: usize,
        preserved_parents: usize,
        parents_per_individual: usize,
    ) -> Vec<IndividualId> {
        let mut out: Vec<IndividualId> = Vec::with_capacity(desired_count);

        // Elite carry-over, best fitness first.
        let mut ranked: Vec<IndividualId> = source.to_vec();
        ranked.sort_by(|a, b| {
            fitness_of(arena, *b)
                .partial_cmp(&fitness_of(arena, *a))
                .unwrap_or(Ordering::Equal)
        });
        out.extend(ranked.iter().copied().take(preserved_parents.min(desired_count)));

        if source.is_empty() {
            // Bootstrap generation: the orchestrator pads with fresh
            // individuals and the algorithm gives them random genomes.
            return out;
        }

        while out.len() < desired_count {
            let mut parents = Vec::with_capacity(parents_per_individual.max(1));
            for _ in 0..parents_per_individual.max(1) {
                parents.push(self.tournament(arena, source));
            }
            let child = arena.create();
            if let Some(individual) = arena.get_mut(child) {
                for parent in parents {
                    individual.add_parent(parent);
                }
                individual.set_property(props::CREATED_AT, Utc::now().to_rfc3339());
            }
            out.push(child);
        }
        out
    }

    fn reset(&mut self) {
        self.rng = ChaCha8Rng::seed_from_u64(self.seed);
    }
}
