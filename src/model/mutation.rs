//! Gaussian-style weight mutation.
//!
//! Fills each genome-less member of the new generation by cloning its
//! first parent's weights and perturbing them; members without a parent
//! genome (population bootstrap, fill-up padding) get random weights.
//! Surviving individuals keep their genomes untouched.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeSet;

use crate::config::EvolutionSettings;
use crate::model::genome::WeightGenome;
use tropism_core::{EvolutionAlgorithm, GenerationView};
use tropism_data::{props, IndividualId};

pub struct MutationAlgorithm {
    genome_length: usize,
    mutation_rate: f64,
    mutation_strength: f64,
    seed: u64,
    rng: ChaCha8Rng,
}

impl MutationAlgorithm {
    pub fn new(settings: &EvolutionSettings, seed: u64) -> Self {
        Self {
            genome_length: settings.genome_length.max(1),
            mutation_rate: settings.mutation_rate,
            mutation_strength: settings.mutation_strength,
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    fn mutate(&mut self, genome: &mut WeightGenome) -> bool {
        let mut changed = false;
        for weight in &mut genome.weights {
            if self.rng.gen::<f64>() < self.mutation_rate {
                *weight += self
                    .rng
                    .gen_range(-self.mutation_strength..self.mutation_strength);
                *weight = weight.clamp(-5.0, 5.0);
                changed = true;
            }
        }
        changed
    }
}

impl EvolutionAlgorithm for MutationAlgorithm {
    fn name(&self) -> &str {
        "gaussian-mutation"
    }

    fn required_parents_per_individual(&self) -> usize {
        1
    }

    fn create_next_generation(
        &mut self,
        view: &mut GenerationView<'_>,
        trashcan: &BTreeSet<IndividualId>,
    ) -> bool {
        for population_index in 0..view.populations.len() {
            let members = view.populations[population_index].members().to_vec();
            for id in members {
                if trashcan.contains(&id) {
                    continue;
                }
                let Some(individual) = view.arena.get(id) else {
                    continue;
                };
                if individual.has_genome() {
                    // Survivor; its genome is carried over unchanged.
                    continue;
                }
                if individual.is_genome_protected() {
                    continue;
                }

                let parent_genome: Option<WeightGenome> = individual
                    .first_parent()
                    .and_then(|parent| view.arena.get(parent))
                    .and_then(|parent| parent.genome())
                    .and_then(|genome| genome.as_any().downcast_ref::<WeightGenome>())
                    .cloned();

                let (genome, mutated) = match parent_genome {
                    Some(mut genome) => {
                        let changed = self.mutate(&mut genome);
                        (genome, changed)
                    }
                    None => (
                        WeightGenome::random(self.genome_length, &mut self.rng),
                        true,
                    ),
                };

                let Some(individual) = view.arena.get_mut(id) else {
                    continue;
                };
                individual.set_genome(Box::new(genome));
                if mutated {
                    individual.set_genome_significantly_changed(true);
                    individual.set_property(props::MUTATED, "1");
                }
            }
        }
        true
    }

    fn reset(&mut self) {
        self.rng = ChaCha8Rng::seed_from_u64(self.seed);
    }
}
