//! The demo controller genome: a flat vector of weights.
//!
//! Stands in for a real network genotype so the engine can be exercised
//! end to end without a physics or network backend.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::any::Any;

use tropism_data::Genome;

/// A fixed-length weight vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightGenome {
    pub weights: Vec<f64>,
}

impl WeightGenome {
    pub fn new(weights: Vec<f64>) -> Self {
        Self { weights }
    }

    /// A random genome with weights uniform in [-1, 1).
    pub fn random<R: Rng>(length: usize, rng: &mut R) -> Self {
        Self {
            weights: (0..length).map(|_| rng.gen_range(-1.0..1.0)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

impl Genome for WeightGenome {
    fn clone_genome(&self) -> Box<dyn Genome> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_random_genome_has_requested_length() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let genome = WeightGenome::random(12, &mut rng);
        assert_eq!(genome.len(), 12);
        assert!(genome.weights.iter().all(|w| (-1.0..1.0).contains(w)));
    }

    #[test]
    fn test_same_seed_same_genome() {
        let mut rng1 = ChaCha8Rng::seed_from_u64(9);
        let mut rng2 = ChaCha8Rng::seed_from_u64(9);
        assert_eq!(
            WeightGenome::random(8, &mut rng1),
            WeightGenome::random(8, &mut rng2)
        );
    }

    #[test]
    fn test_downcast_through_trait_object() {
        let boxed: Box<dyn Genome> = Box::new(WeightGenome::new(vec![0.5, -0.5]));
        let recovered = boxed.as_any().downcast_ref::<WeightGenome>().unwrap();
        assert_eq!(recovered.weights, vec![0.5, -0.5]);
    }
}
