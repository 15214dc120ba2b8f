//! World aggregate: populations plus the algorithm and evaluation method
//! that drive them.

use crate::methods::{EvaluationMethod, EvolutionAlgorithm};
use crate::population::Population;

/// A named evolution world.
///
/// Owns its populations exclusively, exactly one evolution algorithm
/// (required before generation processing) and optionally one evaluation
/// method.
pub struct World {
    name: String,
    populations: Vec<Population>,
    algorithm: Option<Box<dyn EvolutionAlgorithm>>,
    evaluation: Option<Box<dyn EvaluationMethod>>,
}

impl World {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            populations: Vec::new(),
            algorithm: None,
            evaluation: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add_population(&mut self, population: Population) {
        self.populations.push(population);
    }

    pub fn populations(&self) -> &[Population] {
        &self.populations
    }

    pub fn populations_mut(&mut self) -> &mut [Population] {
        &mut self.populations
    }

    pub fn set_algorithm(&mut self, algorithm: Box<dyn EvolutionAlgorithm>) {
        self.algorithm = Some(algorithm);
    }

    pub fn algorithm(&self) -> Option<&dyn EvolutionAlgorithm> {
        self.algorithm.as_deref()
    }

    pub fn algorithm_mut(&mut self) -> Option<&mut (dyn EvolutionAlgorithm + 'static)> {
        self.algorithm.as_deref_mut()
    }

    /// Temporarily removes the algorithm so it can be called against a
    /// mutable view of this world; pair with [`World::put_back_algorithm`].
    pub fn take_algorithm(&mut self) -> Option<Box<dyn EvolutionAlgorithm>> {
        self.algorithm.take()
    }

    pub fn put_back_algorithm(&mut self, algorithm: Box<dyn EvolutionAlgorithm>) {
        self.algorithm = Some(algorithm);
    }

    pub fn set_evaluation(&mut self, evaluation: Box<dyn EvaluationMethod>) {
        self.evaluation = Some(evaluation);
    }

    pub fn evaluation_mut(&mut self) -> Option<&mut (dyn EvaluationMethod + 'static)> {
        self.evaluation.as_deref_mut()
    }

    pub fn take_evaluation(&mut self) -> Option<Box<dyn EvaluationMethod>> {
        self.evaluation.take()
    }

    pub fn put_back_evaluation(&mut self, evaluation: Box<dyn EvaluationMethod>) {
        self.evaluation = Some(evaluation);
    }
}
