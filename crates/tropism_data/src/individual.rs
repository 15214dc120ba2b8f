use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::genome::Genome;

/// Well-known property bag keys.
pub mod props {
    /// Scalar fitness assigned by an evaluation method.
    pub const FITNESS: &str = "fitness";
    /// Number of current-generation individuals whose first parent this is.
    pub const OFFSPRING_FIRST_PARENT: &str = "offspring-first-parent";
    /// Number of current-generation individuals referencing this as any parent.
    pub const OFFSPRING_ANY_PARENT: &str = "offspring-any-parent";
    /// Set by an evolution algorithm when the genome was varied.
    pub const MUTATED: &str = "mutated";
    /// Creation timestamp (RFC 3339).
    pub const CREATED_AT: &str = "created-at";
}

/// Stable identifier of an individual inside an [`IndividualArena`].
///
/// Ids are never reused within one arena; a stale id simply resolves to
/// nothing.
///
/// [`IndividualArena`]: crate::arena::IndividualArena
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct IndividualId(pub u64);

impl fmt::Display for IndividualId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A member of an evolving population.
///
/// Owns its genome exclusively. Parent links are weak id references
/// resolved through the arena; they are cleared by the orchestrator before
/// the previous generation is destroyed.
#[derive(Debug)]
pub struct Individual {
    id: IndividualId,
    genome: Option<Box<dyn Genome>>,
    parents: Vec<IndividualId>,
    properties: BTreeMap<String, String>,
    genome_protected: bool,
    genome_significantly_changed: bool,
}

impl Individual {
    pub(crate) fn new(id: IndividualId) -> Self {
        Self {
            id,
            genome: None,
            parents: Vec::new(),
            properties: BTreeMap::new(),
            genome_protected: false,
            genome_significantly_changed: false,
        }
    }

    pub fn id(&self) -> IndividualId {
        self.id
    }

    pub fn genome(&self) -> Option<&dyn Genome> {
        self.genome.as_deref()
    }

    pub fn genome_mut(&mut self) -> Option<&mut (dyn Genome + 'static)> {
        self.genome.as_deref_mut()
    }

    pub fn set_genome(&mut self, genome: Box<dyn Genome>) {
        self.genome = Some(genome);
    }

    pub fn has_genome(&self) -> bool {
        self.genome.is_some()
    }

    /// Parent back-references, first parent first.
    pub fn parents(&self) -> &[IndividualId] {
        &self.parents
    }

    pub fn first_parent(&self) -> Option<IndividualId> {
        self.parents.first().copied()
    }

    pub fn add_parent(&mut self, parent: IndividualId) {
        self.parents.push(parent);
    }

    pub fn clear_parents(&mut self) {
        self.parents.clear();
    }

    /// Reads a bookkeeping property.
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// Writes a bookkeeping property, replacing any previous value.
    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(key.into(), value.into());
    }

    pub fn remove_property(&mut self, key: &str) -> Option<String> {
        self.properties.remove(key)
    }

    pub fn properties(&self) -> impl Iterator<Item = (&str, &str)> {
        self.properties
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Convenience accessor for the numeric fitness property.
    pub fn fitness(&self) -> Option<f64> {
        self.property(props::FITNESS)?.parse().ok()
    }

    pub fn set_fitness(&mut self, fitness: f64) {
        self.set_property(props::FITNESS, fitness.to_string());
    }

    /// A protected genome must not be varied by an evolution algorithm.
    pub fn is_genome_protected(&self) -> bool {
        self.genome_protected
    }

    pub fn set_genome_protected(&mut self, protected: bool) {
        self.genome_protected = protected;
    }

    /// Marker set by evolution algorithms when variation altered the genome
    /// beyond parameter noise; cleared when a new generation is applied.
    pub fn genome_significantly_changed(&self) -> bool {
        self.genome_significantly_changed
    }

    pub fn set_genome_significantly_changed(&mut self, changed: bool) {
        self.genome_significantly_changed = changed;
    }
}
