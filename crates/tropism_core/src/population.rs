//! Population aggregate: an ordered list of arena ids plus selection
//! configuration.

use tropism_data::IndividualId;

use crate::methods::SelectionMethod;

/// One selection method with its relative proportion of the population.
pub struct SelectionEntry {
    pub proportion: f64,
    pub method: Box<dyn SelectionMethod>,
}

/// An ordered collection of individuals evolving together.
///
/// Members are ids into the world's arena; the population never owns
/// individual storage itself. `desired_size` below 1 is floored to 1 at
/// selection time.
pub struct Population {
    name: String,
    members: Vec<IndividualId>,
    desired_size: usize,
    preserved_parents: usize,
    selections: Vec<SelectionEntry>,
}

impl Population {
    pub fn new(name: impl Into<String>, desired_size: usize, preserved_parents: usize) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
            desired_size,
            preserved_parents,
            selections: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn members(&self) -> &[IndividualId] {
        &self.members
    }

    pub fn set_members(&mut self, members: Vec<IndividualId>) {
        self.members = members;
    }

    pub fn take_members(&mut self) -> Vec<IndividualId> {
        std::mem::take(&mut self.members)
    }

    pub fn size(&self) -> usize {
        self.members.len()
    }

    pub fn desired_size(&self) -> usize {
        self.desired_size
    }

    /// Effective target size, floored to at least 1.
    pub fn effective_desired_size(&self) -> usize {
        self.desired_size.max(1)
    }

    pub fn set_desired_size(&mut self, desired_size: usize) {
        self.desired_size = desired_size;
    }

    pub fn preserved_parents(&self) -> usize {
        self.preserved_parents
    }

    /// Adds a selection method with a relative proportion. Proportions are
    /// normalized against their sum at selection time; non-positive
    /// proportions contribute nothing.
    pub fn add_selection(&mut self, proportion: f64, method: Box<dyn SelectionMethod>) {
        self.selections.push(SelectionEntry { proportion, method });
    }

    pub fn selections(&self) -> &[SelectionEntry] {
        &self.selections
    }

    pub fn selections_mut(&mut self) -> &mut [SelectionEntry] {
        &mut self.selections
    }
}
