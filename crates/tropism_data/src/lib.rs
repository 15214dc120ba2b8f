//! # Tropism Data
//!
//! The individual-level data model for Tropism - an evolutionary robotics
//! engine core.
//!
//! This crate contains the ownership-free building blocks the engine
//! operates on:
//! - **Genome**: an opaque, cloneable trait object owned by an individual
//! - **Individual**: id, genome, weak parent references, property bag
//! - **IndividualArena**: the sole owner of individual storage, indexed by
//!   stable integer ids; stale lookups are a defined no-op
//!
//! Populations and worlds aggregate these ids one level up, in the engine
//! crate.

/// Individual arena with stable integer ids.
pub mod arena;
/// Opaque genome trait.
pub mod genome;
/// Individuals and their bookkeeping property bags.
pub mod individual;

pub use arena::IndividualArena;
pub use genome::Genome;
pub use individual::{props, Individual, IndividualId};
