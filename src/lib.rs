//! Neuroevolution of small heterogeneous recurrent networks in the NEAT
//! family, with mixed rate-coded and spiking neuron models and evolvable
//! Hebbian plasticity.
//!
//! The usual flow: build a template [`Organism`] around a [`Network`] of
//! the wanted shape and models, [`Population::spawn`] a population from
//! it, implement [`scenario::Plant`] for the task, and hand everything to
//! [`scenario::evolve`].

pub mod connection;
pub mod error;
mod genome;
pub mod innovation;
mod macros;
pub mod network;
pub mod neuron;
pub mod organism;
pub mod params;
pub mod plasticity;
pub mod population;
pub mod random;
pub mod scenario;
pub mod serde_traits;
pub mod species;

/// Dense, monotonically issued identifiers; never reused within a run.
pub type NeuronId = usize;
pub type ConnId = usize;
pub type NetId = usize;
pub type SpeciesId = usize;

pub use connection::{ConnKind, Connection};
pub use error::{Error, ErrorKind, Result};
pub use innovation::{Innovation, InnovationLog};
pub use network::Network;
pub use neuron::{Layer, Model, Neuron, NeuronKind};
pub use organism::Organism;
pub use params::Params;
pub use plasticity::{HebbPlasticity, HebbRule};
pub use population::Population;
pub use scenario::{evolve, run_episode, EvolutionHooks, Hook, Plant, Stats};
pub use serde_traits::{Archive, Restore};
pub use species::Species;
