//! Organisms: a network wrapped with the bookkeeping evolution needs.

use crate::{
    error::Result,
    innovation::InnovationLog,
    network::Network,
    params::Params,
    random::{happens, rand_plastic_term, rand_weight},
    ConnId, NetId, NeuronId, SpeciesId,
};
use rand::RngCore;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organism {
    pub net: Network,
    /// Generation this organism was created in
    pub gen: usize,
    /// Raw fitness, turned into the shared (adjusted) value during an epoch
    pub fitness: f64,
    /// Snapshot of the raw fitness taken before fitness sharing
    pub orig_fit: f64,
    pub winner: bool,
    pub eliminate: bool,
    /// Real-valued reproduction quota assigned during an epoch
    pub expected_offspring: f64,
    /// Species this organism currently belongs to
    pub species: SpeciesId,
}

impl Organism {
    pub fn new(net: Network, gen: usize) -> Self {
        Self {
            net,
            gen,
            fitness: 0.0,
            orig_fit: 0.0,
            winner: false,
            eliminate: false,
            expected_offspring: 0.0,
            species: 0,
        }
    }

    pub fn id(&self) -> NetId {
        self.net.id
    }

    pub fn set_id(&mut self, id: NetId) {
        self.net.id = id;
    }

    /// Fresh copy of the genome under a new id, with clean bookkeeping.
    pub fn duplicate(&self, id: NetId, gen: usize) -> Self {
        Self::new(self.net.duplicate(id), gen)
    }

    /// One generation worth of mutation. During the plasticity phase only
    /// the plastic terms move; otherwise a structural branch is sampled
    /// first and parameter mutation is the fallthrough.
    pub fn evolve(
        &mut self,
        next_nid: &mut NeuronId,
        next_cid: &mut ConnId,
        log: &mut InnovationLog,
        plastic_phase: bool,
        params: &Params,
        rng: &mut impl RngCore,
    ) {
        if plastic_phase {
            self.net.mutate_plastic_terms(params, rng);
        } else if happens(rng, params.add_ff_node_prob) {
            self.net.add_neuron_in2out(next_nid, next_cid, log, rng);
        } else if happens(rng, params.add_node_prob) {
            self.net.add_neuron(next_nid, next_cid, log, rng);
        } else if happens(rng, params.add_conn_prob) {
            self.net.add_connection(next_cid, log, rng);
        } else {
            self.net.mutate_weights(params, rng);
            self.net.mutate_lambda(params, rng);
        }
    }

    /// Distance to another organism; different network templates are
    /// pushed past the speciation threshold so they never share a species.
    pub fn compat_distance(&self, other: &Organism, params: &Params) -> f64 {
        if self.net.hidden_model != other.net.hidden_model
            || self.net.output_model != other.net.output_model
        {
            return params.compat_threshold + 1.0;
        }
        self.net.compat_distance(&other.net, params)
    }

    /// Blend the father's shared genes into this organism, which was
    /// duplicated from the mother beforehand.
    pub fn crossover(&mut self, dad: &Organism, rng: &mut impl RngCore) -> Result<()> {
        self.net.crossover_with(&dad.net, rng)
    }

    pub fn randomize_weights(&mut self, rng: &mut impl RngCore) {
        for c in &mut self.net.connections {
            c.weight = rand_weight(rng);
        }
    }

    pub fn randomize_plastic_terms(&mut self, rng: &mut impl RngCore) {
        for c in &mut self.net.connections {
            c.plastic.corr = rand_plastic_term(rng);
            c.plastic.mag = rand_plastic_term(rng);
        }
    }

    /// Flag a winner when the raw fitness reaches `threshold`.
    pub fn mark_winner(&mut self, threshold: f64) -> bool {
        if self.fitness >= threshold {
            self.winner = true;
        }
        self.winner
    }
}

impl core::fmt::Display for Organism {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "org #{} (gen {}): fit = {} winner = {}",
            self.id(),
            self.gen,
            self.fitness,
            self.winner
        )
    }
}
