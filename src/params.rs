//! Model constants and run-time evolution parameters.
//!
//! Constants that define the neuron models themselves live here as plain
//! `const`s; everything a caller may want to tune per run is a field of
//! [`Params`], whose `Default` is the canonical configuration.

use serde::{Deserialize, Serialize};

// ============================================================================
// Simulation
// ============================================================================

/// Integration micro-steps per network time slot for spiking layers
pub const TIMESTEP: usize = 50;

/// Current scaling applied on spike-kind connections
pub const CURRENT_FACTOR: f64 = 50.0;

/// Weight bound, connections are clamped to [-MAX_WEIGHT, MAX_WEIGHT]
pub const MAX_WEIGHT: f64 = 1.0;

/// Sigmoid slope bounds
pub const MAX_LAMBDA: f64 = 6.0;
pub const MIN_LAMBDA: f64 = 1.0;

/// Default sigmoid slope for fresh neurons
pub const SIGM_LAMBDA: f64 = 2.0;

/// Synaptic delay bounds, in slots
pub const MAX_DELAY: usize = 1;
pub const NO_DELAY: usize = 1;

// ============================================================================
// Izhikevich model defaults
// ============================================================================

pub const IZHI_A: f64 = 0.02;
pub const IZHI_B: f64 = 0.2;
pub const IZHI_C: f64 = -50.0;
pub const IZHI_D: f64 = 2.0;
pub const IZHI_THRESH: f64 = 30.0;

// ============================================================================
// Leaky integrate-and-fire defaults
// ============================================================================

pub const LIF_VTH: f64 = -50.0;
pub const LIF_VREST: f64 = -65.0;
pub const LIF_TAU: f64 = 2.0;
pub const LIF_R: f64 = 1.0;

// ============================================================================
// Hebbian window
// ============================================================================

/// Amplitude of the pre-post and post-pre parts of the learning window
pub const HEBB_AP: f64 = 0.1;
pub const HEBB_AM: f64 = -0.1;

/// Decay time constants of the window
pub const HEBB_TAU_P: f64 = 0.02;
pub const HEBB_TAU_M: f64 = 0.02;
pub const HEBB_INV_TAU_P: f64 = 1.0 / HEBB_TAU_P;
pub const HEBB_INV_TAU_M: f64 = 1.0 / HEBB_TAU_M;

/// Raw fitness at which an organism counts as a winner
pub const STD_FIT: f64 = 0.98;

// ============================================================================
// Run-time parameters
// ============================================================================

/// Tunable knobs of a single evolutionary run.
///
/// `Params::default()` is the reference configuration; override individual
/// fields with struct-update syntax when a task needs different pressure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Params {
    /// Organism count held constant across epochs
    pub pop_size: usize,
    /// Time slots per evaluation episode
    pub episode: usize,
    /// Progress-print period for the [`crate::scenario`] driver, in generations
    pub print_every: usize,

    /// Compatibility distance under which two organisms share a species
    pub compat_threshold: f64,
    pub disjoint_coeff: f64,
    pub excess_coeff: f64,
    pub weightdiff_coeff: f64,
    pub delaydiff_coeff: f64,
    pub lambdadiff_coeff: f64,

    /// Fraction of each species kept alive for reproduction
    pub survival_thresh: f64,
    /// Generations without improvement before the stagnation penalty
    pub dropoff_age: usize,
    /// Generations without a new population record before the rescue kicks in
    pub stagnant_gen: usize,

    /// Probability of reproducing by mutation alone rather than crossover
    pub mutate_only_prob: f64,
    /// Probability of picking the crossover father from the mother's species
    pub mate_within_species_rate: f64,

    pub add_conn_prob: f64,
    pub add_node_prob: f64,
    /// Probability of inserting a fully connected input-to-output neuron
    pub add_ff_node_prob: f64,

    pub mutate_weight_prob: f64,
    pub mutate_lambda_prob: f64,
    /// Probability that a parameter mutation creeps instead of resetting
    pub creep_mutate_prob: f64,
    pub mutate_weight_min: f64,
    pub mutate_lambda_min: f64,

    pub mutate_plasticity_prob: f64,
    pub plasticity_creep_mutate_prob: f64,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            pop_size: 150,
            episode: 50,
            print_every: 5,

            compat_threshold: 3.0,
            disjoint_coeff: 1.0,
            excess_coeff: 1.0,
            weightdiff_coeff: 0.4,
            delaydiff_coeff: 0.1,
            lambdadiff_coeff: 0.1,

            survival_thresh: 0.2,
            dropoff_age: 15,
            stagnant_gen: 12,

            mutate_only_prob: 0.5,
            mate_within_species_rate: 0.8,

            add_conn_prob: 0.02,
            add_node_prob: 0.01,
            add_ff_node_prob: 0.005,

            mutate_weight_prob: 0.8,
            mutate_lambda_prob: 0.8,
            creep_mutate_prob: 0.9,
            mutate_weight_min: 0.01,
            mutate_lambda_min: 0.05,

            mutate_plasticity_prob: 0.8,
            plasticity_creep_mutate_prob: 0.9,
        }
    }
}
