//! Randomness plumbing.
//!
//! Every operation that rolls dice takes `&mut impl RngCore`, so a run is
//! reproducible exactly when its caller pins one seeded generator and
//! threads it through. [`WyRng`] is the house generator (a wyrand step,
//! cheap and reseedable); [`default_rng`] seeds one from `/dev/urandom`.

use crate::params;
use core::cmp::min;
use rand::{Rng, RngCore};
use rand_distr::{Distribution, Normal};
use std::{
    fs::File,
    io::{self, Read},
};

pub struct WyRng {
    state: u64,
}

impl WyRng {
    pub fn seeded(state: u64) -> Self {
        Self { state }
    }
}

impl RngCore for WyRng {
    fn next_u32(&mut self) -> u32 {
        self.next_u64() as u32
    }

    fn next_u64(&mut self) -> u64 {
        const WY_CONST_0: u64 = 0x2d35_8dcc_aa6c_78a5;
        const WY_CONST_1: u64 = 0x8bb8_4b93_962e_acc9;
        self.state = self.state.wrapping_add(WY_CONST_0);
        let t = u128::from(self.state) * u128::from(self.state ^ WY_CONST_1);
        (t as u64) ^ (t >> 64) as u64
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        let mut idx = 0;
        while idx < dst.len() {
            let lim = min(8, dst.len() - idx);
            dst[idx..idx + lim].copy_from_slice(&self.next_u64().to_ne_bytes()[..lim]);
            idx += lim;
        }
    }
}

pub fn seed_urandom() -> io::Result<u64> {
    let mut file = File::open("/dev/urandom")?;
    let mut buffer = [0u8; 8];
    file.read_exact(&mut buffer)?;
    Ok(u64::from_le_bytes(buffer))
}

pub fn default_rng() -> WyRng {
    WyRng::seeded(seed_urandom().unwrap_or(0x5eed))
}

/// Roll once against a probability in [0, 1].
pub fn happens(rng: &mut impl RngCore, p: f64) -> bool {
    rng.random::<f64>() < p
}

/// Uniform weight in [-MAX_WEIGHT, MAX_WEIGHT].
pub fn rand_weight(rng: &mut impl RngCore) -> f64 {
    rng.random_range(-params::MAX_WEIGHT..=params::MAX_WEIGHT)
}

/// Uniform sigmoid slope in [MIN_LAMBDA, MAX_LAMBDA].
pub fn rand_lambda(rng: &mut impl RngCore) -> f64 {
    rng.random_range(params::MIN_LAMBDA..=params::MAX_LAMBDA)
}

/// Uniform synaptic delay in [1, MAX_DELAY].
pub fn rand_delay(rng: &mut impl RngCore) -> usize {
    rng.random_range(1..=params::MAX_DELAY)
}

/// Uniform plastic term in [-1, 1].
pub fn rand_plastic_term(rng: &mut impl RngCore) -> f64 {
    rng.random_range(-1.0..=1.0)
}

/// Gaussian creep step with the given deviation.
pub fn creep(rng: &mut impl RngCore, dev: f64) -> f64 {
    Normal::new(0.0, dev).unwrap().sample(rng)
}

/// Half-normal species rank in [0, 1]; biased toward 0 so fitter species
/// are picked more often for interspecies mating.
pub fn species_rank(rng: &mut impl RngCore) -> f64 {
    let r = creep(rng, 0.35).abs();
    if r > 1.0 {
        1.0
    } else {
        r
    }
}
