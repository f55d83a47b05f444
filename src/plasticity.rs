//! Evolvable Hebbian plasticity carried by every connection.
//!
//! A connection owns two real-valued plastic terms which are themselves
//! mutation targets during the plasticity phase of a run. The rate-based
//! rule mixes a fixed learning window with the evolved terms; the window
//! amplitudes and time constants live in [`crate::params`].

use crate::params;
use serde::{Deserialize, Serialize};

/// Which learning rule a connection applies after transmission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HebbRule {
    /// Weight is only changed by mutation
    Fixed,
    /// Rate-based Hebbian update from pre/post firing rates
    Rate,
    /// Spike-timing-dependent rule, reserved
    SpikeStdp,
}

/// Both terms live in [-1, 1].
pub const PLASTIC_TERM_BOUND: f64 = 1.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HebbPlasticity {
    pub mag: f64,
    pub corr: f64,
}

impl HebbPlasticity {
    pub fn new(mag: f64, corr: f64) -> Self {
        let mut h = Self { mag, corr };
        h.cap();
        h
    }

    /// Clamp both terms back into their bounds.
    pub fn cap(&mut self) {
        self.mag = self.mag.clamp(-PLASTIC_TERM_BOUND, PLASTIC_TERM_BOUND);
        self.corr = self.corr.clamp(-PLASTIC_TERM_BOUND, PLASTIC_TERM_BOUND);
    }

    /// Weight change of the rate-based rule for one slot.
    ///
    /// `pre` and `post` are the firing rates (or activations) of the
    /// connection's endpoints; `eta` is the process learning rate.
    pub fn rate_dw(&self, pre: f64, post: f64, eta: f64) -> f64 {
        let neg = 0.005 * self.mag * (pre - post + self.corr) + params::HEBB_AM;
        eta * post
            * (params::HEBB_AP / (params::HEBB_INV_TAU_P + post)
                + neg / (params::HEBB_INV_TAU_M + post))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::assert_f64_approx;

    #[test]
    fn test_cap_clamps_both_terms() {
        let mut h = HebbPlasticity {
            mag: 3.5,
            corr: -1.2,
        };
        h.cap();
        assert_f64_approx!(h.mag, 1.0);
        assert_f64_approx!(h.corr, -1.0);
    }

    #[test]
    fn test_new_caps_on_construction() {
        let h = HebbPlasticity::new(-9.0, 0.25);
        assert_f64_approx!(h.mag, -1.0);
        assert_f64_approx!(h.corr, 0.25);
    }

    #[test]
    fn test_silent_post_means_no_change() {
        let h = HebbPlasticity::new(0.4, -0.1);
        assert_f64_approx!(h.rate_dw(0.9, 0.0, 1.0), 0.0);
    }

    #[test]
    fn test_dw_scales_with_eta() {
        let h = HebbPlasticity::new(0.4, -0.1);
        let one = h.rate_dw(0.3, 0.6, 1.0);
        let half = h.rate_dw(0.3, 0.6, 0.5);
        assert_f64_approx!(one * 0.5, half);
    }

    #[test]
    fn test_dw_matches_window_formula() {
        let h = HebbPlasticity::new(0.5, 0.2);
        let (pre, post) = (0.8, 0.4);
        let neg = 0.005 * 0.5 * (pre - post + 0.2) + params::HEBB_AM;
        let want = post
            * (params::HEBB_AP / (params::HEBB_INV_TAU_P + post)
                + neg / (params::HEBB_INV_TAU_M + post));
        assert_f64_approx!(h.rate_dw(pre, post, 1.0), want);
    }
}
