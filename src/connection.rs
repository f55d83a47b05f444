//! Weighted, delay-buffered synaptic links.
//!
//! A connection addresses its endpoint neurons by stable id and buffers the
//! source's recent outputs in a FIFO of length `delay`; reading returns the
//! oldest buffered sample, which realises a fixed synaptic delay. Spike-kind
//! connections scale transmitted current by [`params::CURRENT_FACTOR`].

use crate::{
    params,
    plasticity::{HebbPlasticity, HebbRule},
    ConnId, NeuronId,
};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnKind {
    Regular,
    /// Targets a spiking neuron; carries spikes and the current factor
    Spike,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Connection {
    pub id: ConnId,
    pub source: NeuronId,
    pub target: NeuronId,
    pub weight: f64,
    pub delay: usize,
    pub enabled: bool,
    pub kind: ConnKind,
    pub hebb: HebbRule,
    pub plastic: HebbPlasticity,
    #[serde(skip)]
    weight_pre: f64,
    #[serde(skip)]
    receptor: VecDeque<f64>,
}

impl Connection {
    pub fn new(id: ConnId, source: NeuronId, target: NeuronId, kind: ConnKind) -> Self {
        Self {
            id,
            source,
            target,
            weight: 0.0,
            delay: params::NO_DELAY,
            enabled: true,
            kind,
            hebb: HebbRule::Fixed,
            plastic: HebbPlasticity::default(),
            weight_pre: 0.0,
            receptor: VecDeque::new(),
        }
    }

    /// Current scaling for this edge kind.
    pub fn current_factor(&self) -> f64 {
        match self.kind {
            ConnKind::Regular => 1.0,
            ConnKind::Spike => params::CURRENT_FACTOR,
        }
    }

    /// Buffer one source output, discarding samples older than `delay`.
    pub fn push_receptor(&mut self, r: f64) {
        self.receptor.push_front(r);
        while self.receptor.len() > self.delay {
            self.receptor.pop_back();
        }
    }

    /// The fully delayed sample, 0 while the buffer warms up.
    pub fn delayed(&self) -> f64 {
        self.receptor.back().copied().unwrap_or(0.0)
    }

    pub fn clear_receptor(&mut self) {
        self.receptor.clear();
    }

    pub fn cap_weight(&mut self) {
        self.weight = self.weight.clamp(-params::MAX_WEIGHT, params::MAX_WEIGHT);
    }

    /// Apply this connection's learning rule for one slot. `pre` and `post`
    /// are endpoint rates, already remapped by the caller where the target
    /// is a linear unit.
    pub fn apply_hebbian(&mut self, pre: f64, post: f64, eta: f64) {
        match self.hebb {
            HebbRule::Rate => {
                self.weight += self.plastic.rate_dw(pre, post, eta);
                self.cap_weight();
            }
            // spike-timing rule reserved
            HebbRule::SpikeStdp | HebbRule::Fixed => {}
        }
    }

    /// Snapshot the weight before a Hebbian development episode.
    pub fn backup_weight(&mut self) {
        self.weight_pre = self.weight;
    }

    /// Restore the snapshot taken by [`Connection::backup_weight`].
    pub fn restore_weight(&mut self) {
        self.weight = self.weight_pre;
    }

    /// Copy with an empty receptor, the way offspring inherit edges.
    pub fn duplicate(&self) -> Self {
        let mut c = self.clone();
        c.weight_pre = c.weight;
        c.receptor.clear();
        c
    }
}

impl core::fmt::Display for Connection {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "conn #{} {} -> {} w {:.4} d {} {} hebb {:?} mag {:.3} corr {:.3}",
            self.id,
            self.source,
            self.target,
            self.weight,
            self.delay,
            if self.enabled { "on" } else { "off" },
            self.hebb,
            self.plastic.mag,
            self.plastic.corr
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::assert_f64_approx;

    #[test]
    fn test_unit_delay_passes_latest_sample() {
        let mut c = Connection::new(0, 0, 1, ConnKind::Regular);
        assert_f64_approx!(c.delayed(), 0.0);
        c.push_receptor(0.4);
        assert_f64_approx!(c.delayed(), 0.4);
        c.push_receptor(-0.9);
        assert_f64_approx!(c.delayed(), -0.9);
    }

    #[test]
    fn test_longer_delay_returns_oldest() {
        let mut c = Connection::new(0, 0, 1, ConnKind::Regular);
        c.delay = 3;
        for v in [1.0, 2.0, 3.0, 4.0] {
            c.push_receptor(v);
        }
        assert_f64_approx!(c.delayed(), 2.0);
        c.push_receptor(5.0);
        assert_f64_approx!(c.delayed(), 3.0);
    }

    #[test]
    fn test_cap_weight() {
        let mut c = Connection::new(0, 0, 1, ConnKind::Regular);
        c.weight = 4.2;
        c.cap_weight();
        assert_f64_approx!(c.weight, params::MAX_WEIGHT);
        c.weight = -1.5;
        c.cap_weight();
        assert_f64_approx!(c.weight, -params::MAX_WEIGHT);
    }

    #[test]
    fn test_spike_kind_scales_current() {
        let c = Connection::new(0, 0, 1, ConnKind::Spike);
        assert_f64_approx!(c.current_factor(), params::CURRENT_FACTOR);
        let c = Connection::new(0, 0, 1, ConnKind::Regular);
        assert_f64_approx!(c.current_factor(), 1.0);
    }

    #[test]
    fn test_hebbian_only_applies_to_rate_rule() {
        let mut c = Connection::new(0, 0, 1, ConnKind::Regular);
        c.plastic = HebbPlasticity::new(0.5, 0.1);

        c.apply_hebbian(0.8, 0.6, 1.0);
        assert_f64_approx!(c.weight, 0.0, "fixed rule must not learn");

        c.hebb = HebbRule::Rate;
        c.apply_hebbian(0.8, 0.6, 1.0);
        assert!(c.weight != 0.0);
        assert!(c.weight.abs() <= params::MAX_WEIGHT);
    }

    #[test]
    fn test_backup_restore_weight() {
        let mut c = Connection::new(0, 0, 1, ConnKind::Regular);
        c.weight = 0.7;
        c.backup_weight();
        c.weight = -0.2;
        c.restore_weight();
        assert_f64_approx!(c.weight, 0.7);
    }

    #[test]
    fn test_duplicate_clears_receptor() {
        let mut c = Connection::new(0, 0, 1, ConnKind::Regular);
        c.push_receptor(0.5);
        let d = c.duplicate();
        assert_f64_approx!(d.delayed(), 0.0);
        assert_eq!(d.id, c.id);
    }
}
