//! Neuron models: rate-coded sensor and sigmoid units, spiking Izhikevich
//! and leaky integrate-and-fire units.
//!
//! Rate units produce their activation in a single [`Neuron::step`] per
//! time slot. Spiking units are stepped [`params::TIMESTEP`] times per slot
//! and keep their recent spikes in a fixed-width train; their rate output
//! adds the unspiked fraction of the membrane potential so a silent slot
//! still carries gradient.

use crate::{params, NeuronId};
use serde::{Deserialize, Serialize};

/// Activation order of the output layer; hidden neurons count 1.. and
/// inputs are 0.
pub const OUTPUT_SEQ: usize = usize::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Layer {
    Input,
    Hidden,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Regular,
    /// The last input neuron; its outgoing connections to outputs stay
    /// disabled through evolution
    Bias,
}

/// Which dynamics a neuron runs, without its state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Model {
    Sensor,
    Sigmoid,
    Izhikevich,
    Lif,
}

impl Model {
    pub fn is_spiking(self) -> bool {
        matches!(self, Model::Izhikevich | Model::Lif)
    }
}

/// Recent spike history of one spiking neuron, newest spike in bit 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SpikeTrain {
    mask: u64,
    spike: bool,
}

const TRAIN_MASK: u64 = (1u64 << params::TIMESTEP) - 1;

impl SpikeTrain {
    /// Shift the window by one micro-step and record whether it fired.
    pub fn push(&mut self, fired: bool) {
        self.mask = ((self.mask << 1) | fired as u64) & TRAIN_MASK;
        self.spike = fired;
    }

    /// Spikes within the window.
    pub fn count(&self) -> usize {
        self.mask.count_ones() as usize
    }

    /// Whether the most recent micro-step fired.
    pub fn last(&self) -> bool {
        self.spike
    }

    pub fn clear(&mut self) {
        self.mask = 0;
        self.spike = false;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sigmoid {
    pub lambda: f64,
    pub input: f64,
    pub output: f64,
}

impl Sigmoid {
    fn new() -> Self {
        Self {
            lambda: params::SIGM_LAMBDA,
            input: 0.0,
            output: 0.0,
        }
    }

    fn activate(&mut self) {
        self.output = 1.0 / (1.0 + (-self.input * self.lambda).exp());
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Izhikevich {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub thresh: f64,
    pub v: f64,
    pub u: f64,
    pub current: f64,
    pub train: SpikeTrain,
}

impl Izhikevich {
    fn new() -> Self {
        Self {
            a: params::IZHI_A,
            b: params::IZHI_B,
            c: params::IZHI_C,
            d: params::IZHI_D,
            thresh: params::IZHI_THRESH,
            v: params::IZHI_C,
            u: params::IZHI_B * params::IZHI_C,
            current: 0.0,
            train: SpikeTrain::default(),
        }
    }

    fn step(&mut self) {
        let dv = 0.04 * self.v * self.v + 5.0 * self.v + 140.0 - self.u + self.current;
        let du = self.a * (self.b * self.v - self.u);
        self.v += dv;
        self.u += du;

        let fired = self.v >= self.thresh;
        if fired {
            self.v = self.c;
            self.u += self.d;
        }
        self.train.push(fired);
    }

    fn unspiked_potential(&self) -> f64 {
        (self.v - self.c) / (self.thresh - self.c)
    }

    fn reset(&mut self) {
        self.v = self.c;
        self.u = self.b * self.c;
        self.current = 0.0;
        self.train.clear();
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lif {
    pub v_rest: f64,
    pub tau: f64,
    pub r: f64,
    pub thresh: f64,
    pub v: f64,
    pub current: f64,
    pub train: SpikeTrain,
}

impl Lif {
    fn new() -> Self {
        Self {
            v_rest: params::LIF_VREST,
            tau: params::LIF_TAU,
            r: params::LIF_R,
            thresh: params::LIF_VTH,
            v: params::LIF_VREST,
            current: 0.0,
            train: SpikeTrain::default(),
        }
    }

    fn step(&mut self) {
        let dv = (self.r * self.current - self.v + self.v_rest) / self.tau;
        self.v += dv;

        let fired = self.v >= self.thresh;
        if fired {
            self.v = self.v_rest;
        }
        self.train.push(fired);
    }

    fn unspiked_potential(&self) -> f64 {
        (self.v - self.v_rest) / (self.thresh - self.v_rest)
    }

    fn reset(&mut self) {
        self.v = self.v_rest;
        self.current = 0.0;
        self.train.clear();
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NeuronKind {
    /// Linear unit clamped to [-1, 1]; doubles as the input sensor
    Sensor { value: f64 },
    Sigmoid(Sigmoid),
    Izhikevich(Izhikevich),
    Lif(Lif),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neuron {
    pub id: NeuronId,
    /// Activation order within the network
    pub seq: usize,
    pub layer: Layer,
    pub role: Role,
    pub kind: NeuronKind,
}

impl Neuron {
    pub fn new(model: Model, id: NeuronId, layer: Layer) -> Self {
        let kind = match model {
            Model::Sensor => NeuronKind::Sensor { value: 0.0 },
            Model::Sigmoid => NeuronKind::Sigmoid(Sigmoid::new()),
            Model::Izhikevich => NeuronKind::Izhikevich(Izhikevich::new()),
            Model::Lif => NeuronKind::Lif(Lif::new()),
        };
        let seq = match layer {
            Layer::Input => 0,
            Layer::Hidden => id,
            Layer::Output => OUTPUT_SEQ,
        };
        Self {
            id,
            seq,
            layer,
            role: Role::Regular,
            kind,
        }
    }

    pub fn model(&self) -> Model {
        match self.kind {
            NeuronKind::Sensor { .. } => Model::Sensor,
            NeuronKind::Sigmoid(_) => Model::Sigmoid,
            NeuronKind::Izhikevich(_) => Model::Izhikevich,
            NeuronKind::Lif(_) => Model::Lif,
        }
    }

    pub fn is_spiking(&self) -> bool {
        self.model().is_spiking()
    }

    pub fn is_bias(&self) -> bool {
        self.role == Role::Bias
    }

    /// Load the input accumulator, from an external sample or a summed
    /// synaptic current. Sensors rectify on load.
    pub fn load(&mut self, x: f64) {
        match &mut self.kind {
            NeuronKind::Sensor { value } => *value = x.clamp(-1.0, 1.0),
            NeuronKind::Sigmoid(s) => s.input = x,
            NeuronKind::Izhikevich(n) => n.current = x,
            NeuronKind::Lif(n) => n.current = x,
        }
    }

    /// One step of internal dynamics: a full activation for rate units,
    /// one integration micro-step for spiking units.
    pub fn step(&mut self) {
        match &mut self.kind {
            NeuronKind::Sensor { .. } => {}
            NeuronKind::Sigmoid(s) => s.activate(),
            NeuronKind::Izhikevich(n) => n.step(),
            NeuronKind::Lif(n) => n.step(),
        }
    }

    /// Current output: the activation for rate units, the firing rate with
    /// the unspiked remainder for spiking units.
    pub fn output(&self) -> f64 {
        match &self.kind {
            NeuronKind::Sensor { value } => *value,
            NeuronKind::Sigmoid(s) => s.output,
            NeuronKind::Izhikevich(n) => {
                (n.train.count() as f64 + n.unspiked_potential()) / params::TIMESTEP as f64
            }
            NeuronKind::Lif(n) => {
                (n.train.count() as f64 + n.unspiked_potential()) / params::TIMESTEP as f64
            }
        }
    }

    /// Whether the most recent micro-step fired. Always false for rate units.
    pub fn spiked(&self) -> bool {
        match &self.kind {
            NeuronKind::Izhikevich(n) => n.train.last(),
            NeuronKind::Lif(n) => n.train.last(),
            _ => false,
        }
    }

    pub fn lambda(&self) -> Option<f64> {
        match &self.kind {
            NeuronKind::Sigmoid(s) => Some(s.lambda),
            _ => None,
        }
    }

    pub fn lambda_mut(&mut self) -> Option<&mut f64> {
        match &mut self.kind {
            NeuronKind::Sigmoid(s) => Some(&mut s.lambda),
            _ => None,
        }
    }

    /// Drop all activation state back to rest.
    pub fn reset_dynamics(&mut self) {
        match &mut self.kind {
            NeuronKind::Sensor { value } => *value = 0.0,
            NeuronKind::Sigmoid(s) => {
                s.input = 0.0;
                s.output = 0.0;
            }
            NeuronKind::Izhikevich(n) => n.reset(),
            NeuronKind::Lif(n) => n.reset(),
        }
    }

    /// Structural copy with fresh dynamics, the way offspring inherit
    /// neurons.
    pub fn duplicate(&self) -> Self {
        let mut n = self.clone();
        n.reset_dynamics();
        n
    }
}

impl core::fmt::Display for Neuron {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let seq = if self.seq == OUTPUT_SEQ {
            "out".to_string()
        } else {
            self.seq.to_string()
        };
        match &self.kind {
            NeuronKind::Sensor { .. } => write!(f, "sensor #{} seq {seq}", self.id),
            NeuronKind::Sigmoid(s) => {
                write!(f, "sigmoid #{} seq {seq} lambda {}", self.id, s.lambda)
            }
            NeuronKind::Izhikevich(n) => write!(
                f,
                "izhikevich #{} seq {seq} {} {} {} {}",
                self.id, n.a, n.b, n.c, n.d
            ),
            NeuronKind::Lif(n) => write!(
                f,
                "lif #{} seq {seq} {} {} {}",
                self.id, n.v_rest, n.tau, n.r
            ),
        }
    }
}
