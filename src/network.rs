//! Three-layer heterogeneous networks and their slot execution.
//!
//! A network owns its neurons in three layer vectors (hidden in activation
//! order) and an id-sorted connection list; connections address neurons by
//! stable id, so nothing has to be re-linked after mutation or
//! deserialisation. Execution of one time slot forks on the layer models:
//! rate layers activate once per slot in `seq` order, spiking layers run
//! [`params::TIMESTEP`] integration micro-steps, and hybrid networks bridge
//! the two by transmitting firing rates into their rate-coded outputs.

use crate::{
    connection::{ConnKind, Connection},
    error::{Error, Result},
    neuron::{Layer, Model, Neuron, Role},
    params,
    plasticity::{HebbPlasticity, HebbRule},
    NetId, NeuronId,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Network {
    pub id: NetId,
    pub hidden_model: Model,
    pub output_model: Model,
    pub inputs: Vec<Neuron>,
    /// Hidden neurons in activation order; `seq` runs 1..=len
    pub hidden: Vec<Neuron>,
    pub outputs: Vec<Neuron>,
    /// Ascending by connection id at all times
    pub connections: Vec<Connection>,
    /// Hebbian learning rate applied by plastic connections
    pub eta: f64,
    #[serde(skip)]
    outputs_buf: Vec<f64>,
}

impl Network {
    /// Build a fully connected three-layer network. The last input neuron
    /// is the bias; its connections to the output layer are created
    /// disabled and are kept that way through evolution.
    pub fn new(
        id: NetId,
        in_num: usize,
        hid_num: usize,
        out_num: usize,
        hidden_model: Model,
        output_model: Model,
    ) -> Self {
        let mut inputs = Vec::with_capacity(in_num);
        for i in 0..in_num {
            inputs.push(Neuron::new(Model::Sensor, i, Layer::Input));
        }
        if let Some(last) = inputs.last_mut() {
            last.role = Role::Bias;
        }

        let mut hidden = Vec::with_capacity(hid_num);
        for i in 0..hid_num {
            let mut n = Neuron::new(hidden_model, in_num + i, Layer::Hidden);
            n.seq = i + 1;
            hidden.push(n);
        }

        let mut outputs = Vec::with_capacity(out_num);
        for i in 0..out_num {
            outputs.push(Neuron::new(output_model, in_num + hid_num + i, Layer::Output));
        }

        let hid_kind = if hidden_model.is_spiking() {
            ConnKind::Spike
        } else {
            ConnKind::Regular
        };
        let out_kind = if output_model.is_spiking() {
            ConnKind::Spike
        } else {
            ConnKind::Regular
        };

        let mut connections = Vec::new();
        let mut cid = 0;
        if hid_num == 0 {
            for innode in &inputs {
                for outnode in &outputs {
                    let mut c = Connection::new(cid, innode.id, outnode.id, out_kind);
                    c.enabled = innode.role != Role::Bias;
                    connections.push(c);
                    cid += 1;
                }
            }
        } else {
            for innode in &inputs {
                for hidnode in &hidden {
                    connections.push(Connection::new(cid, innode.id, hidnode.id, hid_kind));
                    cid += 1;
                }
            }
            for hidnode in &hidden {
                for outnode in &outputs {
                    connections.push(Connection::new(cid, hidnode.id, outnode.id, out_kind));
                    cid += 1;
                }
            }
            if let Some(bias) = inputs.last() {
                for outnode in &outputs {
                    let mut c = Connection::new(cid, bias.id, outnode.id, out_kind);
                    c.enabled = false;
                    connections.push(c);
                    cid += 1;
                }
            }
        }

        Self {
            id,
            hidden_model,
            output_model,
            inputs,
            hidden,
            outputs,
            connections,
            eta: 1.0,
            outputs_buf: Vec::new(),
        }
    }

    pub fn sigmoid(id: NetId, i: usize, h: usize, o: usize) -> Self {
        Self::new(id, i, h, o, Model::Sigmoid, Model::Sigmoid)
    }

    pub fn linear(id: NetId, i: usize, h: usize, o: usize) -> Self {
        Self::new(id, i, h, o, Model::Sigmoid, Model::Sensor)
    }

    pub fn izhikevich(id: NetId, i: usize, h: usize, o: usize) -> Self {
        Self::new(id, i, h, o, Model::Izhikevich, Model::Izhikevich)
    }

    pub fn lif(id: NetId, i: usize, h: usize, o: usize) -> Self {
        Self::new(id, i, h, o, Model::Lif, Model::Lif)
    }

    pub fn hybrid(id: NetId, i: usize, h: usize, o: usize) -> Self {
        Self::new(id, i, h, o, Model::Izhikevich, Model::Sigmoid)
    }

    pub fn hybrid_linear(id: NetId, i: usize, h: usize, o: usize) -> Self {
        Self::new(id, i, h, o, Model::Izhikevich, Model::Sensor)
    }

    // ------------------------------------------------------------------
    // lookup
    // ------------------------------------------------------------------

    pub fn neurons(&self) -> impl Iterator<Item = &Neuron> {
        self.inputs
            .iter()
            .chain(self.hidden.iter())
            .chain(self.outputs.iter())
    }

    pub fn neurons_mut(&mut self) -> impl Iterator<Item = &mut Neuron> {
        self.inputs
            .iter_mut()
            .chain(self.hidden.iter_mut())
            .chain(self.outputs.iter_mut())
    }

    pub fn neuron(&self, id: NeuronId) -> Option<&Neuron> {
        self.neurons().find(|n| n.id == id)
    }

    pub fn neuron_count(&self) -> usize {
        self.inputs.len() + self.hidden.len() + self.outputs.len()
    }

    pub fn max_neuron_id(&self) -> NeuronId {
        self.neurons().map(|n| n.id).max().unwrap_or(0)
    }

    pub fn next_neuron_id(&self) -> NeuronId {
        self.max_neuron_id() + 1
    }

    pub fn next_conn_id(&self) -> crate::ConnId {
        self.connections.iter().map(|c| c.id).max().map_or(0, |m| m + 1)
    }

    pub fn connection_exists(&self, source: NeuronId, target: NeuronId) -> bool {
        self.connections
            .iter()
            .any(|c| c.source == source && c.target == target)
    }

    /// Insert keeping the list ascending by id.
    pub(crate) fn insert_connection(&mut self, conn: Connection) {
        let pos = self.connections.partition_point(|c| c.id < conn.id);
        self.connections.insert(pos, conn);
    }

    /// Renumber hidden `seq` contiguously from 1 in list order.
    pub(crate) fn assign_hidden_seq(&mut self) {
        for (i, n) in self.hidden.iter_mut().enumerate() {
            n.seq = i + 1;
        }
    }

    // ------------------------------------------------------------------
    // execution
    // ------------------------------------------------------------------

    /// Load one external sample per input neuron.
    pub fn load_inputs(&mut self, values: &[f64]) -> Result<()> {
        if values.len() != self.inputs.len() {
            return Err(Error::shape_mismatch(format!(
                "{} samples for {} input neurons of net #{}",
                values.len(),
                self.inputs.len(),
                self.id
            )));
        }
        for (n, v) in self.inputs.iter_mut().zip(values) {
            n.load(*v);
        }
        Ok(())
    }

    /// Execute one time slot and return the output vector.
    pub fn run(&mut self) -> &[f64] {
        match (
            self.hidden_model.is_spiking(),
            self.output_model.is_spiking(),
        ) {
            (false, false) => self.run_rate(),
            (true, true) => self.run_spiking(),
            (true, false) => self.run_hybrid(),
            // no standard template pairs a rate hidden layer with spiking
            // outputs; a plain rate pass keeps the combination defined
            (false, true) => self.run_rate(),
        }
        &self.outputs_buf
    }

    pub fn output_values(&self) -> &[f64] {
        &self.outputs_buf
    }

    /// Drop all activation state: neuron dynamics and delay buffers.
    pub fn flush(&mut self) {
        for n in self.neurons_mut() {
            n.reset_dynamics();
        }
        for c in &mut self.connections {
            c.clear_receptor();
        }
        self.outputs_buf.clear();
    }

    fn run_rate(&mut self) {
        for p in 0..self.inputs.len() {
            self.forward_input(p);
        }
        for p in 0..self.hidden.len() {
            self.forward_rate(Layer::Hidden, p);
        }
        for p in 0..self.outputs.len() {
            self.forward_rate(Layer::Output, p);
        }
        self.collect_outputs(false);
    }

    fn run_spiking(&mut self) {
        for p in 0..self.inputs.len() {
            self.forward_input(p);
        }
        for _ in 0..params::TIMESTEP {
            for p in 0..self.hidden.len() {
                self.forward_spiking(Layer::Hidden, p);
            }
            for p in 0..self.outputs.len() {
                self.forward_spiking(Layer::Output, p);
            }
        }
        // integrate-and-fire outputs report the raw slot-end spike
        self.collect_outputs(self.output_model == Model::Lif);
    }

    fn run_hybrid(&mut self) {
        for p in 0..self.inputs.len() {
            self.forward_input(p);
        }
        if !self.hidden.is_empty() {
            for _ in 0..params::TIMESTEP {
                for p in 0..self.hidden.len() {
                    self.forward_spiking(Layer::Hidden, p);
                }
            }
            for p in 0..self.hidden.len() {
                let id = self.hidden[p].id;
                let rate = self.hidden[p].output();
                self.transmit(id, rate, Some(ConnKind::Regular));
                self.plasticify_incoming(id);
            }
        }
        for p in 0..self.outputs.len() {
            self.forward_rate(Layer::Output, p);
        }
        self.collect_outputs(false);
    }

    fn forward_input(&mut self, pos: usize) {
        let id = self.inputs[pos].id;
        let out = self.inputs[pos].output();
        self.transmit(id, out, None);
    }

    fn forward_rate(&mut self, layer: Layer, pos: usize) {
        let id = self.neuron_at(layer, pos).id;
        let sum = self.summed_input(id);
        let n = self.neuron_at_mut(layer, pos);
        n.load(sum);
        n.step();
        let out = n.output();
        self.transmit(id, out, None);
        self.plasticify_incoming(id);
    }

    fn forward_spiking(&mut self, layer: Layer, pos: usize) {
        let id = self.neuron_at(layer, pos).id;
        let sum = self.summed_input(id);
        let n = self.neuron_at_mut(layer, pos);
        n.load(sum);
        n.step();
        let spike = n.spiked();
        self.transmit(id, spike as u8 as f64, Some(ConnKind::Spike));
    }

    fn neuron_at(&self, layer: Layer, pos: usize) -> &Neuron {
        match layer {
            Layer::Input => &self.inputs[pos],
            Layer::Hidden => &self.hidden[pos],
            Layer::Output => &self.outputs[pos],
        }
    }

    fn neuron_at_mut(&mut self, layer: Layer, pos: usize) -> &mut Neuron {
        match layer {
            Layer::Input => &mut self.inputs[pos],
            Layer::Hidden => &mut self.hidden[pos],
            Layer::Output => &mut self.outputs[pos],
        }
    }

    /// Synaptic current arriving at `id` through enabled edges.
    fn summed_input(&self, id: NeuronId) -> f64 {
        self.connections
            .iter()
            .filter(|c| c.enabled && c.target == id)
            .map(|c| c.weight * c.delayed() * c.current_factor())
            .sum()
    }

    fn transmit(&mut self, id: NeuronId, value: f64, only: Option<ConnKind>) {
        for c in self.connections.iter_mut().filter(|c| c.source == id) {
            if only.map_or(true, |k| c.kind == k) {
                c.push_receptor(value);
            }
        }
    }

    fn output_of(&self, id: NeuronId) -> f64 {
        self.neuron(id).map_or(0.0, |n| n.output())
    }

    /// Hebbian pass over the edges arriving at `id`, after it transmitted.
    fn plasticify_incoming(&mut self, id: NeuronId) {
        let Some(post_neuron) = self.neuron(id) else {
            return;
        };
        let mut post = post_neuron.output();
        if post_neuron.model() == Model::Sensor {
            // linear units live in [-1, 1]; the rule wants a rate
            post = ((post + 1.0) / 2.0).clamp(0.0, 1.0);
        }
        let eta = self.eta;
        let updates: Vec<(usize, f64)> = self
            .connections
            .iter()
            .enumerate()
            .filter(|(_, c)| c.target == id && c.hebb == HebbRule::Rate)
            .map(|(i, c)| (i, self.output_of(c.source)))
            .collect();
        for (i, pre) in updates {
            self.connections[i].apply_hebbian(pre, post, eta);
        }
    }

    fn collect_outputs(&mut self, raw_spike: bool) {
        self.outputs_buf.clear();
        for n in &self.outputs {
            self.outputs_buf.push(if raw_spike {
                n.spiked() as u8 as f64
            } else {
                n.output()
            });
        }
    }

    // ------------------------------------------------------------------
    // bookkeeping used around evolution and Hebbian development
    // ------------------------------------------------------------------

    /// Structural copy under a new id, with all activation state fresh.
    pub fn duplicate(&self, id: NetId) -> Self {
        Self {
            id,
            hidden_model: self.hidden_model,
            output_model: self.output_model,
            inputs: self.inputs.iter().map(Neuron::duplicate).collect(),
            hidden: self.hidden.iter().map(Neuron::duplicate).collect(),
            outputs: self.outputs.iter().map(Neuron::duplicate).collect(),
            connections: self.connections.iter().map(Connection::duplicate).collect(),
            eta: self.eta,
            outputs_buf: Vec::new(),
        }
    }

    pub fn weights(&self) -> Vec<f64> {
        self.connections.iter().map(|c| c.weight).collect()
    }

    pub fn backup_weights(&mut self) {
        for c in &mut self.connections {
            c.backup_weight();
        }
    }

    pub fn restore_weights(&mut self) {
        for c in &mut self.connections {
            c.restore_weight();
        }
    }

    pub fn hebb_rules(&self) -> Vec<HebbRule> {
        self.connections.iter().map(|c| c.hebb).collect()
    }

    pub fn set_hebb_rule(&mut self, rule: HebbRule) {
        for c in &mut self.connections {
            c.hebb = rule;
        }
    }

    /// Same hidden count and identical connection id sequence.
    pub fn has_same_topology(&self, other: &Network) -> bool {
        self.hidden.len() == other.hidden.len()
            && self.connections.len() == other.connections.len()
            && self
                .connections
                .iter()
                .zip(&other.connections)
                .all(|(a, b)| a.id == b.id)
    }

    /// Copy the plastic terms and rules connection-by-connection from a
    /// topologically identical network. Returns false (and changes
    /// nothing) on a topology mismatch.
    pub fn adopt_plastic_rule(&mut self, other: &Network) -> bool {
        if !self.has_same_topology(other) {
            return false;
        }
        for (c, o) in self.connections.iter_mut().zip(&other.connections) {
            c.plastic = HebbPlasticity {
                mag: o.plastic.mag,
                corr: o.plastic.corr,
            };
            c.hebb = o.hebb;
        }
        true
    }

    /// Revalidate structural links after deserialisation.
    pub fn after_load(&mut self) -> Result<()> {
        for c in &self.connections {
            if self.neuron(c.source).is_none() || self.neuron(c.target).is_none() {
                return Err(Error::invariant(format!(
                    "connection #{} references a missing neuron ({} -> {})",
                    c.id, c.source, c.target
                )));
            }
        }
        if !self.connections.windows(2).all(|w| w[0].id < w[1].id) {
            return Err(Error::invariant(format!(
                "connection ids of net #{} are not strictly ascending",
                self.id
            )));
        }
        Ok(())
    }
}

impl core::fmt::Display for Network {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        writeln!(
            f,
            "network #{} ({:?}/{:?}): {} in, {} hid, {} out",
            self.id,
            self.hidden_model,
            self.output_model,
            self.inputs.len(),
            self.hidden.len(),
            self.outputs.len()
        )?;
        for n in self.neurons() {
            writeln!(f, "{n}")?;
        }
        for c in &self.connections {
            writeln!(f, "{c}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::assert_f64_approx;

    #[test]
    fn test_full_connectivity_and_bias() {
        let net = Network::sigmoid(1, 2, 1, 1);
        // 2 in->hid, 1 hid->out, 1 bias->out
        assert_eq!(net.connections.len(), 4);
        assert_eq!(
            net.connections.iter().map(|c| c.id).collect::<Vec<_>>(),
            vec![0, 1, 2, 3]
        );
        let bias = net.inputs.last().unwrap();
        assert!(bias.is_bias());
        for c in net.connections.iter().filter(|c| c.source == bias.id) {
            match net.neuron(c.target).unwrap().layer {
                Layer::Output => assert!(!c.enabled),
                _ => assert!(c.enabled),
            }
        }
    }

    #[test]
    fn test_hidden_free_network_disables_bias_edges() {
        let net = Network::sigmoid(0, 3, 0, 2);
        assert_eq!(net.connections.len(), 6);
        let bias = net.inputs.last().unwrap().id;
        assert!(net
            .connections
            .iter()
            .all(|c| (c.source == bias) == !c.enabled));
    }

    #[test]
    fn test_zero_weight_sigmoid_net_is_indifferent() {
        let mut net = Network::sigmoid(1, 2, 1, 1);
        net.load_inputs(&[0.5, 0.2]).unwrap();
        let out = net.run().to_vec();
        assert_eq!(out.len(), 1);
        assert_f64_approx!(out[0], 0.5);
    }

    #[test]
    fn test_load_inputs_rejects_wrong_shape() {
        let mut net = Network::sigmoid(0, 2, 1, 1);
        let err = net.load_inputs(&[0.1]).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::ShapeMismatch);
        // state untouched, a correct load still works
        net.load_inputs(&[0.1, 0.9]).unwrap();
    }

    #[test]
    fn test_positive_weights_drive_sigmoid_up() {
        let mut net = Network::sigmoid(0, 2, 1, 1);
        for c in &mut net.connections {
            if c.enabled {
                c.weight = 1.0;
            }
        }
        net.load_inputs(&[1.0, 1.0]).unwrap();
        net.run();
        net.load_inputs(&[1.0, 1.0]).unwrap();
        let out = net.run()[0];
        assert!(out > 0.5, "excited network must answer above midpoint");
    }

    #[test]
    fn test_izhikevich_network_outputs_rates() {
        let mut net = Network::izhikevich(0, 2, 2, 1);
        for c in &mut net.connections {
            if c.enabled {
                c.weight = 1.0;
            }
        }
        net.load_inputs(&[1.0, 1.0]).unwrap();
        let out = net.run().to_vec();
        assert_eq!(out.len(), 1);
        // a rate, up to the unspiked-potential fraction on either side
        assert!((-0.1..=1.1).contains(&out[0]), "rate out of range: {}", out[0]);
    }

    #[test]
    fn test_lif_network_outputs_raw_spikes() {
        let mut net = Network::lif(0, 2, 1, 1);
        for c in &mut net.connections {
            if c.enabled {
                c.weight = 1.0;
            }
        }
        net.load_inputs(&[1.0, 0.5]).unwrap();
        let out = net.run().to_vec();
        assert!(out[0] == 0.0 || out[0] == 1.0);
    }

    #[test]
    fn test_hybrid_network_bridges_rates() {
        let mut net = Network::hybrid(0, 2, 2, 1);
        for c in &mut net.connections {
            if c.enabled {
                c.weight = 0.8;
            }
        }
        net.load_inputs(&[1.0, 1.0]).unwrap();
        let out = net.run().to_vec();
        assert_eq!(out.len(), 1);
        assert!((0.0..=1.0).contains(&out[0]));
    }

    #[test]
    fn test_duplicate_copies_topology_not_state() {
        let mut net = Network::sigmoid(3, 2, 1, 1);
        net.load_inputs(&[0.9, 0.9]).unwrap();
        net.run();
        let copy = net.duplicate(9);
        assert_eq!(copy.id, 9);
        assert!(copy.has_same_topology(&net));
        for n in copy.neurons() {
            assert_f64_approx!(n.output().abs(), 0.0);
        }
        for c in &copy.connections {
            assert_f64_approx!(c.delayed(), 0.0);
        }
    }

    #[test]
    fn test_flush_clears_activation() {
        let mut net = Network::sigmoid(0, 2, 1, 1);
        net.load_inputs(&[1.0, 1.0]).unwrap();
        net.run();
        net.flush();
        assert!(net.neurons().all(|n| n.output() == 0.0));
        assert!(net.connections.iter().all(|c| c.delayed() == 0.0));
    }

    #[test]
    fn test_backup_restore_roundtrip() {
        let mut net = Network::sigmoid(0, 2, 1, 1);
        net.connections[0].weight = 0.6;
        net.backup_weights();
        net.connections[0].weight = -0.4;
        net.restore_weights();
        assert_f64_approx!(net.connections[0].weight, 0.6);
    }

    #[test]
    fn test_adopt_plastic_rule_requires_same_topology() {
        let mut a = Network::sigmoid(0, 2, 1, 1);
        let mut b = Network::sigmoid(1, 2, 1, 1);
        b.set_hebb_rule(HebbRule::Rate);
        for c in &mut b.connections {
            c.plastic = HebbPlasticity::new(0.3, -0.2);
        }
        assert!(a.adopt_plastic_rule(&b));
        assert!(a.connections.iter().all(|c| c.hebb == HebbRule::Rate));
        assert_f64_approx!(a.connections[0].plastic.mag, 0.3);

        let c = Network::sigmoid(2, 2, 2, 1);
        assert!(!a.adopt_plastic_rule(&c));
    }

    #[test]
    fn test_after_load_detects_dangling_connection() {
        let mut net = Network::sigmoid(0, 2, 1, 1);
        assert!(net.after_load().is_ok());
        net.connections[0].target = 99;
        assert!(net.after_load().is_err());
    }

    #[test]
    fn test_disabled_connections_carry_nothing() {
        let mut net = Network::sigmoid(0, 2, 0, 1);
        // only the bias edge has weight; it is disabled
        net.connections[0].weight = 0.0;
        net.connections[1].weight = 1.0;
        assert!(!net.connections[1].enabled);
        net.load_inputs(&[1.0, 1.0]).unwrap();
        let out = net.run()[0];
        assert_f64_approx!(out, 0.5);
    }

    #[test]
    fn test_rate_hebbian_learns_during_run() {
        let mut net = Network::sigmoid(0, 2, 1, 1);
        for c in &mut net.connections {
            if c.enabled {
                c.weight = 0.5;
            }
            c.plastic = HebbPlasticity::new(0.8, 0.3);
        }
        net.set_hebb_rule(HebbRule::Rate);
        let before = net.weights();
        for _ in 0..5 {
            net.load_inputs(&[0.8, 0.4]).unwrap();
            net.run();
        }
        let after = net.weights();
        assert_ne!(before, after, "plastic connections must move");
        assert!(after.iter().all(|w| w.abs() <= params::MAX_WEIGHT));
    }

    #[test]
    fn test_hybrid_bridges_rate_through_regular_edges() {
        let mut net = Network::hybrid(0, 2, 1, 1);
        for c in &mut net.connections {
            if c.enabled {
                c.weight = 1.0;
            }
        }
        net.load_inputs(&[1.0, 1.0]).unwrap();
        net.run();
        // the hidden->output edge is rate-kind and holds exactly the
        // hidden firing rate after the slot
        let hid = net.hidden[0].id;
        let out = net.outputs[0].id;
        let bridge = net
            .connections
            .iter()
            .find(|c| c.source == hid && c.target == out)
            .unwrap();
        assert_eq!(bridge.kind, ConnKind::Regular);
        assert_f64_approx!(bridge.delayed(), net.hidden[0].output());
    }

    #[test]
    fn test_recurrent_edge_remembers_previous_slot() {
        let mut net = Network::sigmoid(0, 2, 1, 1);
        for c in &mut net.connections {
            if c.enabled {
                c.weight = 0.7;
            }
        }
        // hidden self-loop
        let hid = net.hidden[0].id;
        let mut rec = Connection::new(net.next_conn_id(), hid, hid, ConnKind::Regular);
        rec.weight = 0.9;
        net.insert_connection(rec);

        net.load_inputs(&[0.6, 0.6]).unwrap();
        let first = net.run()[0];
        net.load_inputs(&[0.6, 0.6]).unwrap();
        let second = net.run()[0];
        assert!(
            (first - second).abs() > 1e-12,
            "the self-loop must feed the previous slot back in"
        );
    }

    #[test]
    fn test_serde_roundtrip_preserves_behavior() {
        let mut net = Network::sigmoid(0, 2, 1, 1);
        for (i, c) in net.connections.iter_mut().enumerate() {
            c.weight = 0.1 * i as f64;
        }
        let json = serde_json::to_string(&net).unwrap();
        let mut copy: Network = serde_json::from_str(&json).unwrap();
        copy.after_load().unwrap();

        for inputs in [[0.0, 0.0], [0.5, -0.3], [1.0, 1.0]] {
            net.flush();
            copy.flush();
            net.load_inputs(&inputs).unwrap();
            copy.load_inputs(&inputs).unwrap();
            let a = net.run().to_vec();
            let b = copy.run().to_vec();
            assert_eq!(a.len(), b.len());
            for (x, y) in a.iter().zip(&b) {
                assert_f64_approx!(x, y);
            }
        }
    }
}
