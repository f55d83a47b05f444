//! Genome operations: parametric and structural mutation, crossover and
//! compatibility distance over [`Network`]s.
//!
//! Structural mutations consult the population's [`InnovationLog`] so the
//! same topological change receives the same ids wherever it occurs within
//! one run. All operations are best-effort: when a random search for a
//! mutation site is exhausted the genome is left untouched.

use crate::{
    connection::{ConnKind, Connection},
    error::{Error, Result},
    innovation::InnovationLog,
    network::Network,
    neuron::{Layer, Neuron, OUTPUT_SEQ},
    params::Params,
    random::{creep, happens, rand_delay, rand_lambda, rand_plastic_term, rand_weight},
    ConnId, NeuronId,
};
use rand::{Rng, RngCore};

fn kind_for(spiking: bool) -> ConnKind {
    if spiking {
        ConnKind::Spike
    } else {
        ConnKind::Regular
    }
}

impl Network {
    /// Creep or reset each connection weight, clamped to the weight bound.
    pub fn mutate_weights(&mut self, params: &Params, rng: &mut impl RngCore) {
        for c in &mut self.connections {
            if !happens(rng, params.mutate_weight_prob) {
                continue;
            }
            if happens(rng, params.creep_mutate_prob) {
                let mut dv = creep(rng, 0.1);
                // a creep too close to zero is wasted; inflate a few times
                let mut tries = 0;
                while dv.abs() < params.mutate_weight_min && tries < 5 {
                    dv *= rng.random_range(2..=5) as f64;
                    tries += 1;
                }
                c.weight += dv;
                c.cap_weight();
            } else {
                c.weight = rand_weight(rng);
            }
        }
    }

    /// Creep or reset the slope of every sigmoid neuron.
    pub fn mutate_lambda(&mut self, params: &Params, rng: &mut impl RngCore) {
        let (p_mutate, p_creep, min_step) = (
            params.mutate_lambda_prob,
            params.creep_mutate_prob,
            params.mutate_lambda_min,
        );
        for n in self.neurons_mut() {
            let Some(lambda) = n.lambda_mut() else {
                continue;
            };
            if !happens(rng, p_mutate) {
                continue;
            }
            if happens(rng, p_creep) {
                let mut dv = creep(rng, 0.2);
                let mut tries = 0;
                while dv.abs() < min_step && tries < 5 {
                    dv *= rng.random_range(2..=5) as f64;
                    tries += 1;
                }
                *lambda = (*lambda + dv).clamp(crate::params::MIN_LAMBDA, crate::params::MAX_LAMBDA);
            } else {
                *lambda = rand_lambda(rng);
            }
        }
    }

    /// Creep or reset the two plastic terms of every connection.
    pub fn mutate_plastic_terms(&mut self, params: &Params, rng: &mut impl RngCore) {
        for c in &mut self.connections {
            for which in 0..2 {
                if !happens(rng, params.mutate_plasticity_prob) {
                    continue;
                }
                let term = if which == 0 {
                    &mut c.plastic.corr
                } else {
                    &mut c.plastic.mag
                };
                if happens(rng, params.plasticity_creep_mutate_prob) {
                    *term += creep(rng, 0.05);
                    c.plastic.cap();
                } else {
                    *term = rand_plastic_term(rng);
                }
            }
        }
    }

    /// Try to connect a fresh (source, target) pair: source from the input
    /// or hidden layer, target hidden (or an output when the source is
    /// hidden). Gives up after 20 draws. Returns whether a connection was
    /// added.
    pub fn add_connection(
        &mut self,
        next_cid: &mut ConnId,
        log: &mut InnovationLog,
        rng: &mut impl RngCore,
    ) -> bool {
        if self.hidden.is_empty() {
            return false;
        }
        let in_n = self.inputs.len();
        let hid_n = self.hidden.len();
        let total = self.neuron_count();

        let mut pick = None;
        for _ in 0..20 {
            let ishift = rng.random_range(0..in_n + hid_n);
            let oshift = if ishift < in_n {
                rng.random_range(in_n..in_n + hid_n)
            } else {
                rng.random_range(in_n..total)
            };
            let source = if ishift < in_n {
                self.inputs[ishift].id
            } else {
                self.hidden[ishift - in_n].id
            };
            let target = if oshift < in_n + hid_n {
                &self.hidden[oshift - in_n]
            } else {
                &self.outputs[oshift - in_n - hid_n]
            };
            if !self.connection_exists(source, target.id) {
                pick = Some((source, target.id, target.is_spiking()));
                break;
            }
        }
        let Some((source, target, spiking)) = pick else {
            return false;
        };

        let id = match log.find_conn(source, target) {
            Some(cid) => cid,
            None => {
                let cid = *next_cid;
                log.record_conn(source, target, cid, 0.0, kind_for(spiking));
                *next_cid += 1;
                cid
            }
        };
        let mut conn = Connection::new(id, source, target, kind_for(spiking));
        conn.delay = rand_delay(rng);
        self.insert_connection(conn);
        true
    }

    /// Split a random enabled connection `u -> v` with a fresh hidden
    /// neuron `n`, leaving `u -> n -> v` with the original weight and
    /// delay on both halves. Returns whether a split happened.
    pub fn add_neuron(
        &mut self,
        next_nid: &mut NeuronId,
        next_cid: &mut ConnId,
        log: &mut InnovationLog,
        rng: &mut impl RngCore,
    ) -> bool {
        if self.connections.is_empty() {
            return false;
        }
        let mut pick = None;
        for _ in 0..20 {
            let i = rng.random_range(0..self.connections.len());
            if self.connections[i].enabled {
                pick = Some(i);
                break;
            }
        }
        let Some(ci) = pick else {
            return false;
        };
        let (source, target, weight, delay, old_id) = {
            let c = &self.connections[ci];
            (c.source, c.target, c.weight, c.delay, c.id)
        };

        let (nid, cid1, cid2, fresh) = match log.find_node(source, target, old_id) {
            Some((n, c1, c2)) => (n, c1, c2, false),
            None => (*next_nid, *next_cid, *next_cid + 1, true),
        };
        // a genome can re-grow a previously split edge; splitting it again
        // would hand out ids this network already carries
        if self.neuron(nid).is_some() {
            return false;
        }
        if fresh {
            log.record_node(source, target, old_id, nid, cid1, cid2);
            *next_nid += 1;
            *next_cid += 2;
        }

        let neuron = Neuron::new(self.hidden_model, nid, Layer::Hidden);
        let target_spiking = self.neuron(target).is_some_and(Neuron::is_spiking);
        let mut c1 = Connection::new(cid1, source, nid, kind_for(neuron.is_spiking()));
        c1.weight = weight;
        c1.delay = delay;
        let mut c2 = Connection::new(cid2, nid, target, kind_for(target_spiking));
        c2.weight = weight;
        c2.delay = delay;

        // keep the hidden list in activation order: when the source fires
        // first, the new neuron goes just before the target, otherwise just
        // after the source
        let u_seq = self.neuron(source).map_or(0, |n| n.seq);
        let v_seq = self.neuron(target).map_or(OUTPUT_SEQ, |n| n.seq);
        let pos = if u_seq < v_seq {
            self.hidden
                .iter()
                .position(|n| n.id == target)
                .unwrap_or(self.hidden.len())
        } else {
            self.hidden
                .iter()
                .position(|n| n.id == source)
                .map_or(self.hidden.len(), |p| p + 1)
        };
        self.hidden.insert(pos, neuron);

        self.connections.remove(ci);
        self.insert_connection(c1);
        self.insert_connection(c2);
        self.assign_hidden_seq();
        true
    }

    /// Insert a fresh hidden neuron fully connected from every input and to
    /// every output, with a contiguous block of connection ids. The neuron
    /// id comes from this network's own id space; both global counters are
    /// advanced past whatever the insertion used so later mutations cannot
    /// re-issue the ids.
    pub fn add_neuron_in2out(
        &mut self,
        next_nid_global: &mut NeuronId,
        next_cid_global: &mut ConnId,
        log: &mut InnovationLog,
        rng: &mut impl RngCore,
    ) -> bool {
        let nid = self.next_neuron_id();
        if nid >= *next_nid_global {
            *next_nid_global = nid + 1;
        }
        let base = match log.find_in2out(nid) {
            Some(cid) => cid,
            None => {
                let base = *next_cid_global;
                log.record_in2out(nid, base);
                base
            }
        };

        let neuron = Neuron::new(self.hidden_model, nid, Layer::Hidden);
        let n_spiking = neuron.is_spiking();
        self.hidden.push(neuron);

        let mut cid = base;
        let input_ids: Vec<NeuronId> = self.inputs.iter().map(|n| n.id).collect();
        for iid in input_ids {
            let mut c = Connection::new(cid, iid, nid, kind_for(n_spiking));
            c.delay = rand_delay(rng);
            self.insert_connection(c);
            cid += 1;
        }
        let out_spiking = self.output_model.is_spiking();
        let output_ids: Vec<NeuronId> = self.outputs.iter().map(|n| n.id).collect();
        for oid in output_ids {
            let mut c = Connection::new(cid, nid, oid, kind_for(out_spiking));
            c.delay = rand_delay(rng);
            self.insert_connection(c);
            cid += 1;
        }
        if cid > *next_cid_global {
            *next_cid_global = cid;
        }
        self.assign_hidden_seq();
        true
    }

    /// Blend the shared genes of `dad` into this network: averaged weights
    /// and plastic terms, coin-flipped delay and learning rule. Genes
    /// present on one side only keep the mother's configuration, as does
    /// the enable status.
    pub fn crossover_with(&mut self, dad: &Network, rng: &mut impl RngCore) -> Result<()> {
        if self.hidden_model != dad.hidden_model || self.output_model != dad.output_model {
            return Err(Error::kind_mismatch(format!(
                "crossover of net #{} ({:?}/{:?}) with net #{} ({:?}/{:?})",
                self.id,
                self.hidden_model,
                self.output_model,
                dad.id,
                dad.hidden_model,
                dad.output_model
            )));
        }

        let (mut i, mut j) = (0, 0);
        while i < self.connections.len() && j < dad.connections.len() {
            let d = &dad.connections[j];
            match self.connections[i].id.cmp(&d.id) {
                core::cmp::Ordering::Equal => {
                    let c = &mut self.connections[i];
                    c.weight = 0.5 * (c.weight + d.weight);
                    if happens(rng, 0.5) {
                        c.delay = d.delay;
                    }
                    if happens(rng, 0.5) {
                        c.hebb = d.hebb;
                    }
                    c.plastic.corr = 0.5 * (c.plastic.corr + d.plastic.corr);
                    c.plastic.mag = 0.5 * (c.plastic.mag + d.plastic.mag);
                    i += 1;
                    j += 1;
                }
                core::cmp::Ordering::Less => i += 1,
                core::cmp::Ordering::Greater => j += 1,
            }
        }
        Ok(())
    }

    /// Compatibility distance over the id-sorted connection lists, plus the
    /// average slope difference when both output layers are sigmoid.
    pub fn compat_distance(&self, other: &Network, params: &Params) -> f64 {
        let a = &self.connections;
        let b = &other.connections;
        let (mut i, mut j) = (0, 0);
        let (mut matches, mut disjoint, mut excess) = (0usize, 0usize, 0usize);
        let (mut wdiff, mut ddiff) = (0.0, 0.0);

        while i < a.len() || j < b.len() {
            if i == a.len() {
                j += 1;
                excess += 1;
            } else if j == b.len() {
                i += 1;
                excess += 1;
            } else {
                match a[i].id.cmp(&b[j].id) {
                    core::cmp::Ordering::Equal => {
                        matches += 1;
                        wdiff += (a[i].weight - b[j].weight).abs();
                        ddiff += (a[i].delay as i64 - b[j].delay as i64).abs() as f64;
                        i += 1;
                        j += 1;
                    }
                    core::cmp::Ordering::Less => {
                        i += 1;
                        disjoint += 1;
                    }
                    core::cmp::Ordering::Greater => {
                        j += 1;
                        disjoint += 1;
                    }
                }
            }
        }

        let mut ldiff = 0.0;
        if self.output_model == crate::neuron::Model::Sigmoid
            && other.output_model == crate::neuron::Model::Sigmoid
            && !self.outputs.is_empty()
        {
            for (x, y) in self.outputs.iter().zip(&other.outputs) {
                ldiff += (x.lambda().unwrap_or(0.0) - y.lambda().unwrap_or(0.0)).abs();
            }
            ldiff /= self.outputs.len() as f64;
        }

        let (wavg, davg) = if matches > 0 {
            (wdiff / matches as f64, ddiff / matches as f64)
        } else {
            (0.0, 0.0)
        };

        params.disjoint_coeff * disjoint as f64
            + params.excess_coeff * excess as f64
            + params.weightdiff_coeff * wavg
            + params.delaydiff_coeff * davg
            + params.lambdadiff_coeff * ldiff
    }
}
