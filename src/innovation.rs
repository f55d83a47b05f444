//! Historical markings.
//!
//! The log guarantees that structurally identical mutations receive
//! identical ids for the lifetime of a population: records are append-only
//! and ids handed to fresh mutations are strictly greater than any issued
//! before. Hash indexes over the tag-relevant fields keep lookup cheap; they
//! are rebuilt when a log is restored from storage.

use crate::{connection::ConnKind, ConnId, NeuronId};
use fxhash::FxHashMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Innovation {
    /// A connection was created between two existing neurons
    NewConn {
        source: NeuronId,
        target: NeuronId,
        conn_id: ConnId,
        weight: f64,
        kind: ConnKind,
    },
    /// An existing connection was split by a fresh hidden neuron
    NewNode {
        source: NeuronId,
        target: NeuronId,
        old_conn_id: ConnId,
        node_id: NeuronId,
        conn_id: ConnId,
        conn_id2: ConnId,
    },
    /// A fresh hidden neuron was fully connected input-to-output;
    /// `conn_id` is the base of its connection id block
    NewNodeIn2Out { node_id: NeuronId, conn_id: ConnId },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Innovation>", into = "Vec<Innovation>")]
pub struct InnovationLog {
    records: Vec<Innovation>,
    conn_index: FxHashMap<(NeuronId, NeuronId), usize>,
    node_index: FxHashMap<(NeuronId, NeuronId, ConnId), usize>,
    in2out_index: FxHashMap<NeuronId, usize>,
}

impl InnovationLog {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Innovation] {
        &self.records
    }

    /// Connection id of an earlier identical new-connection event.
    pub fn find_conn(&self, source: NeuronId, target: NeuronId) -> Option<ConnId> {
        self.conn_index
            .get(&(source, target))
            .map(|&i| match self.records[i] {
                Innovation::NewConn { conn_id, .. } => conn_id,
                _ => unreachable!("conn index points at a non-conn record"),
            })
    }

    pub fn record_conn(
        &mut self,
        source: NeuronId,
        target: NeuronId,
        conn_id: ConnId,
        weight: f64,
        kind: ConnKind,
    ) {
        self.conn_index.insert((source, target), self.records.len());
        self.records.push(Innovation::NewConn {
            source,
            target,
            conn_id,
            weight,
            kind,
        });
    }

    /// Ids of an earlier identical split of `old_conn_id`.
    pub fn find_node(
        &self,
        source: NeuronId,
        target: NeuronId,
        old_conn_id: ConnId,
    ) -> Option<(NeuronId, ConnId, ConnId)> {
        self.node_index
            .get(&(source, target, old_conn_id))
            .map(|&i| match self.records[i] {
                Innovation::NewNode {
                    node_id,
                    conn_id,
                    conn_id2,
                    ..
                } => (node_id, conn_id, conn_id2),
                _ => unreachable!("node index points at a non-node record"),
            })
    }

    pub fn record_node(
        &mut self,
        source: NeuronId,
        target: NeuronId,
        old_conn_id: ConnId,
        node_id: NeuronId,
        conn_id: ConnId,
        conn_id2: ConnId,
    ) {
        self.node_index
            .insert((source, target, old_conn_id), self.records.len());
        self.records.push(Innovation::NewNode {
            source,
            target,
            old_conn_id,
            node_id,
            conn_id,
            conn_id2,
        });
    }

    /// Base connection id of an earlier input-to-output insertion of the
    /// same neuron id.
    pub fn find_in2out(&self, node_id: NeuronId) -> Option<ConnId> {
        self.in2out_index
            .get(&node_id)
            .map(|&i| match self.records[i] {
                Innovation::NewNodeIn2Out { conn_id, .. } => conn_id,
                _ => unreachable!("in2out index points at a non-in2out record"),
            })
    }

    pub fn record_in2out(&mut self, node_id: NeuronId, conn_id: ConnId) {
        self.in2out_index.insert(node_id, self.records.len());
        self.records.push(Innovation::NewNodeIn2Out { node_id, conn_id });
    }
}

impl From<Vec<Innovation>> for InnovationLog {
    fn from(records: Vec<Innovation>) -> Self {
        let mut log = Self {
            records: Vec::with_capacity(records.len()),
            ..Self::default()
        };
        for r in records {
            match r {
                Innovation::NewConn {
                    source,
                    target,
                    conn_id,
                    weight,
                    kind,
                } => log.record_conn(source, target, conn_id, weight, kind),
                Innovation::NewNode {
                    source,
                    target,
                    old_conn_id,
                    node_id,
                    conn_id,
                    conn_id2,
                } => log.record_node(source, target, old_conn_id, node_id, conn_id, conn_id2),
                Innovation::NewNodeIn2Out { node_id, conn_id } => {
                    log.record_in2out(node_id, conn_id)
                }
            }
        }
        log
    }
}

impl From<InnovationLog> for Vec<Innovation> {
    fn from(log: InnovationLog) -> Self {
        log.records
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_conn_replay_reuses_id() {
        let mut log = InnovationLog::default();
        assert_eq!(log.find_conn(1, 4), None);
        log.record_conn(1, 4, 7, 0.0, ConnKind::Regular);
        assert_eq!(log.find_conn(1, 4), Some(7));
        // direction matters
        assert_eq!(log.find_conn(4, 1), None);
    }

    #[test]
    fn test_node_replay_distinguishes_old_conn() {
        let mut log = InnovationLog::default();
        log.record_node(0, 3, 2, 10, 11, 12);
        assert_eq!(log.find_node(0, 3, 2), Some((10, 11, 12)));
        assert_eq!(log.find_node(0, 3, 9), None);
    }

    #[test]
    fn test_in2out_replay() {
        let mut log = InnovationLog::default();
        log.record_in2out(6, 20);
        assert_eq!(log.find_in2out(6), Some(20));
        assert_eq!(log.find_in2out(7), None);
    }

    #[test]
    fn test_records_accumulate_in_order() {
        let mut log = InnovationLog::default();
        log.record_conn(0, 1, 5, 0.0, ConnKind::Spike);
        log.record_node(0, 1, 5, 6, 7, 8);
        log.record_in2out(9, 9);
        assert_eq!(log.len(), 3);
        assert!(matches!(log.records()[0], Innovation::NewConn { .. }));
        assert!(matches!(log.records()[2], Innovation::NewNodeIn2Out { .. }));
    }

    #[test]
    fn test_indexes_survive_roundtrip() {
        let mut log = InnovationLog::default();
        log.record_conn(1, 2, 3, 0.0, ConnKind::Regular);
        log.record_node(1, 2, 3, 4, 5, 6);
        log.record_in2out(7, 8);

        let json = serde_json::to_string(&log).unwrap();
        let restored: InnovationLog = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.len(), 3);
        assert_eq!(restored.find_conn(1, 2), Some(3));
        assert_eq!(restored.find_node(1, 2, 3), Some((4, 5, 6)));
        assert_eq!(restored.find_in2out(7), Some(8));
    }
}
