//! End-to-end evolution runs over the public API, checking the structural
//! invariants the engine promises to hold at every generation boundary.

use core::ops::ControlFlow;
use spindle::{
    evolve, params, random::WyRng, scenario::Stats, EvolutionHooks, Network, Organism, Params,
    Plant, Population,
};

/// Tracks a reference signal; fitness decays with average absolute error.
struct Reference {
    setpoint: f64,
    err_acc: f64,
    steps: usize,
    limit: usize,
}

impl Reference {
    fn new(setpoint: f64) -> Self {
        Self {
            setpoint,
            err_acc: 0.0,
            steps: 0,
            limit: 20,
        }
    }
}

impl Plant for Reference {
    fn reset(&mut self) {
        self.err_acc = 0.0;
        self.steps = 0;
    }

    fn encode_inputs(&self) -> Vec<f64> {
        vec![self.setpoint, 1.0]
    }

    fn decode_output(&mut self, outputs: &[f64]) {
        self.err_acc += (self.setpoint - outputs[0]).abs();
    }

    fn step(&mut self) -> bool {
        self.steps += 1;
        self.steps < self.limit
    }

    fn fitness(&self) -> f64 {
        if self.steps == 0 {
            return 0.0;
        }
        (1.0 - self.err_acc / self.steps as f64).clamp(0.0, 1.0)
    }
}

fn assert_structural_invariants(pop: &Population) {
    // conserved size is checked by the caller; here the per-network and
    // per-species structure
    for s in &pop.species {
        assert!(!s.members.is_empty(), "empty species survived the epoch");
        for o in &s.members {
            assert_eq!(o.species, s.id, "organism points at the wrong species");

            let net = &o.net;
            assert!(
                net.connections.windows(2).all(|w| w[0].id < w[1].id),
                "connection ids must ascend"
            );
            assert_eq!(
                net.hidden.iter().map(|n| n.seq).collect::<Vec<_>>(),
                (1..=net.hidden.len()).collect::<Vec<_>>(),
                "hidden activation order must stay contiguous"
            );
            for c in &net.connections {
                assert!(
                    c.weight.abs() <= params::MAX_WEIGHT,
                    "weight out of bounds: {}",
                    c.weight
                );
                assert!(net.neuron(c.source).is_some() && net.neuron(c.target).is_some());
            }
            for n in net.neurons() {
                if let Some(l) = n.lambda() {
                    assert!((params::MIN_LAMBDA..=params::MAX_LAMBDA).contains(&l));
                }
            }
        }
    }
}

fn run_template(template: Organism, seed: u64) {
    let mut rng = WyRng::seeded(seed);
    let count = 24;
    let mut pop = Population::spawn(
        &template,
        count,
        0,
        true,
        Params {
            pop_size: count,
            episode: 20,
            // lean on structural mutation so the invariants get exercised
            add_conn_prob: 0.2,
            add_node_prob: 0.1,
            add_ff_node_prob: 0.05,
            ..Params::default()
        },
        &mut rng,
    );

    let hooks = EvolutionHooks::new(vec![Box::new(|stats: &Stats| {
        if stats.generation >= 12 {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    })]);

    evolve(&mut pop, || Reference::new(0.6), hooks, &mut rng).unwrap();

    assert_eq!(pop.gen, 12);
    assert_eq!(pop.size(), count, "population size must be conserved");
    assert_structural_invariants(&pop);

    // ids are contiguous after the last epoch
    let ids: Vec<usize> = pop.species.iter().flat_map(|s| &s.members).map(|o| o.id()).collect();
    assert_eq!(ids, (0..count).collect::<Vec<_>>());
}

#[test]
fn sigmoid_population_evolves_and_holds_invariants() {
    run_template(Organism::new(Network::sigmoid(0, 2, 1, 1), 0), 101);
}

#[test]
fn hybrid_population_evolves_and_holds_invariants() {
    run_template(Organism::new(Network::hybrid(0, 2, 1, 1), 0), 102);
}

#[test]
fn plasticity_phase_freezes_topology_and_weights() {
    let mut rng = WyRng::seeded(103);
    let template = Organism::new(Network::hybrid(0, 2, 2, 1), 0);
    let count = 12;
    let mut pop = Population::spawn(
        &template,
        count,
        0,
        false,
        Params {
            pop_size: count,
            episode: 10,
            ..Params::default()
        },
        &mut rng,
    );
    pop.plastic_phase = true;

    let shape: Vec<(usize, usize)> = pop
        .species
        .iter()
        .flat_map(|s| &s.members)
        .map(|o| (o.net.hidden.len(), o.net.connections.len()))
        .collect();
    let weights: Vec<Vec<f64>> = pop
        .species
        .iter()
        .flat_map(|s| &s.members)
        .map(|o| o.net.weights())
        .collect();

    let hooks = EvolutionHooks::new(vec![Box::new(|stats: &Stats| {
        if stats.generation >= 6 {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    })]);
    evolve(&mut pop, || Reference::new(0.4), hooks, &mut rng).unwrap();

    // clones only drift in their plastic terms, so topology and weights
    // are the template's everywhere
    for (i, o) in pop.species.iter().flat_map(|s| &s.members).enumerate() {
        assert_eq!((o.net.hidden.len(), o.net.connections.len()), shape[0], "organism {i}");
        assert_eq!(o.net.weights(), weights[0]);
        for c in &o.net.connections {
            assert!(c.plastic.mag.abs() <= 1.0 && c.plastic.corr.abs() <= 1.0);
        }
    }
    assert_eq!(pop.size(), count);
}
