//! Reference-tracking demo: evolve a hybrid (spiking hidden, sigmoid
//! output) controller that holds its output on a setpoint sequence.

use core::ops::ControlFlow;
use spindle::{
    evolve, params::STD_FIT, random::default_rng, scenario::print_progress, EvolutionHooks,
    Network, Organism, Params, Plant, Population, Stats,
};

const GENERATIONS: usize = 200;
const POPULATION: usize = 150;

/// Piecewise-constant reference the controller must settle on.
struct Setpoints {
    levels: Vec<f64>,
    hold: usize,
    slot: usize,
    err_acc: f64,
}

impl Setpoints {
    fn new() -> Self {
        Self {
            levels: vec![0.2, 0.7, 0.45, 0.9],
            hold: 12,
            slot: 0,
            err_acc: 0.0,
        }
    }

    fn target(&self) -> f64 {
        self.levels[(self.slot / self.hold) % self.levels.len()]
    }

    fn len(&self) -> usize {
        self.levels.len() * self.hold
    }
}

impl Plant for Setpoints {
    fn reset(&mut self) {
        self.slot = 0;
        self.err_acc = 0.0;
    }

    fn encode_inputs(&self) -> Vec<f64> {
        vec![self.target(), 1.0]
    }

    fn decode_output(&mut self, outputs: &[f64]) {
        self.err_acc += (self.target() - outputs[0]).abs();
    }

    fn step(&mut self) -> bool {
        self.slot += 1;
        self.slot < self.len()
    }

    fn fitness(&self) -> f64 {
        if self.slot == 0 {
            return 0.0;
        }
        (1.0 - self.err_acc / self.slot as f64).clamp(0.0, 1.0)
    }
}

fn main() {
    let mut rng = default_rng();
    let template = Organism::new(Network::hybrid(0, 2, 1, 1), 0);
    let episode = Setpoints::new().len();
    let mut population = Population::spawn(
        &template,
        POPULATION,
        0,
        true,
        Params {
            pop_size: POPULATION,
            episode,
            ..Params::default()
        },
        &mut rng,
    );

    let every = population.params.print_every;
    let hooks = EvolutionHooks::new(vec![
        print_progress(every),
        Box::new(|stats: &Stats| {
            if stats.population.solved || stats.generation >= GENERATIONS {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        }),
    ]);

    if let Err(e) = evolve(&mut population, Setpoints::new, hooks, &mut rng) {
        eprintln!("run aborted: {e}");
        return;
    }

    println!("{population}");
    match population.champion() {
        Some(champ) => {
            println!("{champ}");
            if champ.fitness >= STD_FIT {
                println!("solved at generation {}", population.gen);
            }
        }
        None => println!("no champion"),
    }
}
