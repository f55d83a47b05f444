//! The task boundary: plants, episode evaluation, and the generation loop.
//!
//! A [`Plant`] is whatever the networks are being evolved to control; the
//! engine only ever sees it through reset/encode/decode/step/fitness.
//! [`evolve`] owns the evaluate → hook → epoch cycle; hooks observe each
//! generation and decide when to stop. With the `parallel` feature,
//! evaluation fans out across organisms while everything that touches the
//! innovation log or the id counters stays single-threaded.

use crate::{
    error::Result, network::Network, organism::Organism, params, population::Population,
};
use core::ops::ControlFlow;
use rand::RngCore;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// A controlled environment, stepped in lockstep with the network.
pub trait Plant {
    /// Restart the environment for a fresh episode.
    fn reset(&mut self);
    /// Current observation, one sample per network input.
    fn encode_inputs(&self) -> Vec<f64>;
    /// Apply the network's outputs as the control signal.
    fn decode_output(&mut self, outputs: &[f64]);
    /// Advance one slot; false means the episode terminated.
    fn step(&mut self) -> bool;
    /// Final score in [0, 1].
    fn fitness(&self) -> f64;
}

/// Run one evaluation episode of at most `slots` time slots.
pub fn run_episode(net: &mut Network, plant: &mut impl Plant, slots: usize) -> Result<f64> {
    plant.reset();
    net.flush();
    for _ in 0..slots {
        net.load_inputs(&plant.encode_inputs())?;
        let outputs = net.run().to_vec();
        plant.decode_output(&outputs);
        if !plant.step() {
            break;
        }
    }
    Ok(plant.fitness())
}

/// Generation snapshot handed to hooks.
pub struct Stats<'a> {
    pub generation: usize,
    pub population: &'a Population,
}

impl Stats<'_> {
    pub fn champion(&self) -> Option<&Organism> {
        self.population.champion()
    }

    pub fn any_fitter_than(&self, target: f64) -> bool {
        self.population.organisms().any(|o| o.fitness > target)
    }
}

pub type Hook = Box<dyn Fn(&Stats) -> ControlFlow<()>>;

pub struct EvolutionHooks {
    hooks: Vec<Hook>,
}

impl EvolutionHooks {
    pub fn new(hooks: Vec<Hook>) -> Self {
        Self { hooks }
    }

    pub fn add(&mut self, hook: Hook) {
        self.hooks.push(hook);
    }

    fn fire(&self, stats: Stats) -> ControlFlow<()> {
        for hook in &self.hooks {
            if hook(&stats).is_break() {
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }
}

/// Hook printing the champion every `every` generations.
pub fn print_progress(every: usize) -> Hook {
    Box::new(move |stats| {
        if every != 0 && stats.generation % every == 0 {
            if let Some(champ) = stats.champion() {
                println!(
                    "gen {:>4}: champion fitness {:.4}, {} species",
                    stats.generation,
                    champ.fitness,
                    stats.population.species.len()
                );
            }
        }
        ControlFlow::Continue(())
    })
}

/// Hook stopping the run once any organism beats `target`.
pub fn stop_when_fitter_than(target: f64) -> Hook {
    Box::new(move |stats| {
        if stats.any_fitter_than(target) {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    })
}

/// Evaluate every organism against a fresh plant for one episode.
pub fn evaluate<
    #[cfg(not(feature = "parallel"))] P: Plant,
    #[cfg(feature = "parallel")] P: Plant + Send,
    #[cfg(not(feature = "parallel"))] F: Fn() -> P,
    #[cfg(feature = "parallel")] F: Fn() -> P + Sync,
>(
    population: &mut Population,
    make_plant: &F,
) -> Result<()> {
    let slots = population.params.episode;

    #[cfg(not(feature = "parallel"))]
    for o in population.organisms_mut() {
        o.fitness = run_episode(&mut o.net, &mut make_plant(), slots)?;
        o.mark_winner(params::STD_FIT);
    }

    #[cfg(feature = "parallel")]
    population.species.par_iter_mut().try_for_each(|s| {
        s.members.par_iter_mut().try_for_each(|o| {
            o.fitness = run_episode(&mut o.net, &mut make_plant(), slots)?;
            o.mark_winner(params::STD_FIT);
            Ok(())
        })
    })?;

    Ok(())
}

/// Drive the population until a hook breaks. Evaluation happens before the
/// hooks fire, so the stats they see are for the current generation.
pub fn evolve<
    #[cfg(not(feature = "parallel"))] P: Plant,
    #[cfg(feature = "parallel")] P: Plant + Send,
    #[cfg(not(feature = "parallel"))] F: Fn() -> P,
    #[cfg(feature = "parallel")] F: Fn() -> P + Sync,
>(
    population: &mut Population,
    make_plant: F,
    hooks: EvolutionHooks,
    rng: &mut impl RngCore,
) -> Result<()> {
    loop {
        evaluate(population, &make_plant)?;
        if population.organisms().any(|o| o.winner) {
            population.solved = true;
        }
        let stats = Stats {
            generation: population.gen,
            population,
        };
        if hooks.fire(stats).is_break() {
            return Ok(());
        }
        population.epoch(rng)?;
    }
}
