//! Population: the owner of species, innovations and id counters, and the
//! driver of one generation per [`Population::epoch`].
//!
//! Ownership is a strict tree: the population owns its species, a species
//! owns its member organisms, an organism owns its network. The organism
//! view of the population is the ordered flat-map over species members;
//! back-pointers are stored species ids, re-established after loading.

use crate::{
    error::{Error, Result},
    innovation::InnovationLog,
    organism::Organism,
    params::Params,
    random::{happens, species_rank},
    species::Species,
    ConnId, NeuronId, SpeciesId,
};
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Population {
    pub gen: usize,
    pub params: Params,
    pub species: Vec<Species>,
    pub(crate) innovations: InnovationLog,
    pub(crate) next_neuron_id: NeuronId,
    pub(crate) next_conn_id: ConnId,
    pub(crate) next_species_id: SpeciesId,
    /// Champion raw fitness of the latest epoch
    pub champ_fit: f64,
    pub champ_fit_ever: f64,
    pub stagnant_gens: usize,
    pub solved: bool,
    /// When set, `evolve` only mutates the Hebbian plastic terms
    pub plastic_phase: bool,
}

impl Population {
    /// Spawn a population by cloning `template` `count` times, optionally
    /// randomising each clone's weights, and speciating the result. The id
    /// counters continue from the template's genome.
    pub fn spawn(
        template: &Organism,
        count: usize,
        gen: usize,
        randomize: bool,
        params: Params,
        rng: &mut impl RngCore,
    ) -> Self {
        let mut pop = Self {
            gen,
            params,
            species: Vec::new(),
            innovations: InnovationLog::default(),
            next_neuron_id: template.net.next_neuron_id(),
            next_conn_id: template.net.next_conn_id(),
            next_species_id: 0,
            champ_fit: 0.0,
            champ_fit_ever: 0.0,
            stagnant_gens: 0,
            solved: false,
            plastic_phase: false,
        };
        for i in 0..count {
            let mut o = template.duplicate(i, gen);
            if randomize {
                o.randomize_weights(rng);
            }
            pop.adopt_spawned(o);
        }
        pop
    }

    /// Initial speciation; spawned species start aged so they reproduce
    /// immediately.
    fn adopt_spawned(&mut self, mut org: Organism) {
        let params = &self.params;
        match self.species.iter().position(|s| {
            s.champion()
                .is_some_and(|rep| org.compat_distance(rep, params) < params.compat_threshold)
        }) {
            Some(i) => {
                org.species = self.species[i].id;
                self.species[i].members.push(org);
            }
            None => {
                let id = self.next_species_id;
                self.next_species_id += 1;
                let mut s = Species::aged(id, 1);
                org.species = id;
                s.members.push(org);
                self.species.push(s);
            }
        }
    }

    pub fn size(&self) -> usize {
        self.species.iter().map(Species::len).sum()
    }

    pub fn organisms(&self) -> impl Iterator<Item = &Organism> {
        self.species.iter().flat_map(|s| s.members.iter())
    }

    pub fn organisms_mut(&mut self) -> impl Iterator<Item = &mut Organism> {
        self.species.iter_mut().flat_map(|s| s.members.iter_mut())
    }

    /// The fittest organism by raw fitness. An incomparable fitness pair
    /// ranks as equal.
    pub fn champion(&self) -> Option<&Organism> {
        self.organisms().max_by(|l, r| {
            l.fitness
                .partial_cmp(&r.fitness)
                .unwrap_or(core::cmp::Ordering::Equal)
        })
    }

    pub fn species_by_id(&self, id: SpeciesId) -> Option<&Species> {
        self.species.iter().find(|s| s.id == id)
    }

    fn species_index(&self, id: SpeciesId) -> Option<usize> {
        self.species.iter().position(|s| s.id == id)
    }

    pub fn innovations(&self) -> &InnovationLog {
        &self.innovations
    }

    /// Advance one generation: share fitness, allocate offspring quotas,
    /// drop the losers, reproduce species by species, and re-publish the
    /// next generation under fresh contiguous ids.
    pub fn epoch(&mut self, rng: &mut impl RngCore) -> Result<()> {
        if self.species.is_empty() {
            return Err(Error::invariant("no species in population"));
        }
        let size = self.size();
        if size == 0 {
            return Err(Error::invariant("no organisms in population"));
        }
        let params = self.params.clone();
        let generation = self.gen;

        // fitness sharing, survivor marking, per-species sorting
        for s in &mut self.species {
            s.adjust_fit(&params);
        }

        // rank species by champion fitness, stable and descending
        let sorted_ids: Vec<SpeciesId> = {
            let mut ranked: Vec<(SpeciesId, f64)> =
                self.species.iter().map(|s| (s.id, s.max_fitness)).collect();
            ranked.sort_by(|l, r| r.1.partial_cmp(&l.1).unwrap_or(core::cmp::Ordering::Equal));
            ranked.into_iter().map(|(id, _)| id).collect()
        };

        // per-organism quotas around the population mean, then whole
        // offspring per species with a running fractional carry
        let avg_fit: f64 = self.organisms().map(|o| o.fitness).sum::<f64>() / size as f64;
        for o in self.organisms_mut() {
            o.expected_offspring = if avg_fit > 0.0 { o.fitness / avg_fit } else { 1.0 };
        }
        let mut carry = 0.0;
        let mut total_expected = 0usize;
        for s in &mut self.species {
            s.count_offspring(&mut carry);
            total_expected += s.expected_offspring;
        }
        if total_expected < size {
            // rounding lost a slot; the species expecting the most gets it
            let mut best = 0;
            let mut most = 0;
            for (i, s) in self.species.iter().enumerate() {
                if most <= s.expected_offspring {
                    most = s.expected_offspring;
                    best = i;
                }
            }
            self.species[best].expected_offspring += 1;
            total_expected += 1;
            if total_expected < size {
                // a dominant stagnant species lost its quota to the age
                // penalty; hand it the whole population
                for s in &mut self.species {
                    s.expected_offspring = 0;
                }
                self.species[best].expected_offspring = size;
            }
        }

        // population-level record keeping
        self.champ_fit = self
            .species_by_id(sorted_ids[0])
            .and_then(Species::champion)
            .map_or(0.0, |o| o.orig_fit);
        if self.champ_fit > self.champ_fit_ever {
            self.champ_fit_ever = self.champ_fit;
            self.stagnant_gens = 0;
        } else {
            self.stagnant_gens += 1;
        }

        // stagnation rescue: restart allocation from the two best species
        if self.stagnant_gens >= params.stagnant_gen {
            self.stagnant_gens = 0;
            if self.species.len() == 1 {
                self.species[0].expected_offspring = size;
            } else {
                for s in &mut self.species {
                    s.expected_offspring = 0;
                }
                let half = size / 2;
                for (id, share) in [(sorted_ids[0], half), (sorted_ids[1], size - half)] {
                    let i = self
                        .species_index(id)
                        .ok_or_else(|| Error::invariant("ranked species disappeared"))?;
                    self.species[i].expected_offspring = share;
                    self.species[i].record_age_improved();
                }
            }
        }

        // sweep the eliminated, freeze the parent pools
        for s in &mut self.species {
            s.members.retain(|o| !o.eliminate);
            s.parent_count = s.members.len();
        }

        // reproduce in list order; species appended during this loop are
        // novel and wait out the epoch
        let mut i = 0;
        while i < self.species.len() {
            if !self.species[i].novel {
                self.reproduce_species(i, &sorted_ids, generation, &params, rng)?;
            }
            i += 1;
        }

        // retire the parent generation
        for s in &mut self.species {
            let parents = s.parent_count.min(s.members.len());
            s.members.drain(..parents);
            s.parent_count = 0;
        }

        // prune empty species, age the rest, publish this epoch's novelty
        self.species.retain(|s| !s.is_empty());
        if self.species.is_empty() {
            return Err(Error::invariant("every species went extinct during reproduction"));
        }
        for s in &mut self.species {
            if s.novel {
                s.novel = false;
            } else {
                s.age += 1;
            }
        }

        // contiguous organism ids for the new generation
        let mut oid = 0;
        for s in &mut self.species {
            for o in &mut s.members {
                o.set_id(oid);
                oid += 1;
            }
        }

        self.gen += 1;
        Ok(())
    }

    /// Produce one species' quota of children and speciate each of them.
    fn reproduce_species(
        &mut self,
        si: usize,
        sorted_ids: &[SpeciesId],
        generation: usize,
        params: &Params,
        rng: &mut impl RngCore,
    ) -> Result<()> {
        let expected = self.species[si].expected_offspring;
        if expected == 0 {
            return Ok(());
        }
        let parents = self.species[si].parent_count;
        if parents == 0 {
            return Err(Error::invariant(format!(
                "species #{} owes {expected} offspring with no survivors",
                self.species[si].id
            )));
        }

        let mut champ_done = false;
        for count in 0..expected {
            let child = if !champ_done && expected > 5 {
                champ_done = true;
                self.species[si].members[0].duplicate(count, generation)
            } else if happens(rng, params.mutate_only_prob) {
                let idx = rng.random_range(0..parents);
                let mut child = self.species[si].members[idx].duplicate(count, generation);
                self.evolve_child(&mut child, params, rng);
                child
            } else {
                let mom_idx = rng.random_range(0..parents);
                let (dad_si, dad_idx) = if happens(rng, params.mate_within_species_rate) {
                    (si, rng.random_range(0..parents))
                } else {
                    // half-normal pick over the fitness-ranked species,
                    // mating with that species' representative
                    let rank = species_rank(rng);
                    let pick = (rank * (sorted_ids.len() - 1) as f64 + 0.5).floor() as usize;
                    let id = sorted_ids[pick.min(sorted_ids.len() - 1)];
                    let di = self
                        .species_index(id)
                        .ok_or_else(|| Error::invariant("ranked species disappeared"))?;
                    (di, 0)
                };

                if dad_si == si && dad_idx == mom_idx {
                    // both parents are the same organism: mutate instead
                    let mut child = self.species[si].members[mom_idx].duplicate(count, generation);
                    self.evolve_child(&mut child, params, rng);
                    child
                } else {
                    let mom = &self.species[si].members[mom_idx];
                    let dad = &self.species[dad_si].members[dad_idx];
                    // the mother is the fitter parent
                    let (mom, dad) = if mom.orig_fit < dad.orig_fit {
                        (dad, mom)
                    } else {
                        (mom, dad)
                    };
                    let dad = dad.clone();
                    let mut child = mom.duplicate(count, generation);
                    // a cross-template father cannot blend; the duplicate
                    // of the mother stands as-is
                    let _ = child.crossover(&dad, rng);
                    child
                }
            };
            self.adopt(child);
        }
        Ok(())
    }

    fn evolve_child(&mut self, child: &mut Organism, params: &Params, rng: &mut impl RngCore) {
        child.evolve(
            &mut self.next_neuron_id,
            &mut self.next_conn_id,
            &mut self.innovations,
            self.plastic_phase,
            params,
            rng,
        );
    }

    /// File a child under the first species whose representative it is
    /// compatible with, or open a fresh (novel) species for it.
    fn adopt(&mut self, mut child: Organism) {
        let params = &self.params;
        match self.species.iter().position(|s| {
            s.champion()
                .is_some_and(|rep| child.compat_distance(rep, params) < params.compat_threshold)
        }) {
            Some(i) => {
                child.species = self.species[i].id;
                self.species[i].members.push(child);
            }
            None => {
                let id = self.next_species_id;
                self.next_species_id += 1;
                let mut s = Species::new(id);
                child.species = id;
                s.members.push(child);
                self.species.push(s);
            }
        }
    }

    /// Re-establish links and validate structure after deserialisation.
    pub fn after_load(&mut self) -> Result<()> {
        for s in &mut self.species {
            for o in &mut s.members {
                o.species = s.id;
                o.net.after_load()?;
            }
        }
        if self.species.iter().any(Species::is_empty) {
            return Err(Error::invariant("loaded population contains an empty species"));
        }
        Ok(())
    }
}

impl core::fmt::Display for Population {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "pop: gen #{} ids ({}, {}, {}); champ_fit = {}, champ_fit_ever = {}, solved = {}; size = {}",
            self.gen,
            self.next_neuron_id,
            self.next_conn_id,
            self.next_species_id,
            self.champ_fit,
            self.champ_fit_ever,
            self.solved,
            self.size()
        )
    }
}
