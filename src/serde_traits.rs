//! File and string persistence for every serde-carrying type.
//!
//! The byte-stream representation is serde_json; anything that derives the
//! serde traits picks these up through the blanket impls. Transient
//! activation state (delay buffers, output scratch) is skipped on the way
//! out and rebuilt empty on the way in; call the type's `after_load` where
//! one exists to revalidate links.

use crate::error::Result;
use std::{fs, path::Path};

/// Serialize to a JSON string or file.
pub trait Archive {
    fn to_json(&self) -> Result<String>;

    fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

/// Deserialize from a JSON string or file.
pub trait Restore: Sized {
    fn from_json(s: &str) -> Result<Self>;

    fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }
}

impl<T: serde::Serialize> Archive for T {
    fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl<T: for<'de> serde::Deserialize<'de>> Restore for T {
    fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        network::Network, organism::Organism, params::Params, population::Population,
        random::WyRng,
    };

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("spindle-{}-{name}.json", std::process::id()))
    }

    #[test]
    fn test_population_file_roundtrip() {
        let mut rng = WyRng::seeded(71);
        let template = Organism::new(Network::hybrid(0, 3, 2, 1), 0);
        let pop = Population::spawn(&template, 10, 0, true, Params::default(), &mut rng);

        let path = temp_path("pop");
        pop.to_file(&path).unwrap();
        let mut back = Population::from_file(&path).unwrap();
        back.after_load().unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(back.size(), 10);
        assert_eq!(back.gen, pop.gen);
        assert_eq!(back.species.len(), pop.species.len());
        for (a, b) in pop.organisms().zip(back.organisms()) {
            assert!(a.net.has_same_topology(&b.net));
            assert_eq!(a.net.weights(), b.net.weights());
        }
    }

    #[test]
    fn test_missing_file_surfaces_persistence_error() {
        let err = Population::from_file(temp_path("no-such")).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Persistence);
    }

    #[test]
    fn test_corrupt_stream_surfaces_persistence_error() {
        let err = Network::from_json("{ not json ").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Persistence);
    }

    #[test]
    fn test_organism_roundtrip_keeps_fitness_bookkeeping() {
        let mut o = Organism::new(Network::lif(4, 2, 1, 1), 3);
        o.fitness = 0.75;
        o.orig_fit = 0.8;
        o.winner = true;
        let back = Organism::from_json(&o.to_json().unwrap()).unwrap();
        assert_eq!(back.gen, 3);
        assert_eq!(back.id(), 4);
        assert!(back.winner);
        assert!((back.fitness - 0.75).abs() < 1e-12);
        assert!((back.orig_fit - 0.8).abs() < 1e-12);
    }
}
