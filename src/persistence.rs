//! Saving trained policies to disk.

use std::{
    fmt::Debug,
    fs::File,
    hash::Hash,
    io::{BufReader, BufWriter},
    path::Path,
};

use anyhow::{Context, Result, anyhow, bail};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{
    mdp::Policy,
    solvers::{Solver, SolverKind, TrainingMetadata},
};

/// A policy as written to disk, with the run that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedPolicy<S, A> {
    pub version: u32,
    pub algorithm: SolverKind,
    /// `(state, action)` pairs in the solver's enumeration order
    pub entries: Vec<(S, A)>,
    pub metadata: TrainingMetadata,
}

impl<S, A> SavedPolicy<S, A>
where
    S: Clone + Eq + Hash + Debug,
    A: Clone + Eq + Debug,
{
    pub const VERSION: u32 = 1;

    /// Snapshot the policy of a trained solver.
    pub fn from_solver<T>(solver: &T) -> Result<Self>
    where
        T: Solver<State = S, Action = A>,
    {
        let policy = solver
            .policy()
            .ok_or_else(|| anyhow!("{} has not been trained", solver.name()))?;

        let entries = solver
            .space()
            .states()
            .iter()
            .filter_map(|state| policy.get(state).map(|action| (state.clone(), action.clone())))
            .collect();

        Ok(Self {
            version: Self::VERSION,
            algorithm: solver.kind(),
            entries,
            metadata: solver.metadata(),
        })
    }

    pub fn to_policy(&self) -> Result<Policy<S, A>> {
        if self.version != Self::VERSION {
            bail!(
                "Unsupported policy save format version: {}. Expected {}",
                self.version,
                Self::VERSION
            );
        }
        Ok(self.entries.iter().cloned().collect())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S, A> SavedPolicy<S, A>
where
    S: Serialize + DeserializeOwned,
    A: Serialize + DeserializeOwned,
{
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path.as_ref())
            .with_context(|| format!("Failed to create file: {}", path.as_ref().display()))?;
        let mut writer = BufWriter::new(file);

        rmp_serde::encode::write(&mut writer, self).context("Failed to serialize policy")?;

        Ok(())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())
            .with_context(|| format!("Failed to open file: {}", path.as_ref().display()))?;
        let reader = BufReader::new(file);

        rmp_serde::decode::from_read(reader).context("Failed to deserialize policy")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::ValueIterationConfig,
        mdp::TabularMdp,
        solvers::ValueIteration,
    };

    fn trained() -> ValueIteration<TabularMdp> {
        let mdp = TabularMdp::builder(3)
            .transition(0, 0, 1.0, 1.0, 1)
            .transition(0, 1, 1.0, 0.0, 2)
            .transition(1, 0, 1.0, 5.0, 2)
            .terminal(2)
            .build()
            .unwrap();
        ValueIteration::solve(mdp, ValueIterationConfig::default()).unwrap()
    }

    #[test]
    fn test_untrained_solver_rejected() {
        let mdp = TabularMdp::builder(2)
            .transition(0, 0, 1.0, 1.0, 1)
            .terminal(1)
            .build()
            .unwrap();
        let solver = ValueIteration::new(mdp, ValueIterationConfig::default()).unwrap();
        assert!(SavedPolicy::from_solver(&solver).is_err());
    }

    #[test]
    fn test_entries_follow_enumeration_order() -> Result<()> {
        let saved = SavedPolicy::from_solver(&trained())?;
        assert_eq!(saved.entries, vec![(0, 0), (1, 0)]);
        assert_eq!(saved.algorithm, SolverKind::ValueIteration);
        assert_eq!(saved.metadata.states, 3);
        Ok(())
    }

    #[test]
    fn test_roundtrip_bytes() -> Result<()> {
        let saved = SavedPolicy::from_solver(&trained())?;
        let bytes = rmp_serde::to_vec(&saved)?;
        let loaded: SavedPolicy<usize, usize> = rmp_serde::from_slice(&bytes)?;
        assert_eq!(loaded, saved);

        let policy = loaded.to_policy()?;
        assert_eq!(policy.get(&0), Some(&0));
        assert_eq!(policy.get(&2), None);
        Ok(())
    }

    #[test]
    fn test_unknown_version_rejected() -> Result<()> {
        let mut saved = SavedPolicy::from_solver(&trained())?;
        saved.version = 99;
        let err = saved.to_policy().unwrap_err();
        assert!(err.to_string().contains("version"));
        Ok(())
    }
}
