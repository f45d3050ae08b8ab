//! Configuration file for the `train` command

use std::{fs::File, io::BufReader, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{
    config::{PolicyIterationConfig, QLearningConfig, ValueIterationConfig},
    tictactoe::RewardConfig,
};

/// Every solver's settings plus the reward scheme.
///
/// Missing sections and fields fall back to their defaults, so a file only
/// needs the values it changes:
///
/// ```json
/// { "q_learning": { "episodes": 50000, "epsilon": 0.2 } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingFile {
    pub value_iteration: ValueIterationConfig,
    pub policy_iteration: PolicyIterationConfig,
    pub q_learning: QLearningConfig,
    pub rewards: RewardConfig,
}

impl TrainingFile {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())
            .with_context(|| format!("Failed to open config: {}", path.as_ref().display()))?;
        serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse config: {}", path.as_ref().display()))
    }

    /// Apply a command-line seed to the solvers that draw random numbers.
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        if let Some(seed) = seed {
            self.policy_iteration.seed = Some(seed);
            self.q_learning.seed = Some(seed);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_partial_file() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        write!(file, r#"{{ "q_learning": {{ "episodes": 500 }}, "rewards": {{ "win": 1.0 }} }}"#)?;

        let loaded = TrainingFile::load(file.path())?;
        assert_eq!(loaded.q_learning.episodes, 500);
        assert_eq!(loaded.q_learning.learning_rate, 0.1);
        assert_eq!(loaded.rewards.win, 1.0);
        assert_eq!(loaded.rewards.lose, -10.0);
        assert_eq!(loaded.value_iteration, ValueIterationConfig::default());
        Ok(())
    }

    #[test]
    fn test_seed_override() {
        let file = TrainingFile::default().with_seed(Some(9));
        assert_eq!(file.policy_iteration.seed, Some(9));
        assert_eq!(file.q_learning.seed, Some(9));

        let file = TrainingFile::default().with_seed(None);
        assert_eq!(file.q_learning.seed, None);
    }

    #[test]
    fn test_missing_file() {
        assert!(TrainingFile::load("/nonexistent/ttt-mdp.json").is_err());
    }
}
