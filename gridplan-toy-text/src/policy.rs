//! Random policy.
use crate::{ToyTextAct, ToyTextEnv, ToyTextObs};
use gridplan_core::{Configurable, Policy};
use serde::{Deserialize, Serialize};

/// Configuration of [`RandomPolicy`].
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RandomPolicyConfig {
    pub n_actions: usize,
    pub seed: u64,
}

impl Default for RandomPolicyConfig {
    fn default() -> Self {
        Self {
            n_actions: 4,
            seed: 42,
        }
    }
}

/// Takes uniformly random actions.
pub struct RandomPolicy {
    n_actions: usize,
    rng: fastrand::Rng,
}

impl Configurable for RandomPolicy {
    type Config = RandomPolicyConfig;

    fn build(config: Self::Config) -> Self {
        Self {
            n_actions: config.n_actions,
            rng: fastrand::Rng::with_seed(config.seed),
        }
    }
}

impl Policy<ToyTextEnv> for RandomPolicy {
    fn sample(&mut self, _: &ToyTextObs) -> ToyTextAct {
        self.rng.usize(..self.n_actions).into()
    }
}
