//! Toy-text environments.
mod cliff_walking;
mod frozen_lake;
use crate::{ToyTextAct, ToyTextEnvConfig, ToyTextObs};
use anyhow::{bail, Result};
use gridplan_core::{
    error::GridplanError, record::Record, Discrete, DiscreteEnv, Env, Info, Step,
};
use log::trace;
use rand::{rngs::SmallRng, SeedableRng};

/// Probability of the transition that happened.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToyTextInfo {
    pub prob: f32,
}

impl Info for ToyTextInfo {}

/// Layout and dynamics of a grid.
#[derive(Debug, Clone, PartialEq)]
pub enum Grid {
    /// The 4x12 cliff.
    CliffWalking,

    /// A frozen lake given by its map.
    FrozenLake {
        desc: Vec<Vec<u8>>,
        is_slippery: bool,
    },
}

impl Grid {
    fn from_config(config: &ToyTextEnvConfig) -> Result<Self> {
        match config.name.as_str() {
            "CliffWalking-v0" => Ok(Self::CliffWalking),
            "FrozenLake-v1" | "FrozenLake8x8-v1" => {
                let desc = match (&config.desc, config.map_name.as_str()) {
                    (Some(rows), _) => frozen_lake::parse_desc(rows)?,
                    (None, "4x4") => frozen_lake::parse_desc(&frozen_lake::MAP_4X4)?,
                    (None, "8x8") => frozen_lake::parse_desc(&frozen_lake::MAP_8X8)?,
                    (None, name) => bail!("Unknown FrozenLake map: {}", name),
                };
                Ok(Self::FrozenLake {
                    desc,
                    is_slippery: config.is_slippery,
                })
            }
            name => Err(GridplanError::UnknownEnv(name.to_string()).into()),
        }
    }

    /// `(nrows, ncols)`.
    pub fn shape(&self) -> (usize, usize) {
        match self {
            Self::CliffWalking => (cliff_walking::NROWS, cliff_walking::NCOLS),
            Self::FrozenLake { desc, .. } => (desc.len(), desc[0].len()),
        }
    }

    /// The number of cells.
    pub fn n_states(&self) -> usize {
        let (nrows, ncols) = self.shape();
        nrows * ncols
    }

    /// The cell where episodes start.
    pub fn initial_state(&self) -> usize {
        match self {
            Self::CliffWalking => cliff_walking::START,
            Self::FrozenLake { desc, .. } => frozen_lake::start_state(desc),
        }
    }
}

/// A gridworld environment.
///
/// The environment keeps the current cell, the number of elapsed steps and a
/// random number generator. [`Clone`] copies all of them, so a clone evolves
/// exactly like the environment it was cloned from under the same actions.
#[derive(Debug, Clone)]
pub struct ToyTextEnv {
    name: String,
    grid: Grid,
    state: usize,
    rng: SmallRng,
    elapsed_steps: usize,
    max_episode_steps: Option<usize>,
    last_action: Option<usize>,
    action_space: Discrete,
    observation_space: Discrete,
}

impl ToyTextEnv {
    /// Name of the environment.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Layout of the grid.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Index of the cell the agent stands on.
    pub fn state(&self) -> usize {
        self.state
    }

    /// Number of steps since the last reset.
    pub fn elapsed_steps(&self) -> usize {
        self.elapsed_steps
    }

    /// Reseeds the random number generator and resets the environment.
    pub fn reset_with_seed(&mut self, seed: u64) -> Result<ToyTextObs> {
        self.rng = SmallRng::seed_from_u64(seed);
        self.reset()
    }

    /// Returns a text picture of the grid with the agent on it.
    pub fn render(&self) -> String {
        match &self.grid {
            Grid::CliffWalking => cliff_walking::render(self.state),
            Grid::FrozenLake { desc, .. } => {
                frozen_lake::render(desc, self.state, self.last_action)
            }
        }
    }
}

impl Env for ToyTextEnv {
    type Config = ToyTextEnvConfig;
    type Obs = ToyTextObs;
    type Act = ToyTextAct;
    type Info = ToyTextInfo;

    fn build(config: &Self::Config, seed: i64) -> Result<Self>
    where
        Self: Sized,
    {
        let grid = Grid::from_config(config)?;
        let n_states = grid.n_states();

        Ok(Self {
            name: config.name.clone(),
            state: grid.initial_state(),
            grid,
            rng: SmallRng::seed_from_u64(seed as u64),
            elapsed_steps: 0,
            max_episode_steps: config.max_episode_steps,
            last_action: None,
            action_space: Discrete::new(4),
            observation_space: Discrete::new(n_states),
        })
    }

    fn reset(&mut self) -> Result<Self::Obs> {
        self.state = self.grid.initial_state();
        self.elapsed_steps = 0;
        self.last_action = None;
        Ok(self.state.into())
    }

    fn reset_with_index(&mut self, ix: usize) -> Result<Self::Obs> {
        self.reset_with_seed(ix as u64)
    }

    fn step(&mut self, a: &Self::Act) -> Result<(Step<Self>, Record)>
    where
        Self: Sized,
    {
        if !self.action_space.contains(a.act) {
            return Err(GridplanError::InvalidAction {
                action: a.act,
                n: self.action_space.n(),
            }
            .into());
        }

        let (next, reward, is_terminated, prob) = match &self.grid {
            Grid::CliffWalking => {
                let (next, reward, terminated) = cliff_walking::transition(self.state, a.act);
                (next, reward, terminated, 1.0)
            }
            Grid::FrozenLake { desc, is_slippery } => {
                let (next, reward, terminated) =
                    frozen_lake::transition(desc, *is_slippery, self.state, a.act, &mut self.rng);
                let prob = if *is_slippery { 1.0 / 3.0 } else { 1.0 };
                (next, reward, terminated, prob)
            }
        };
        trace!("{}: {} --{}--> {}", self.name, self.state, a.act, next);

        self.state = next;
        self.last_action = Some(a.act);
        self.elapsed_steps += 1;
        let is_truncated = self
            .max_episode_steps
            .map_or(false, |max| self.elapsed_steps >= max);

        let step = Step::new(
            next.into(),
            *a,
            reward,
            is_terminated,
            is_truncated,
            ToyTextInfo { prob },
        );

        Ok((step, Record::empty()))
    }
}

impl DiscreteEnv for ToyTextEnv {
    fn action_space(&self) -> &Discrete {
        &self.action_space
    }

    fn observation_space(&self) -> &Discrete {
        &self.observation_space
    }

    fn act_from_index(&self, ix: usize) -> Self::Act {
        ix.into()
    }

    fn obs_index(&self, obs: &Self::Obs) -> usize {
        obs.state
    }
}

/// Builds a registered environment by name.
pub fn make(name: &str, seed: i64) -> Result<ToyTextEnv> {
    let config = ToyTextEnvConfig::registered(name)?;
    ToyTextEnv::build(&config, seed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walk(env: &mut ToyTextEnv, acts: &[usize]) -> Vec<(usize, f32, bool, bool)> {
        acts.iter()
            .map(|&a| {
                let (step, _) = env.step(&a.into()).unwrap();
                (step.obs.state, step.reward, step.is_terminated, step.is_truncated)
            })
            .collect()
    }

    #[test]
    fn test_make_cliff_walking() -> Result<()> {
        let env = make("CliffWalking-v0", 0)?;
        assert_eq!(env.action_space().n(), 4);
        assert_eq!(env.observation_space().n(), 48);
        assert_eq!(env.state(), 36);
        assert!(make("MountainCar-v0", 0).is_err());
        Ok(())
    }

    #[test]
    fn test_cliff_walking_safe_path() -> Result<()> {
        let mut env = make("CliffWalking-v0", 0)?;
        env.reset()?;
        let mut acts = vec![0];
        acts.extend(std::iter::repeat(1).take(11));
        acts.push(2);
        let steps = walk(&mut env, &acts);
        let total: f32 = steps.iter().map(|s| s.1).sum();
        assert_eq!(total, -13.0);
        assert_eq!(steps.last().unwrap(), &(47, -1.0, true, false));
        assert!(steps[..12].iter().all(|s| !s.2));
        Ok(())
    }

    #[test]
    fn test_invalid_action() -> Result<()> {
        let mut env = make("CliffWalking-v0", 0)?;
        let err = env.step(&ToyTextAct::new(4)).err().unwrap();
        assert_eq!(
            err.downcast_ref::<GridplanError>(),
            Some(&GridplanError::InvalidAction { action: 4, n: 4 })
        );
        assert_eq!(env.state(), 36);
        Ok(())
    }

    #[test]
    fn test_truncation() -> Result<()> {
        let config = ToyTextEnvConfig::registered("FrozenLake-v1")?
            .is_slippery(false)
            .max_episode_steps(Some(3));
        let mut env = ToyTextEnv::build(&config, 0)?;
        env.reset()?;
        let steps = walk(&mut env, &[0, 0, 0]);
        assert_eq!(steps[1], (0, 0.0, false, false));
        assert_eq!(steps[2], (0, 0.0, false, true));
        assert_eq!(env.reset()?.state, 0);
        assert_eq!(env.elapsed_steps(), 0);
        Ok(())
    }

    #[test]
    fn test_step_with_reset() -> Result<()> {
        let config = ToyTextEnvConfig::registered("FrozenLake-v1")?.is_slippery(false);
        let mut env = ToyTextEnv::build(&config, 0)?;
        env.reset()?;
        let (step, _) = env.step_with_reset(&ToyTextAct::new(1))?;
        assert_eq!(step.obs.state, 4);
        assert!(step.init_obs.is_none());
        let (step, _) = env.step_with_reset(&ToyTextAct::new(1))?;
        assert_eq!(step.obs.state, 8);
        assert!(!step.is_done());
        let (step, _) = env.step_with_reset(&ToyTextAct::new(1))?;
        assert!(step.is_terminated);
        assert_eq!(step.obs.state, 12);
        assert_eq!(step.init_obs, Some(ToyTextObs::from(0)));
        assert_eq!(env.state(), 0);
        Ok(())
    }

    #[test]
    fn test_clone_is_independent() -> Result<()> {
        let config = ToyTextEnvConfig::registered("FrozenLake8x8-v1")?;
        let mut env = ToyTextEnv::build(&config, 3)?;
        env.reset()?;
        let mut copy = env.clone();
        let a = walk(&mut env, &[2, 2, 1, 1, 2, 1]);
        let b = walk(&mut copy, &[2, 2, 1, 1, 2, 1]);
        assert_eq!(a, b);

        copy.reset()?;
        assert_eq!(copy.state(), 0);
        assert_eq!(env.state(), a.last().unwrap().0);
        Ok(())
    }

    #[test]
    fn test_reset_with_index_is_reproducible() -> Result<()> {
        let mut env = make("FrozenLake-v1", 0)?;
        env.reset_with_index(5)?;
        let a = walk(&mut env, &[2, 2, 1]);
        env.reset_with_index(5)?;
        let b = walk(&mut env, &[2, 2, 1]);
        assert_eq!(a, b);
        Ok(())
    }

    #[test]
    fn test_custom_map() -> Result<()> {
        let config = ToyTextEnvConfig::registered("FrozenLake-v1")?
            .is_slippery(false)
            .desc(vec!["SFG".to_string()]);
        let mut env = ToyTextEnv::build(&config, 0)?;
        assert_eq!(env.observation_space().n(), 3);
        let steps = walk(&mut env, &[2, 2]);
        assert_eq!(steps[1], (2, 1.0, true, false));
        assert!(env.render().contains("[G]"));
        Ok(())
    }
}
