//! Environment.
use super::{Act, Info, Obs, Step};
use crate::{record::Record, Discrete};
use anyhow::Result;

/// Represents an environment, typically an MDP.
pub trait Env {
    /// Configurations.
    type Config: Clone;

    /// Observation of the environment.
    type Obs: Obs;

    /// Action of the environment.
    type Act: Act;

    /// Information in the [`Step`] object.
    type Info: Info;

    /// Builds an environment with a given random seed.
    fn build(config: &Self::Config, seed: i64) -> Result<Self>
    where
        Self: Sized;

    /// Performes an environment step.
    ///
    /// The outcome depends only on the internal state of the environment
    /// and the given action.
    fn step(&mut self, a: &Self::Act) -> Result<(Step<Self>, Record)>
    where
        Self: Sized;

    /// Resets the environment and returns the initial observation.
    fn reset(&mut self) -> Result<Self::Obs>;

    /// Resets the environment with a given index.
    ///
    /// The index is used as a random seed, which makes evaluation runs
    /// reproducible. [`DefaultEvaluator`](crate::DefaultEvaluator) calls this
    /// method with the episode index.
    fn reset_with_index(&mut self, ix: usize) -> Result<Self::Obs>;

    /// Performes an environment step and resets the environment if the episode ends.
    ///
    /// The initial observation of the next episode is put in [`Step::init_obs`].
    fn step_with_reset(&mut self, a: &Self::Act) -> Result<(Step<Self>, Record)>
    where
        Self: Sized,
    {
        let (mut step, record) = self.step(a)?;
        if step.is_done() {
            step.init_obs = Some(self.reset()?);
        }
        Ok((step, record))
    }
}

/// An environment with discrete actions and observations.
pub trait DiscreteEnv: Env {
    /// The action space.
    fn action_space(&self) -> &Discrete;

    /// The observation space.
    fn observation_space(&self) -> &Discrete;

    /// Converts an action index into an action.
    fn act_from_index(&self, ix: usize) -> Self::Act;

    /// Converts an observation into its index.
    fn obs_index(&self, obs: &Self::Obs) -> usize;
}
