//! Driving an environment with [`StepRecord`]s.
//!
//! [`RecordEnv`] wraps a [`DiscreteEnv`] so that observations and actions are
//! exchanged as one-hot tensors in step records, as tensor-based RL code
//! expects:
//!
//! * [`RecordEnv::reset()`] returns `observation`, `done`, `terminated` and
//!   `truncated`.
//! * [`RecordEnv::step()`] reads `action` and adds a nested `next` record
//!   holding `observation`, `reward`, `done`, `terminated` and `truncated`.
//!
//! The outcome of a step is decided by the state inside the wrapped
//! environment. The `observation` in the input record is not read, so a
//! hand-built record with only an `action` is a valid input.
use anyhow::Result;
use gridplan_core::{error::GridplanError, Discrete, DiscreteEnv, Env, StepRecord};
use log::debug;
use ndarray::{ArrayD, Ix1, IxDyn};
use rand::{rngs::SmallRng, SeedableRng};

/// An environment taking and returning [`StepRecord`]s.
#[derive(Debug, Clone)]
pub struct RecordEnv<E> {
    env: E,
    rng: SmallRng,
}

fn flag(v: bool) -> ArrayD<bool> {
    ArrayD::from_elem(IxDyn(&[1]), v)
}

impl<E: DiscreteEnv> RecordEnv<E> {
    /// Wraps an environment. `seed` is used for [`RecordEnv::rand_action()`].
    pub fn new(env: E, seed: u64) -> Self {
        Self {
            env,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// The wrapped environment.
    pub fn inner(&self) -> &E {
        &self.env
    }

    /// The wrapped environment.
    pub fn inner_mut(&mut self) -> &mut E {
        &mut self.env
    }

    /// Unwraps the environment.
    pub fn into_inner(self) -> E {
        self.env
    }

    /// Actions are one-hot vectors over this space.
    pub fn action_spec(&self) -> &Discrete {
        self.env.action_space()
    }

    /// Observations are one-hot vectors over this space.
    pub fn observation_spec(&self) -> &Discrete {
        self.env.observation_space()
    }

    fn obs_tensor(&self, obs: &E::Obs) -> Result<ArrayD<f32>> {
        let ix = self.env.obs_index(obs);
        Ok(self.observation_spec().one_hot(ix)?.into_dyn())
    }

    /// Resets the environment.
    pub fn reset(&mut self) -> Result<StepRecord> {
        let obs = self.env.reset()?;
        let mut record = StepRecord::new(vec![]);
        record.insert("observation", self.obs_tensor(&obs)?)?;
        record.insert("done", flag(false))?;
        record.insert("terminated", flag(false))?;
        record.insert("truncated", flag(false))?;
        Ok(record)
    }

    /// Writes a uniformly random one-hot `action` into the record.
    pub fn rand_action(&mut self, record: &mut StepRecord) -> Result<()> {
        let spec = *self.action_spec();
        let a = spec.sample(&mut self.rng);
        record.insert("action", spec.one_hot(a)?.into_dyn())?;
        Ok(())
    }

    /// Reads the one-hot `action` of the record and steps the environment.
    ///
    /// Returns the input record with the outcome under `next`.
    pub fn step(&mut self, mut record: StepRecord) -> Result<StepRecord> {
        let action = record
            .get_f32("action")?
            .view()
            .into_dimensionality::<Ix1>()
            .map_err(|e| GridplanError::InvalidOneHot(e.to_string()))?;
        let ix = self.action_spec().index_of(action)?;
        let act = self.env.act_from_index(ix);

        let (step, _) = self.env.step(&act)?;
        debug!(
            "action = {}, reward = {}, terminated = {}, truncated = {}",
            ix, step.reward, step.is_terminated, step.is_truncated
        );

        let mut next = StepRecord::new(vec![]);
        next.insert("observation", self.obs_tensor(&step.obs)?)?;
        next.insert("reward", ArrayD::from_elem(IxDyn(&[1]), step.reward))?;
        next.insert("done", flag(step.is_done()))?;
        next.insert("terminated", flag(step.is_terminated))?;
        next.insert("truncated", flag(step.is_truncated))?;
        record.insert_record("next", next)?;

        Ok(record)
    }

    /// Returns the `next` record of a stepped record, to be used as the input
    /// of the following step.
    pub fn step_mdp(record: &StepRecord) -> Result<StepRecord> {
        let next = record.get_record("next")?;
        let mut root = StepRecord::new(record.batch_size().to_vec());
        for key in ["observation", "done", "terminated", "truncated"] {
            root.insert(key, next.get_tensor(key)?.clone())?;
        }
        Ok(root)
    }

    fn empty_trajectory(&self) -> Result<StepRecord> {
        let n_obs = self.observation_spec().n();
        let n_act = self.action_spec().n();
        let flags = || ArrayD::from_elem(IxDyn(&[0, 1]), false);

        let mut next = StepRecord::new(vec![0]);
        next.insert("observation", ArrayD::<f32>::zeros(IxDyn(&[0, n_obs])))?;
        next.insert("reward", ArrayD::<f32>::zeros(IxDyn(&[0, 1])))?;
        let mut traj = StepRecord::new(vec![0]);
        traj.insert("observation", ArrayD::<f32>::zeros(IxDyn(&[0, n_obs])))?;
        traj.insert("action", ArrayD::<f32>::zeros(IxDyn(&[0, n_act])))?;
        for key in ["done", "terminated", "truncated"] {
            next.insert(key, flags())?;
            traj.insert(key, flags())?;
        }
        traj.insert_record("next", next)?;
        Ok(traj)
    }

    /// Runs random actions from a reset until the episode ends or `max_steps`
    /// steps are taken. Returns the steps stacked into a record of batch size `[T]`.
    ///
    /// With `max_steps == 0` the environment is only reset and the trajectory
    /// has batch size `[0]` with the same fields as a non-empty one.
    pub fn rollout(&mut self, max_steps: usize) -> Result<StepRecord> {
        let mut records = vec![];
        let mut record = self.reset()?;
        if max_steps == 0 {
            return self.empty_trajectory();
        }

        for _ in 0..max_steps {
            self.rand_action(&mut record)?;
            let stepped = self.step(record)?;
            let done = stepped.get_bool("next.done")?[[0]];
            record = Self::step_mdp(&stepped)?;
            records.push(stepped);
            if done {
                break;
            }
        }

        Ok(StepRecord::stack(&records)?)
    }
}
