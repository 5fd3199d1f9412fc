//! Probing an environment through step records.
use anyhow::Result;
use gridplan_core::{
    util::{time_clones, CloneTiming},
    StepRecord,
};
use gridplan_toy_text::{make, RecordEnv};
use log::info;
use ndarray::Ix1;

/// Outcome of [`probe()`].
#[derive(Debug, Clone)]
pub struct ProbeReport {
    /// Record returned by the reset.
    pub reset: StepRecord,

    /// The hand-built record after the step, with its `next` record.
    pub stepped: StepRecord,

    /// Index of the observation after the step.
    pub next_state: usize,

    /// Cost of copying the environment.
    pub timing: CloneTiming,
}

/// Builds an environment by name, resets it, takes `action` with a
/// hand-built step record and times `copies` deep copies of the
/// environment.
pub fn probe(env_name: &str, seed: i64, action: usize, copies: usize) -> Result<ProbeReport> {
    let mut env = RecordEnv::new(make(env_name, seed)?, seed as u64);
    info!("Action spec: {:?}", env.action_spec());
    info!("Observation spec: {:?}", env.observation_spec());

    let reset = env.reset()?;
    info!("Reset:\n{}", reset);

    let one_hot = env.action_spec().one_hot(action)?;
    let record = StepRecord::new(vec![]).with("action", one_hot.into_dyn())?;
    let stepped = env.step(record)?;
    info!("Step:\n{}", stepped);

    let next = stepped.get_record("next")?;
    let next_obs = next.get_f32("observation")?.view().into_dimensionality::<Ix1>()?;
    let next_state = env.observation_spec().index_of(next_obs)?;
    info!("next.observation = {}", next_state);
    info!("next.reward = {}", next.get_f32("reward")?[[0]]);
    info!("next.done = {}", next.get_bool("done")?[[0]]);
    info!("next.terminated = {}", next.get_bool("terminated")?[[0]]);
    info!("next.truncated = {}", next.get_bool("truncated")?[[0]]);
    info!("{}", env.inner().render());

    let timing = time_clones(env.inner(), copies);

    Ok(ProbeReport {
        reset,
        stepped,
        next_state,
        timing,
    })
}
