//! Baseline with the random policy.
use anyhow::Result;
use gridplan_core::{
    record::{Record, Recorder},
    util::eval_with_recorder,
    Configurable, DefaultEvaluator, Env, Evaluator,
};
use gridplan_toy_text::{RandomPolicy, RandomPolicyConfig, ToyTextEnv, ToyTextEnvConfig};

fn random_policy(seed: i64) -> RandomPolicy {
    RandomPolicy::build(RandomPolicyConfig {
        n_actions: 4,
        seed: seed as u64,
    })
}

/// Evaluates [`RandomPolicy`] for `n_episodes` episodes.
pub fn eval_random(env_config: &ToyTextEnvConfig, seed: i64, n_episodes: usize) -> Result<Record> {
    let mut evaluator = DefaultEvaluator::<ToyTextEnv>::new(env_config, seed, n_episodes)?;
    evaluator.evaluate(&mut random_policy(seed))
}

/// Runs [`RandomPolicy`] for `n_episodes` episodes, writing every step to
/// `recorder`. Returns the return of each episode.
pub fn record_random<R: Recorder>(
    env_config: &ToyTextEnvConfig,
    seed: i64,
    n_episodes: usize,
    recorder: &mut R,
) -> Result<Vec<f32>> {
    let mut env = ToyTextEnv::build(env_config, seed)?;
    eval_with_recorder(&mut env, &mut random_policy(seed), n_episodes, recorder)
}
