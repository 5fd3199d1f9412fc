//! Planning episodes with MCTS.
use anyhow::Result;
use gridplan_core::{
    record::{AggregateRecorder, Record, RecordValue, Recorder},
    DiscreteEnv, Env, ObservationEmbedding,
};
use gridplan_mcts::{episode_record, run_episode, MctsConfig};
use gridplan_toy_text::{CoordinateEmbedding, OneHotEmbedding, ToyTextEnv, ToyTextEnvConfig, ToyTextObs};
use log::info;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// How observations are stored in trajectories.
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone, Copy)]
pub enum EmbeddingKind {
    /// [`OneHotEmbedding`].
    OneHot,

    /// [`CoordinateEmbedding`].
    Coordinate,
}

/// Configuration of [`plan()`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct PlanConfig {
    /// The environment.
    pub env: ToyTextEnvConfig,

    /// The planner.
    pub mcts: MctsConfig,

    /// Observation embedding of the trajectories.
    pub embedding: EmbeddingKind,

    /// Number of episodes.
    pub episodes: usize,
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            env: ToyTextEnvConfig::default(),
            mcts: MctsConfig::default().max_episode_length(100),
            embedding: EmbeddingKind::OneHot,
            episodes: 1,
        }
    }
}

impl PlanConfig {
    /// Sets the environment.
    pub fn env(mut self, v: ToyTextEnvConfig) -> Self {
        self.env = v;
        self
    }

    /// Sets the planner.
    pub fn mcts(mut self, v: MctsConfig) -> Self {
        self.mcts = v;
        self
    }

    /// Sets the observation embedding.
    pub fn embedding(mut self, v: EmbeddingKind) -> Self {
        self.embedding = v;
        self
    }

    /// Sets the number of episodes.
    pub fn episodes(mut self, v: usize) -> Self {
        self.episodes = v;
        self
    }

    /// Constructs [`PlanConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`PlanConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

fn embedding(kind: EmbeddingKind, env: &ToyTextEnv) -> Box<dyn ObservationEmbedding<ToyTextObs>> {
    match kind {
        EmbeddingKind::OneHot => Box::new(OneHotEmbedding::new(*env.observation_space())),
        EmbeddingKind::Coordinate => {
            let (nrows, ncols) = env.grid().shape();
            Box::new(CoordinateEmbedding::new(nrows, ncols))
        }
    }
}

/// Plays `config.episodes` episodes with MCTS.
///
/// The summary of every episode, see [`episode_record()`], is written to
/// `recorder` with the episode index under `"episode"` and stored for
/// aggregation, which is flushed at the end. Returns the summaries.
pub fn plan<R>(config: &PlanConfig, recorder: &mut R) -> Result<Vec<Record>>
where
    R: Recorder + AggregateRecorder,
{
    config.mcts.check()?;
    let seed = config.mcts.seed;
    let mut records = vec![];

    for ix in 0..config.episodes {
        let episode_seed = seed + ix as u64;
        let mut env = ToyTextEnv::build(&config.env, episode_seed as i64)?;
        let embedding = embedding(config.embedding, &env);
        let mut mcts = config.mcts.clone().seed(episode_seed).build::<ToyTextEnv>();
        let tree_policy = config.mcts.tree_policy::<ToyTextEnv>();

        let traj = run_episode(
            &mut mcts,
            &mut env,
            tree_policy.as_ref(),
            embedding.as_ref(),
            &config.mcts.episode_config(episode_seed),
        )?;

        let mut record = episode_record(&traj)?;
        record.insert("env", RecordValue::String(config.env.name.clone()));
        info!(
            "Episode {}, return = {}, length = {}, mean entropy = {:.3}",
            ix,
            record.get_scalar("episode_return")?,
            record.get_scalar("episode_length")?,
            record.get_scalar("mean_entropy")?,
        );

        recorder.store(record.clone());
        record.insert("episode", RecordValue::Scalar(ix as f32));
        recorder.write(record.clone());
        records.push(record);
    }
    recorder.flush(config.episodes as i64);

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridplan_core::record::BufferedRecorder;
    use tempdir::TempDir;

    #[test]
    fn test_serde_plan_config() -> Result<()> {
        let config = PlanConfig::default()
            .env(ToyTextEnvConfig::registered("FrozenLake8x8-v1")?.is_slippery(false))
            .embedding(EmbeddingKind::Coordinate)
            .episodes(3);
        let dir = TempDir::new("plan_config")?;
        let path = dir.path().join("plan.yaml");
        config.save(&path)?;
        assert_eq!(PlanConfig::load(&path)?, config);
        Ok(())
    }

    #[test]
    fn test_plan_rejects_negative_temperature() {
        let config = PlanConfig::default().mcts(MctsConfig::default().tree_temperature(Some(-2.0)));
        let mut recorder = BufferedRecorder::new();
        assert!(plan(&config, &mut recorder).is_err());
        assert!(recorder.is_empty());
    }

    #[test]
    fn test_plan_records_episodes() -> Result<()> {
        let config = PlanConfig::default()
            .env(ToyTextEnvConfig::registered("FrozenLake-v1")?)
            .mcts(
                MctsConfig::default()
                    .planning_budget(8)
                    .rollout_budget(10)
                    .max_episode_length(10),
            )
            .embedding(EmbeddingKind::Coordinate)
            .episodes(2);
        let mut recorder = BufferedRecorder::new();
        let records = plan(&config, &mut recorder)?;

        assert_eq!(records.len(), 2);
        assert_eq!(recorder.len(), 2);
        assert_eq!(records[1].get_scalar("episode")?, 1.0);
        let (step, flushed) = &recorder.flushed()[0];
        assert_eq!(*step, 2);
        assert!(flushed.get_scalar("episode_return_mean").is_ok());
        assert_eq!(flushed.get_string("env")?, "FrozenLake-v1");
        assert_eq!(flushed.get_array1("action_counts")?.len(), 4);
        Ok(())
    }
}
