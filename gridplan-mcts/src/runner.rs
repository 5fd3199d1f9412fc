//! Running episodes with a planner.
use crate::{policy::TreeEvaluationPolicy, Mcts};
use anyhow::Result;
use gridplan_core::{
    record::{Record, RecordValue},
    DiscreteEnv, Env, ObservationEmbedding, StepRecord,
};
use log::debug;
use ndarray::{Array1, ArrayD, Axis, Ix2, IxDyn};
use rand::{rngs::SmallRng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Configuration of [`run_episode()`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct EpisodeConfig {
    /// Root visits of the tree before each action.
    pub planning_budget: usize,

    /// Maximum length of the episode, which is also the batch size of the
    /// trajectory.
    pub max_steps: usize,

    /// If `true`, the subtree of the taken action is kept for the next step.
    /// Otherwise the tree is searched from scratch at every step.
    pub step_into: bool,

    /// Seed of the reset of the environment and of action sampling.
    pub seed: u64,

    /// Observation index whose visit count is logged at every step.
    pub goal_obs: Option<usize>,
}

impl Default for EpisodeConfig {
    fn default() -> Self {
        Self {
            planning_budget: 1000,
            max_steps: 1000,
            step_into: false,
            seed: 0,
            goal_obs: None,
        }
    }
}

impl EpisodeConfig {
    /// Sets the planning budget.
    pub fn planning_budget(mut self, v: usize) -> Self {
        self.planning_budget = v;
        self
    }

    /// Sets the maximum length of the episode.
    pub fn max_steps(mut self, v: usize) -> Self {
        self.max_steps = v;
        self
    }

    /// Sets whether to step into the subtree of the taken action.
    pub fn step_into(mut self, v: bool) -> Self {
        self.step_into = v;
        self
    }

    /// Sets the seed.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }

    /// Sets the observation whose visit count is logged.
    pub fn goal_obs(mut self, v: Option<usize>) -> Self {
        self.goal_obs = v;
        self
    }
}

fn scalar<T: Clone>(v: T) -> ArrayD<T> {
    ArrayD::from_elem(IxDyn(&[]), v)
}

fn empty_trajectory(max_steps: usize, obs_dim: usize, n: usize) -> Result<StepRecord> {
    let mut traj = StepRecord::new(vec![max_steps]);
    traj.insert("observations", ArrayD::<f32>::zeros(IxDyn(&[max_steps, obs_dim])))?;
    traj.insert("rewards", ArrayD::<f32>::zeros(IxDyn(&[max_steps])))?;
    traj.insert(
        "policy_distributions",
        ArrayD::<f32>::zeros(IxDyn(&[max_steps, n])),
    )?;
    traj.insert("actions", ArrayD::<i64>::zeros(IxDyn(&[max_steps])))?;
    traj.insert("mask", ArrayD::from_elem(IxDyn(&[max_steps]), false))?;
    traj.insert("terminals", ArrayD::from_elem(IxDyn(&[max_steps]), false))?;
    traj.insert("root_values", ArrayD::<f32>::zeros(IxDyn(&[max_steps])))?;
    traj.insert("child_q_values", ArrayD::<f32>::zeros(IxDyn(&[max_steps, n])))?;
    Ok(traj)
}

/// Runs an episode, planning before every action.
///
/// At each step the tree is searched with `planning_budget` root visits, an
/// action is sampled from the distribution of `tree_policy` at the root and
/// the environment is stepped. The returned trajectory has batch size
/// `[max_steps]` with the fields
///
/// * `observations`: embedded observation the action was taken on, `[T, obs_dim]`
/// * `rewards`: reward of the step, `[T]`
/// * `policy_distributions`: distribution the action was sampled from, `[T, n]`
/// * `actions`: the action, `[T]`
/// * `mask`: `true` for the steps that happened, `[T]`
/// * `terminals`: the episode terminated on the step, `[T]`
/// * `root_values`: value evaluation of the root, `[T]`
/// * `child_q_values`: mean returns of the root children, 0 if unexpanded, `[T, n]`
///
/// Rows after the end of the episode are left zero with `mask` false.
pub fn run_episode<E, P, M>(
    solver: &mut Mcts<E>,
    env: &mut E,
    tree_policy: &P,
    embedding: &M,
    config: &EpisodeConfig,
) -> Result<StepRecord>
where
    E: DiscreteEnv + Clone,
    P: TreeEvaluationPolicy<E> + ?Sized,
    M: ObservationEmbedding<E::Obs> + ?Sized,
{
    let n = env.action_space().n();
    let budget = config.planning_budget;
    let mut rng = SmallRng::seed_from_u64(config.seed);
    let mut traj = empty_trajectory(config.max_steps, embedding.obs_dim(), n)?;

    let obs = env.reset_with_index(config.seed as usize)?;
    let mut obs_tensor = embedding.obs_to_tensor(&obs)?;
    let mut tree = solver.search(env, budget, obs, 0.0)?;

    for t in 0..config.max_steps {
        let root = tree.root();
        let root_value = tree[root].value_evaluation;
        let q: Vec<f32> = tree
            .child_q_values(root)
            .into_iter()
            .map(|q| q.unwrap_or(0.0))
            .collect();
        let dist = tree_policy.distribution(&tree, root);
        let action = dist.sample(&mut rng);

        if let Some(goal) = config.goal_obs {
            let counts = tree.state_visitation_counts(|o| env.obs_index(o));
            debug!("visits to goal state: {}", counts.get(&goal).unwrap_or(&0));
        }

        let act = env.act_from_index(action);
        let (step, _) = env.step(&act)?;

        traj.set_row("observations", t, obs_tensor.into_dyn())?;
        traj.set_row("rewards", t, scalar(step.reward))?;
        traj.set_row(
            "policy_distributions",
            t,
            Array1::from(dist.probs().to_vec()).into_dyn(),
        )?;
        traj.set_row("actions", t, scalar(action as i64))?;
        traj.set_row("mask", t, scalar(true))?;
        traj.set_row("terminals", t, scalar(step.is_terminated))?;
        traj.set_row("root_values", t, scalar(root_value))?;
        traj.set_row("child_q_values", t, Array1::from(q).into_dyn())?;

        debug!(
            "{}. a = {}, r = {}, terminated = {}, norm entropy = {:.2}, policy = {:?}",
            t,
            action,
            step.reward,
            step.is_terminated,
            normalized_entropy(dist.entropy(), n),
            dist.probs()
        );

        if step.is_done() {
            break;
        }

        obs_tensor = embedding.obs_to_tensor(&step.obs)?;
        let subtree_root = tree[root].child(action);
        tree = match (config.step_into, subtree_root) {
            (true, Some(child)) => {
                let mut subtree = tree.reroot(child)?;
                solver.build_tree(&mut subtree, budget)?;
                subtree
            }
            _ => solver.search(env, budget, step.obs, step.reward)?,
        };
    }

    Ok(traj)
}

fn normalized_entropy(entropy: f32, n: usize) -> f32 {
    match n {
        0 | 1 => 0.0,
        n => entropy / (n as f32).ln(),
    }
}

/// Summarises a trajectory of [`run_episode()`].
///
/// The record has `episode_return`, `episode_length`, `mean_entropy`, the
/// mean of the policy entropies normalised by the log of the number of
/// actions, and `action_counts`, how often each action was taken.
pub fn episode_record(trajectory: &StepRecord) -> Result<Record> {
    let mask = trajectory.get_bool("mask")?;
    let rewards = trajectory.get_f32("rewards")?;
    let actions = trajectory.get_i64("actions")?;
    let dists = trajectory
        .get_f32("policy_distributions")?
        .view()
        .into_dimensionality::<Ix2>()?;
    let n = dists.shape()[1];

    let mut ret = 0.0;
    let mut len = 0;
    let mut entropy = 0.0;
    let mut action_counts = vec![0f32; n];
    for (i, dist) in dists.axis_iter(Axis(0)).enumerate() {
        if !mask[[i]] {
            continue;
        }
        ret += rewards[[i]];
        len += 1;
        if let Some(c) = action_counts.get_mut(actions[[i]] as usize) {
            *c += 1.0;
        }
        let h: f32 = -dist
            .iter()
            .filter(|&&p| p > 0.0)
            .map(|p| p * p.ln())
            .sum::<f32>();
        entropy += normalized_entropy(h, n);
    }
    let mean_entropy = match len {
        0 => 0.0,
        len => entropy / len as f32,
    };

    Ok(Record::from_slice(&[
        ("episode_return", RecordValue::Scalar(ret)),
        ("episode_length", RecordValue::Scalar(len as f32)),
        ("mean_entropy", RecordValue::Scalar(mean_entropy)),
        ("action_counts", RecordValue::Array1(action_counts)),
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        evaluator::{RandomRolloutEvaluator, ZeroEvaluator},
        policy::{GreedyPolicy, Uct, VisitationPolicy},
    };
    use gridplan_toy_text::{make, OneHotEmbedding, ToyTextEnv, ToyTextEnvConfig};
    use ndarray::arr1;

    #[test]
    fn test_run_episode_on_cliff() -> Result<()> {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut env = make("CliffWalking-v0", 0)?;
        let embedding = OneHotEmbedding::new(*env.observation_space());
        let mut mcts = Mcts::new(Uct::new(1.0), RandomRolloutEvaluator::new(10, 0));
        let config = EpisodeConfig::default().planning_budget(20).max_steps(15);
        let traj = run_episode(
            &mut mcts,
            &mut env,
            &VisitationPolicy::new(None),
            &embedding,
            &config,
        )?;

        assert_eq!(traj.batch_size(), &[15]);
        assert_eq!(traj.get_f32("observations")?.shape(), &[15, 48]);
        assert_eq!(traj.get_f32("child_q_values")?.shape(), &[15, 4]);
        // The first observation is the start cell.
        assert_eq!(traj.get_f32("observations")?[[0, 36]], 1.0);

        let mask = traj.get_bool("mask")?;
        let dists = traj.get_f32("policy_distributions")?;
        let actions = traj.get_i64("actions")?;
        let len = mask.iter().filter(|&&m| m).count();
        assert!(len >= 13);
        assert!(mask.iter().take(len).all(|&m| m));
        for i in 0..len {
            let sum: f32 = (0..4).map(|a| dists[[i, a]]).sum();
            assert!((sum - 1.0).abs() < 1e-5);
            assert!((0..4).contains(&actions[[i]]));
        }
        Ok(())
    }

    #[test]
    fn test_planner_takes_adjacent_goal() -> Result<()> {
        let config = ToyTextEnvConfig::registered("FrozenLake-v1")?
            .is_slippery(false)
            .desc(vec!["SG".to_string()]);
        let mut env = ToyTextEnv::build(&config, 0)?;
        let embedding = OneHotEmbedding::new(*env.observation_space());
        let mut mcts = Mcts::new(Uct::new(1.0), ZeroEvaluator);
        let episode = EpisodeConfig::default().planning_budget(30).max_steps(10);
        let traj = run_episode(&mut mcts, &mut env, &GreedyPolicy::new(None), &embedding, &episode)?;

        assert_eq!(traj.get_i64("actions")?[[0]], 2);
        assert!(traj.get_bool("terminals")?[[0]]);
        assert!(!traj.get_bool("mask")?[[1]]);

        let record = episode_record(&traj)?;
        assert_eq!(record.get_scalar("episode_return")?, 1.0);
        assert_eq!(record.get_scalar("episode_length")?, 1.0);
        assert_eq!(record.get_scalar("mean_entropy")?, 0.0);
        assert_eq!(record.get_array1("action_counts")?, vec![0.0, 0.0, 1.0, 0.0]);
        Ok(())
    }

    #[test]
    fn test_step_into() -> Result<()> {
        let _ = env_logger::builder().is_test(true).try_init();
        let config = ToyTextEnvConfig::registered("FrozenLake-v1")?.is_slippery(false);
        let mut env = ToyTextEnv::build(&config, 0)?;
        let embedding = OneHotEmbedding::new(*env.observation_space());
        let mut mcts = Mcts::new(Uct::new(1.0), RandomRolloutEvaluator::new(20, 0))
            .discount_factor(0.9);
        let episode = EpisodeConfig::default()
            .planning_budget(40)
            .max_steps(30)
            .step_into(true)
            .goal_obs(Some(15));
        let traj = run_episode(
            &mut mcts,
            &mut env,
            &VisitationPolicy::new(Some(0.0)),
            &embedding,
            &episode,
        )?;

        let record = episode_record(&traj)?;
        let len = record.get_scalar("episode_length")? as usize;
        assert!((1..=30).contains(&len));
        let terminals = traj.get_bool("terminals")?;
        if len < 30 {
            assert!(terminals[[len - 1]]);
        }
        assert!(terminals.iter().take(len - 1).all(|&t| !t));
        Ok(())
    }

    #[test]
    fn test_episode_record() -> Result<()> {
        let mut traj = empty_trajectory(4, 2, 4)?;
        for (t, r) in [-1f32, -1.0, -100.0].into_iter().enumerate() {
            traj.set_row("rewards", t, scalar(r))?;
            traj.set_row("mask", t, scalar(true))?;
            traj.set_row("actions", t, scalar(t as i64))?;
            traj.set_row(
                "policy_distributions",
                t,
                arr1(&[0.25f32, 0.25, 0.25, 0.25]).into_dyn(),
            )?;
        }
        // Masked out rows are ignored.
        traj.set_row("rewards", 3, scalar(-5f32))?;

        let record = episode_record(&traj)?;
        assert_eq!(record.get_scalar("episode_return")?, -102.0);
        assert_eq!(record.get_scalar("episode_length")?, 3.0);
        assert!((record.get_scalar("mean_entropy")? - 1.0).abs() < 1e-5);
        assert_eq!(record.get_array1("action_counts")?, vec![1.0, 1.0, 1.0, 0.0]);
        Ok(())
    }
}
