//! Configuration of the planner.
use crate::{
    error::MctsError,
    evaluator::{RandomRolloutEvaluator, ZeroEvaluator},
    policy::{
        DefaultExpansionPolicy, ExpansionPolicy, GreedyPolicy, Puct, TreeEvaluationPolicy, Uct,
        VisitationPolicy,
    },
    EpisodeConfig, Mcts,
};
use anyhow::Result;
use gridplan_core::DiscreteEnv;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Selection policy used in the tree.
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone, Copy)]
pub enum SelectionKind {
    /// [`Uct`].
    Uct,

    /// [`Puct`].
    Puct,
}

/// How newly expanded nodes are valued.
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone, Copy)]
pub enum EvaluatorKind {
    /// [`ZeroEvaluator`].
    Zero,

    /// [`RandomRolloutEvaluator`].
    RandomRollout,
}

/// Policy derived from the root to act with.
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone, Copy)]
pub enum TreeEvaluationKind {
    /// [`VisitationPolicy`].
    Visit,

    /// [`GreedyPolicy`].
    Greedy,
}

/// Configuration of [`Mcts`] and of the episodes it plays.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct MctsConfig {
    /// Selection policy.
    pub selection: SelectionKind,

    /// Exploration constant of the selection policy.
    pub c: f32,

    /// If `true`, all actions of a selected node are expanded at once.
    pub expand_all: bool,

    /// Node evaluator.
    pub evaluator: EvaluatorKind,

    /// Maximum length of random rollouts.
    pub rollout_budget: usize,

    /// Tree evaluation policy.
    pub tree_evaluation: TreeEvaluationKind,

    /// Temperature of the tree evaluation policy.
    pub tree_temperature: Option<f32>,

    /// Discount factor.
    pub discount_factor: f32,

    /// Root visits before each action.
    pub planning_budget: usize,

    /// Maximum length of an episode.
    pub max_episode_length: usize,

    /// Keep the subtree of the taken action between steps.
    pub step_into: bool,

    /// Random seed.
    pub seed: u64,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            selection: SelectionKind::Puct,
            c: 1.0,
            expand_all: false,
            evaluator: EvaluatorKind::RandomRollout,
            rollout_budget: 40,
            tree_evaluation: TreeEvaluationKind::Visit,
            tree_temperature: None,
            discount_factor: 1.0,
            planning_budget: 32,
            max_episode_length: 200,
            step_into: false,
            seed: 0,
        }
    }
}

impl MctsConfig {
    /// Sets the selection policy.
    pub fn selection(mut self, v: SelectionKind) -> Self {
        self.selection = v;
        self
    }

    /// Sets the exploration constant.
    pub fn c(mut self, v: f32) -> Self {
        self.c = v;
        self
    }

    /// Sets whether to expand all actions at once.
    pub fn expand_all(mut self, v: bool) -> Self {
        self.expand_all = v;
        self
    }

    /// Sets the node evaluator.
    pub fn evaluator(mut self, v: EvaluatorKind) -> Self {
        self.evaluator = v;
        self
    }

    /// Sets the maximum length of random rollouts.
    pub fn rollout_budget(mut self, v: usize) -> Self {
        self.rollout_budget = v;
        self
    }

    /// Sets the tree evaluation policy.
    pub fn tree_evaluation(mut self, v: TreeEvaluationKind) -> Self {
        self.tree_evaluation = v;
        self
    }

    /// Sets the temperature of the tree evaluation policy.
    pub fn tree_temperature(mut self, v: Option<f32>) -> Self {
        self.tree_temperature = v;
        self
    }

    /// Sets the discount factor.
    pub fn discount_factor(mut self, v: f32) -> Self {
        self.discount_factor = v;
        self
    }

    /// Sets the planning budget.
    pub fn planning_budget(mut self, v: usize) -> Self {
        self.planning_budget = v;
        self
    }

    /// Sets the maximum length of an episode.
    pub fn max_episode_length(mut self, v: usize) -> Self {
        self.max_episode_length = v;
        self
    }

    /// Sets whether to step into the subtree of the taken action.
    pub fn step_into(mut self, v: bool) -> Self {
        self.step_into = v;
        self
    }

    /// Sets the random seed.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }

    /// Builds the solver.
    pub fn build<E: DiscreteEnv + Clone>(&self) -> Mcts<E> {
        let mcts = match (self.selection, self.evaluator) {
            (SelectionKind::Uct, EvaluatorKind::Zero) => Mcts::new(Uct::new(self.c), ZeroEvaluator),
            (SelectionKind::Puct, EvaluatorKind::Zero) => Mcts::new(Puct::new(self.c), ZeroEvaluator),
            (SelectionKind::Uct, EvaluatorKind::RandomRollout) => Mcts::new(
                Uct::new(self.c),
                RandomRolloutEvaluator::new(self.rollout_budget, self.seed),
            ),
            (SelectionKind::Puct, EvaluatorKind::RandomRollout) => Mcts::new(
                Puct::new(self.c),
                RandomRolloutEvaluator::new(self.rollout_budget, self.seed),
            ),
        };

        let expansion: Option<Box<dyn ExpansionPolicy<E>>> = match self.expand_all {
            true => None,
            false => Some(Box::new(DefaultExpansionPolicy::new(self.seed))),
        };

        mcts.expansion_policy(expansion)
            .discount_factor(self.discount_factor)
    }

    /// Builds the tree evaluation policy.
    pub fn tree_policy<E: DiscreteEnv>(&self) -> Box<dyn TreeEvaluationPolicy<E>> {
        match self.tree_evaluation {
            TreeEvaluationKind::Visit => Box::new(VisitationPolicy::new(self.tree_temperature)),
            TreeEvaluationKind::Greedy => Box::new(GreedyPolicy::new(self.tree_temperature)),
        }
    }

    /// Configuration of an episode with the given seed.
    pub fn episode_config(&self, seed: u64) -> EpisodeConfig {
        EpisodeConfig::default()
            .planning_budget(self.planning_budget)
            .max_steps(self.max_episode_length)
            .step_into(self.step_into)
            .seed(seed)
    }

    /// Checks the values that the type system cannot.
    ///
    /// The temperature of the tree evaluation policy must be `0` or positive.
    pub fn check(&self) -> Result<(), MctsError> {
        match self.tree_temperature {
            Some(t) if t.is_nan() || t < 0.0 => Err(MctsError::InvalidTemperature(t)),
            _ => Ok(()),
        }
    }

    /// Constructs [`MctsConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b: Self = serde_yaml::from_reader(rdr)?;
        b.check()?;
        Ok(b)
    }

    /// Saves [`MctsConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
