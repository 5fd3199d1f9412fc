//! Value estimates of newly expanded nodes.
use crate::Node;
use anyhow::{anyhow, Result};
use gridplan_core::{DiscreteEnv, Env};
use log::trace;
use rand::{rngs::SmallRng, SeedableRng};

/// Value estimate of a node, with an optional prior over its actions.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Expected return from the state of the node.
    pub value: f32,

    /// Prior probabilities of the actions.
    pub prior: Option<Vec<f32>>,
}

impl Evaluation {
    /// An evaluation without prior.
    pub fn value(value: f32) -> Self {
        Self { value, prior: None }
    }
}

/// Estimates the value of a node.
pub trait NodeEvaluator<E: DiscreteEnv> {
    /// Evaluates `node`. Terminal nodes are worth 0.
    fn evaluate(&mut self, node: &Node<E>) -> Result<Evaluation>;
}

/// Values every node at 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroEvaluator;

impl<E: DiscreteEnv> NodeEvaluator<E> for ZeroEvaluator {
    fn evaluate(&mut self, _node: &Node<E>) -> Result<Evaluation> {
        Ok(Evaluation::value(0.0))
    }
}

/// Sum of the rewards of uniformly random actions taken from a copy of the
/// environment of the node.
///
/// The rollout stops when the episode ends or after `rollout_budget` steps.
#[derive(Debug, Clone)]
pub struct RandomRolloutEvaluator {
    rollout_budget: usize,
    rng: SmallRng,
}

impl RandomRolloutEvaluator {
    /// Creates the evaluator.
    pub fn new(rollout_budget: usize, seed: u64) -> Self {
        Self {
            rollout_budget,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Maximum length of a rollout.
    pub fn rollout_budget(&self) -> usize {
        self.rollout_budget
    }
}

impl<E: DiscreteEnv + Clone> NodeEvaluator<E> for RandomRolloutEvaluator {
    fn evaluate(&mut self, node: &Node<E>) -> Result<Evaluation> {
        if node.is_terminal() {
            return Ok(Evaluation::value(0.0));
        }

        let mut env = node
            .env
            .as_ref()
            .ok_or_else(|| anyhow!("rollout from a node without environment"))?
            .clone();
        let space = *env.action_space();
        let mut total = 0.0;
        let mut steps = 0;

        for _ in 0..self.rollout_budget {
            let act = env.act_from_index(space.sample(&mut self.rng));
            let (step, _) = env.step(&act)?;
            total += step.reward;
            steps += 1;
            if step.is_done() {
                break;
            }
        }
        trace!("rollout: {} steps, return {}", steps, total);

        Ok(Evaluation::value(total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridplan_toy_text::{make, ToyTextEnv, ToyTextEnvConfig, ToyTextObs};

    #[test]
    fn test_terminal_is_zero() -> Result<()> {
        let node = Node::<ToyTextEnv>::new(None, 4, 1.0, true, None);
        let mut evaluator = RandomRolloutEvaluator::new(10, 0);
        assert_eq!(evaluator.evaluate(&node)?.value, 0.0);
        Ok(())
    }

    #[test]
    fn test_missing_env() {
        let node = Node::<ToyTextEnv>::new(None, 4, 0.0, false, Some(ToyTextObs::from(0)));
        assert!(RandomRolloutEvaluator::new(10, 0).evaluate(&node).is_err());
        assert_eq!(ZeroEvaluator.evaluate(&node).unwrap().value, 0.0);
    }

    #[test]
    fn test_rollout_on_cliff() -> Result<()> {
        let env = make("CliffWalking-v0", 0)?;
        let node = Node::new(Some(env), 4, 0.0, false, Some(ToyTextObs::from(36)));
        let mut evaluator = RandomRolloutEvaluator::new(20, 3);
        let value = evaluator.evaluate(&node)?.value;
        // Every step costs at least 1 and the goal is 13 steps away.
        assert!(value <= -12.0 && value >= -2000.0);
        // The snapshot of the node is not moved.
        assert_eq!(node.env.as_ref().unwrap().state(), 36);
        Ok(())
    }

    #[test]
    fn test_rollout_stops_at_termination() -> Result<()> {
        // The goal is next to the start.
        let config = ToyTextEnvConfig::registered("FrozenLake-v1")?
            .is_slippery(false)
            .desc(vec!["SG".to_string()]);
        let env = ToyTextEnv::build(&config, 0)?;
        let node = Node::new(Some(env), 4, 0.0, false, Some(ToyTextObs::from(0)));
        let mut evaluator = RandomRolloutEvaluator::new(1000, 0);
        assert_eq!(evaluator.evaluate(&node)?.value, 1.0);
        Ok(())
    }
}
