//! Expansion policies.
use crate::{NodeId, Tree};
use gridplan_core::DiscreteEnv;
use rand::{rngs::SmallRng, SeedableRng};

/// Picks the action to expand at a node that is not fully expanded.
pub trait ExpansionPolicy<E: DiscreteEnv> {
    /// Returns an unexplored action of `node`, `None` if there is none.
    fn expand_action(&mut self, tree: &Tree<E>, node: NodeId) -> Option<usize>;
}

/// Uniform choice among the unexplored actions.
#[derive(Debug, Clone)]
pub struct DefaultExpansionPolicy {
    rng: SmallRng,
}

impl DefaultExpansionPolicy {
    /// Creates the policy with a seeded random number generator.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl<E: DiscreteEnv> ExpansionPolicy<E> for DefaultExpansionPolicy {
    fn expand_action(&mut self, tree: &Tree<E>, node: NodeId) -> Option<usize> {
        tree[node].sample_unexplored_action(&mut self.rng)
    }
}
