//! Tree evaluation policies.
use super::Categorical;
use crate::{NodeId, Tree};
use gridplan_core::DiscreteEnv;

/// Derives the distribution to act with from the children of a node.
///
/// The temperature controls how scores become probabilities:
///
/// * `None`: [`TreeEvaluationPolicy::untempered()`] of the raw scores.
/// * `Some(0.0)`: uniform over the children with the highest score.
/// * `Some(t)`: `softmax(scores / t)`.
///
/// A node without any expanded child gets the uniform distribution.
pub trait TreeEvaluationPolicy<E: DiscreteEnv> {
    /// Score per action. `None` excludes the action from the distribution.
    fn scores(&self, tree: &Tree<E>, node: NodeId) -> Vec<Option<f32>>;

    /// Temperature.
    fn temperature(&self) -> Option<f32>;

    /// The distribution used without temperature.
    fn untempered(&self, scores: &[Option<f32>]) -> Categorical;

    /// The distribution over the actions of `node`.
    fn distribution(&self, tree: &Tree<E>, node: NodeId) -> Categorical {
        let scores = self.scores(tree, node);
        if tree[node].n_expanded() == 0 {
            return Categorical::uniform(scores.len());
        }

        match self.temperature() {
            None => self.untempered(&scores),
            Some(t) if t == 0.0 => Categorical::uniform_over_max(&scores),
            Some(t) => Categorical::from_logits(
                &scores
                    .iter()
                    .map(|s| s.map_or(f32::NEG_INFINITY, |s| s / t))
                    .collect::<Vec<_>>(),
            ),
        }
    }
}

/// Scores children by visit count.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VisitationPolicy {
    temperature: Option<f32>,
}

impl VisitationPolicy {
    /// Creates the policy.
    pub fn new(temperature: Option<f32>) -> Self {
        Self { temperature }
    }
}

impl<E: DiscreteEnv> TreeEvaluationPolicy<E> for VisitationPolicy {
    fn scores(&self, tree: &Tree<E>, node: NodeId) -> Vec<Option<f32>> {
        tree.child_visits(node)
            .into_iter()
            .map(|v| Some(v as f32))
            .collect()
    }

    fn temperature(&self) -> Option<f32> {
        self.temperature
    }

    /// Visit counts normalised.
    fn untempered(&self, scores: &[Option<f32>]) -> Categorical {
        Categorical::new(scores.iter().map(|s| s.unwrap_or(0.0)).collect())
    }
}

/// Scores children by their mean return. Unexpanded actions are excluded.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GreedyPolicy {
    temperature: Option<f32>,
}

impl GreedyPolicy {
    /// Creates the policy.
    pub fn new(temperature: Option<f32>) -> Self {
        Self { temperature }
    }
}

impl<E: DiscreteEnv> TreeEvaluationPolicy<E> for GreedyPolicy {
    fn scores(&self, tree: &Tree<E>, node: NodeId) -> Vec<Option<f32>> {
        tree.child_q_values(node)
    }

    fn temperature(&self) -> Option<f32> {
        self.temperature
    }

    /// Mean returns can be negative, so the best child is taken.
    fn untempered(&self, scores: &[Option<f32>]) -> Categorical {
        Categorical::argmax(scores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Node;
    use gridplan_toy_text::{ToyTextEnv, ToyTextObs};

    fn node(visits: usize, subtree_sum: f32) -> Node<ToyTextEnv> {
        let mut node = Node::new(None, 4, 0.0, false, Some(ToyTextObs::from(0)));
        node.visits = visits;
        node.subtree_sum = subtree_sum;
        node
    }

    // Children for actions 0, 1 and 3 with means -1, -2 and -1.
    fn tree() -> Tree<ToyTextEnv> {
        let mut tree = Tree::new(node(9, 0.0));
        let root = tree.root();
        tree.add_child(root, 0, node(2, -2.0)).unwrap();
        tree.add_child(root, 1, node(4, -8.0)).unwrap();
        tree.add_child(root, 3, node(2, -2.0)).unwrap();
        tree
    }

    #[test]
    fn test_visitation() {
        let tree = tree();
        let root = tree.root();
        let d = VisitationPolicy::new(None).distribution(&tree, root);
        assert_eq!(d.probs(), &[0.25, 0.5, 0.0, 0.25]);
        let d = VisitationPolicy::new(Some(0.0)).distribution(&tree, root);
        assert_eq!(d.probs(), &[0.0, 1.0, 0.0, 0.0]);
        let d = VisitationPolicy::new(Some(1.0)).distribution(&tree, root);
        assert!(d.probs()[1] > d.probs()[0]);
        assert!(d.probs()[2] > 0.0);
    }

    #[test]
    fn test_greedy() {
        let tree = tree();
        let root = tree.root();
        let d = GreedyPolicy::new(None).distribution(&tree, root);
        assert_eq!(d.probs(), &[1.0, 0.0, 0.0, 0.0]);
        let d = GreedyPolicy::new(Some(0.0)).distribution(&tree, root);
        assert_eq!(d.probs(), &[0.5, 0.0, 0.0, 0.5]);
        let d = GreedyPolicy::new(Some(1.0)).distribution(&tree, root);
        assert_eq!(d.probs()[2], 0.0);
        assert!((d.probs()[0] - d.probs()[3]).abs() < 1e-6);
        assert!(d.probs()[0] > d.probs()[1]);
    }

    #[test]
    fn test_leaf_is_uniform() {
        let tree = Tree::new(node(1, 0.0));
        let d = GreedyPolicy::new(None).distribution(&tree, tree.root());
        assert_eq!(d, Categorical::uniform(4));
        let d = VisitationPolicy::new(Some(0.0)).distribution(&tree, tree.root());
        assert_eq!(d, Categorical::uniform(4));
    }
}
