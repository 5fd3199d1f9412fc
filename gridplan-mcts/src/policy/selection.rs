//! Selection policies.
use crate::{NodeId, Tree};
use gridplan_core::DiscreteEnv;
use serde::{Deserialize, Serialize};

/// Chooses the child to descend into during search.
pub trait SelectionPolicy<E: DiscreteEnv> {
    /// Score of the child reached by `action` from `node`.
    fn score(&self, tree: &Tree<E>, node: NodeId, action: usize) -> f32;

    /// Returns `None` if `node` should be expanded, otherwise the action of
    /// the child with the highest score. Ties go to the lowest action.
    fn select(&self, tree: &Tree<E>, node: NodeId) -> Option<usize> {
        let n = &tree[node];
        if !n.is_fully_expanded() {
            return None;
        }

        let mut best: Option<(usize, f32)> = None;
        for (action, _) in n.children() {
            let s = self.score(tree, node, action);
            if best.map_or(true, |(_, b)| s > b) {
                best = Some((action, s));
            }
        }
        best.map(|(a, _)| a)
    }
}

fn child_stats<E: DiscreteEnv>(tree: &Tree<E>, node: NodeId, action: usize) -> (f32, f32, f32) {
    let parent = &tree[node];
    match parent.child(action) {
        Some(c) => (
            tree[c].default_value(),
            tree[c].visits as f32,
            parent.visits as f32,
        ),
        None => (0.0, 0.0, parent.visits as f32),
    }
}

/// Upper confidence bound for trees, `Q + c * sqrt(ln N / n)`.
///
/// `N` is the visit count of the node and `n` the one of the child.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Uct {
    /// Exploration constant.
    pub c: f32,
}

impl Uct {
    /// Creates the policy.
    pub fn new(c: f32) -> Self {
        Self { c }
    }
}

impl<E: DiscreteEnv> SelectionPolicy<E> for Uct {
    fn score(&self, tree: &Tree<E>, node: NodeId, action: usize) -> f32 {
        let (q, n, big_n) = child_stats(tree, node, action);
        if n == 0.0 {
            return f32::INFINITY;
        }
        q + self.c * (big_n.ln() / n).sqrt()
    }
}

/// Predictor UCT, `Q + c * P * sqrt(N) / (1 + n)`.
///
/// `P` is taken from the prior of the node, uniform if it has none.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Puct {
    /// Exploration constant.
    pub c: f32,
}

impl Puct {
    /// Creates the policy.
    pub fn new(c: f32) -> Self {
        Self { c }
    }
}

impl<E: DiscreteEnv> SelectionPolicy<E> for Puct {
    fn score(&self, tree: &Tree<E>, node: NodeId, action: usize) -> f32 {
        let (q, n, big_n) = child_stats(tree, node, action);
        let parent = &tree[node];
        let p = parent
            .prior
            .as_ref()
            .and_then(|prior| prior.get(action).copied())
            .unwrap_or(1.0 / parent.n_actions() as f32);
        q + self.c * p * big_n.sqrt() / (1.0 + n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Node;
    use gridplan_toy_text::{ToyTextEnv, ToyTextObs};

    fn node(visits: usize, subtree_sum: f32) -> Node<ToyTextEnv> {
        let mut node = Node::new(None, 2, 0.0, false, Some(ToyTextObs::from(0)));
        node.visits = visits;
        node.subtree_sum = subtree_sum;
        node
    }

    fn tree(children: &[(usize, f32)]) -> Tree<ToyTextEnv> {
        let total = 1 + children.iter().map(|c| c.0).sum::<usize>();
        let mut tree = Tree::new(node(total, 0.0));
        let root = tree.root();
        for (a, &(v, s)) in children.iter().enumerate() {
            tree.add_child(root, a, node(v, s)).unwrap();
        }
        tree
    }

    #[test]
    fn test_expand_when_not_fully_expanded() {
        let mut tree = Tree::new(node(1, 0.0));
        let root = tree.root();
        assert_eq!(SelectionPolicy::select(&Uct::new(1.0), &tree, root), None);
        tree.add_child(root, 0, node(1, 0.0)).unwrap();
        assert_eq!(SelectionPolicy::select(&Puct::new(1.0), &tree, root), None);
    }

    #[test]
    fn test_uct_prefers_less_visited_with_same_value() {
        // Same mean value, the second child was visited less.
        let tree = tree(&[(8, -8.0), (2, -2.0)]);
        assert_eq!(Uct::new(1.0).select(&tree, tree.root()), Some(1));
        // Without exploration the higher mean wins.
        let tree = self::tree(&[(8, -8.0), (2, -4.0)]);
        assert_eq!(Uct::new(0.0).select(&tree, tree.root()), Some(0));
    }

    #[test]
    fn test_uct_score() {
        let tree = tree(&[(3, 6.0), (3, 0.0)]);
        let s = Uct::new(2.0).score(&tree, tree.root(), 0);
        let expected = 2.0 + 2.0 * (7f32.ln() / 3.0).sqrt();
        assert!((s - expected).abs() < 1e-6);
    }

    #[test]
    fn test_ties_go_to_lowest_action() {
        let tree = tree(&[(2, -2.0), (2, -2.0)]);
        assert_eq!(Uct::new(1.0).select(&tree, tree.root()), Some(0));
        assert_eq!(Puct::new(1.0).select(&tree, tree.root()), Some(0));
    }

    #[test]
    fn test_puct_uses_prior() {
        let mut tree = tree(&[(2, -2.0), (2, -2.0)]);
        let root = tree.root();
        assert_eq!(Puct::new(1.0).select(&tree, root), Some(0));
        tree.get_mut(root).unwrap().prior = Some(vec![0.1, 0.9]);
        assert_eq!(Puct::new(1.0).select(&tree, root), Some(1));

        let s = Puct::new(1.0).score(&tree, root, 1);
        let expected = -1.0 + 0.9 * 5f32.sqrt() / 3.0;
        assert!((s - expected).abs() < 1e-6);
    }
}
