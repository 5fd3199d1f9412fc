//! Monte Carlo tree search.
use crate::{
    error::MctsError,
    evaluator::NodeEvaluator,
    policy::{DefaultExpansionPolicy, ExpansionPolicy, SelectionPolicy},
    Node, NodeId, Tree,
};
use anyhow::Result;
use gridplan_core::{DiscreteEnv, Env};
use log::trace;

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Builds search trees over copies of an environment.
///
/// # Search
///
/// [`Mcts::search()`] copies the environment into the root node, evaluates
/// the root and backs its value up. Then [`Mcts::build_tree()`] repeats the
/// following until the root has been visited `iterations` times:
///
/// ```mermaid
/// graph LR
///     A[select]-->|terminal|B[backup 0]
///     A-->|expandable|C[expand]
///     C-->D[evaluate]
///     D-->E[backup value]
/// ```
///
/// 1. Starting at the root, descend with the [`SelectionPolicy`] until it
///    returns `None` for a node or a terminal node is reached.
/// 2. A terminal node is worth 0, which is backed up.
/// 3. Otherwise the node is expanded. With an [`ExpansionPolicy`] one
///    unexplored action is added, without one every unexplored action is.
///    Each new child is valued by the [`NodeEvaluator`] and the value is
///    backed up.
///
/// # Backup
///
/// From the node up to the root, with `g` starting at the value,
/// `g = g * discount_factor + reward; subtree_sum += g; visits += 1`.
///
/// # Environment snapshots
///
/// A child steps a copy of the environment of its parent, except for the
/// last child of a node, which takes the snapshot of the parent over.
pub struct Mcts<E: DiscreteEnv + Clone> {
    selection_policy: Box<dyn SelectionPolicy<E>>,
    expansion_policy: Option<Box<dyn ExpansionPolicy<E>>>,
    evaluator: Box<dyn NodeEvaluator<E>>,
    discount_factor: f32,
}

impl<E: DiscreteEnv + Clone> Mcts<E> {
    /// Creates a solver with the uniform expansion policy and no discount.
    pub fn new(
        selection_policy: impl SelectionPolicy<E> + 'static,
        evaluator: impl NodeEvaluator<E> + 'static,
    ) -> Self {
        Self {
            selection_policy: Box::new(selection_policy),
            expansion_policy: Some(Box::new(DefaultExpansionPolicy::new(0))),
            evaluator: Box::new(evaluator),
            discount_factor: 1.0,
        }
    }

    /// Sets the expansion policy. `None` expands every action at once.
    pub fn expansion_policy(mut self, policy: Option<Box<dyn ExpansionPolicy<E>>>) -> Self {
        self.expansion_policy = policy;
        self
    }

    /// Sets the discount factor.
    pub fn discount_factor(mut self, v: f32) -> Self {
        self.discount_factor = v;
        self
    }

    /// Searches from the current state of `env`, which is left untouched.
    ///
    /// `obs` is the observation of the state and `reward` the reward of the
    /// transition into it.
    pub fn search(&mut self, env: &E, iterations: usize, obs: E::Obs, reward: f32) -> Result<Tree<E>> {
        let n = env.action_space().n();
        let mut tree = Tree::new(Node::new(Some(env.clone()), n, reward, false, Some(obs)));
        let root = tree.root();
        self.evaluate(&mut tree, root)?;
        self.build_tree(&mut tree, iterations)?;
        Ok(tree)
    }

    /// Grows `tree` until its root has `iterations` visits.
    pub fn build_tree(&mut self, tree: &mut Tree<E>, iterations: usize) -> Result<()> {
        let root = tree.root();
        while tree[root].visits < iterations {
            let node = self.select_node_to_expand(tree, root)?;
            if tree[node].is_terminal() {
                tree.node_mut(node).value_evaluation = 0.0;
                self.backup(tree, node, 0.0);
            } else {
                self.handle_selected_node(tree, node)?;
            }
        }
        trace!("tree with {} nodes, root visits {}", tree.len(), tree[root].visits);
        Ok(())
    }

    /// Descends from `from` to the node to expand, or to a terminal node.
    pub fn select_node_to_expand(&self, tree: &Tree<E>, from: NodeId) -> Result<NodeId> {
        let mut node = from;
        while !tree[node].is_terminal() {
            match self.selection_policy.select(tree, node) {
                None => return Ok(node),
                Some(action) => {
                    node = tree[node]
                        .child(action)
                        .ok_or(MctsError::ChildNotFound { node, action })?;
                }
            }
        }
        Ok(node)
    }

    fn handle_selected_node(&mut self, tree: &mut Tree<E>, node: NodeId) -> Result<()> {
        let actions = match self.expansion_policy.as_mut() {
            None => tree[node].unexplored_actions(),
            Some(policy) => policy.expand_action(tree, node).into_iter().collect(),
        };
        if actions.is_empty() {
            return Err(MctsError::NoUnexploredAction(node).into());
        }

        for action in actions {
            let child = self.expand(tree, node, action)?;
            self.evaluate(tree, child)?;
        }
        Ok(())
    }

    fn evaluate(&mut self, tree: &mut Tree<E>, node: NodeId) -> Result<()> {
        let evaluation = self.evaluator.evaluate(&tree[node])?;
        let n = tree.node_mut(node);
        n.value_evaluation = evaluation.value;
        n.prior = evaluation.prior;
        self.backup(tree, node, evaluation.value);
        Ok(())
    }

    /// Adds the child of `node` reached by `action` and returns it.
    pub fn expand(&mut self, tree: &mut Tree<E>, node: NodeId, action: usize) -> Result<NodeId> {
        let parent = tree.get_mut(node)?;
        let n = parent.n_actions();
        let snapshot = if parent.n_expanded() + 1 == n {
            parent.env.take()
        } else {
            parent.env.clone()
        };
        let mut env = snapshot.ok_or(MctsError::MissingEnv(node))?;

        let act = env.act_from_index(action);
        let (step, _) = env.step(&act)?;
        let terminal = step.is_done();
        let observation = (!step.is_terminated).then_some(step.obs);

        let child = Node::new(Some(env), n, step.reward, terminal, observation);
        Ok(tree.add_child(node, action, child)?)
    }

    /// Propagates `value` from `node` up to the root.
    pub fn backup(&self, tree: &mut Tree<E>, node: NodeId, value: f32) {
        let mut g = value;
        let mut id = Some(node);
        while let Some(i) = id {
            let n = tree.node_mut(i);
            g = g * self.discount_factor + n.reward;
            n.subtree_sum += g;
            n.visits += 1;
            id = n.parent();
        }
    }
}
