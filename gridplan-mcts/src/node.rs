//! Search tree.
use crate::error::MctsError;
use gridplan_core::DiscreteEnv;
use rand::Rng;
use std::{collections::BTreeMap, fmt, ops::Index};

/// Index of a node in a [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node in the arena of its tree.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A node of the search tree.
///
/// A node stands for the state reached by the action sequence on the path
/// from the root. `reward` is the reward of the transition into the node.
/// `subtree_sum / visits` estimates the return from the parent state
/// through this node, see [`Node::default_value()`].
#[derive(Debug, Clone)]
pub struct Node<E: DiscreteEnv> {
    parent: Option<NodeId>,
    children: Vec<Option<NodeId>>,
    n_expanded: usize,

    /// Reward of the transition into this node.
    pub reward: f32,

    /// Number of backups through this node.
    pub visits: usize,

    /// Sum of the discounted returns backed up through this node.
    pub subtree_sum: f32,

    /// Value given by the node evaluator when the node was created.
    pub value_evaluation: f32,

    /// The episode ended on the transition into this node.
    pub terminal: bool,

    /// Observation of the state. `None` if the episode terminated.
    pub observation: Option<E::Obs>,

    /// Environment in the state of this node.
    ///
    /// The snapshot is moved into the last expanded child, so fully expanded
    /// nodes have none.
    pub env: Option<E>,

    /// Prior probabilities of the actions.
    pub prior: Option<Vec<f32>>,
}

impl<E: DiscreteEnv> Node<E> {
    /// Creates an unvisited node with no children.
    pub fn new(
        env: Option<E>,
        n_actions: usize,
        reward: f32,
        terminal: bool,
        observation: Option<E::Obs>,
    ) -> Self {
        Self {
            parent: None,
            children: vec![None; n_actions],
            n_expanded: 0,
            reward,
            visits: 0,
            subtree_sum: 0.0,
            value_evaluation: 0.0,
            terminal,
            observation,
            env,
            prior: None,
        }
    }

    /// The parent node, `None` for the root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Number of actions available at this node.
    pub fn n_actions(&self) -> usize {
        self.children.len()
    }

    /// Number of expanded children.
    pub fn n_expanded(&self) -> usize {
        self.n_expanded
    }

    /// The child reached by `action`, if expanded.
    pub fn child(&self, action: usize) -> Option<NodeId> {
        self.children.get(action).copied().flatten()
    }

    /// Expanded children with their actions, in action order.
    pub fn children(&self) -> impl Iterator<Item = (usize, NodeId)> + '_ {
        self.children
            .iter()
            .enumerate()
            .filter_map(|(a, c)| c.map(|c| (a, c)))
    }

    /// Actions without a child, in action order.
    pub fn unexplored_actions(&self) -> Vec<usize> {
        self.children
            .iter()
            .enumerate()
            .filter_map(|(a, c)| c.is_none().then_some(a))
            .collect()
    }

    /// Returns `true` if every action has a child.
    pub fn is_fully_expanded(&self) -> bool {
        self.n_expanded == self.children.len()
    }

    /// Returns `true` if the episode ended on reaching this node.
    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    /// Samples an unexplored action uniformly.
    pub fn sample_unexplored_action(&self, rng: &mut impl Rng) -> Option<usize> {
        let actions = self.unexplored_actions();
        match actions.len() {
            0 => None,
            n => Some(actions[rng.gen_range(0..n)]),
        }
    }

    /// Mean of the returns backed up through this node, 0 if unvisited.
    pub fn default_value(&self) -> f32 {
        match self.visits {
            0 => 0.0,
            n => self.subtree_sum / n as f32,
        }
    }
}

/// Arena of nodes with a designated root.
#[derive(Debug, Clone)]
pub struct Tree<E: DiscreteEnv> {
    nodes: Vec<Node<E>>,
    root: NodeId,
}

impl<E: DiscreteEnv> Index<NodeId> for Tree<E> {
    type Output = Node<E>;

    fn index(&self, id: NodeId) -> &Self::Output {
        &self.nodes[id.0]
    }
}

impl<E: DiscreteEnv> Tree<E> {
    /// Creates a tree with a single root node.
    pub fn new(mut root: Node<E>) -> Self {
        root.parent = None;
        Self {
            nodes: vec![root],
            root: NodeId(0),
        }
    }

    /// The root.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The root node.
    pub fn root_node(&self) -> &Node<E> {
        &self[self.root]
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A tree always has its root.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The node with the given id.
    pub fn get(&self, id: NodeId) -> Result<&Node<E>, MctsError> {
        self.nodes.get(id.0).ok_or(MctsError::NodeNotFound(id))
    }

    /// The node with the given id.
    pub fn get_mut(&mut self, id: NodeId) -> Result<&mut Node<E>, MctsError> {
        self.nodes.get_mut(id.0).ok_or(MctsError::NodeNotFound(id))
    }

    /// Attaches `node` as the child of `parent` for `action`.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        action: usize,
        mut node: Node<E>,
    ) -> Result<NodeId, MctsError> {
        let id = NodeId(self.nodes.len());
        let p = self.get_mut(parent)?;
        let slot = p.children.get_mut(action).ok_or(MctsError::ChildNotFound {
            node: parent,
            action,
        })?;
        if slot.is_none() {
            p.n_expanded += 1;
        }
        *slot = Some(id);
        node.parent = Some(parent);
        self.nodes.push(node);
        Ok(id)
    }

    /// Mean returns of the children of a node, `None` for unexpanded actions.
    pub fn child_q_values(&self, id: NodeId) -> Vec<Option<f32>> {
        self[id]
            .children
            .iter()
            .map(|c| c.map(|c| self[c].default_value()))
            .collect()
    }

    /// Visit counts of the children of a node, 0 for unexpanded actions.
    pub fn child_visits(&self, id: NodeId) -> Vec<usize> {
        self[id]
            .children
            .iter()
            .map(|c| c.map_or(0, |c| self[c].visits))
            .collect()
    }

    /// Total visits per observation over the subtree of the root.
    ///
    /// `key` maps an observation to its index. Nodes without an observation
    /// are skipped.
    pub fn state_visitation_counts(&self, key: impl Fn(&E::Obs) -> usize) -> BTreeMap<usize, usize> {
        let mut counts = BTreeMap::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let node = &self[id];
            if let Some(obs) = node.observation.as_ref() {
                *counts.entry(key(obs)).or_insert(0) += node.visits;
            }
            stack.extend(node.children().map(|(_, c)| c));
        }
        counts
    }

    /// Returns the subtree of `child` as a new tree, dropping everything else.
    pub fn reroot(self, child: NodeId) -> Result<Self, MctsError> {
        if child.0 >= self.nodes.len() {
            return Err(MctsError::NodeNotFound(child));
        }

        let mut slots: Vec<Option<Node<E>>> = self.nodes.into_iter().map(Some).collect();
        let mut remap = vec![None; slots.len()];
        let mut order = vec![child];
        let mut i = 0;

        while i < order.len() {
            let old = order[i];
            remap[old.0] = Some(NodeId(i));
            if let Some(node) = slots[old.0].as_ref() {
                order.extend(node.children().map(|(_, c)| c));
            }
            i += 1;
        }

        let mut nodes = Vec::with_capacity(order.len());
        for old in order {
            let mut node = slots[old.0].take().ok_or(MctsError::NodeNotFound(old))?;
            node.parent = node.parent.and_then(|p| remap[p.0]);
            for c in node.children.iter_mut() {
                *c = c.and_then(|c| remap[c.0]);
            }
            nodes.push(node);
        }
        nodes[0].parent = None;

        Ok(Self {
            nodes,
            root: NodeId(0),
        })
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node<E> {
        &mut self.nodes[id.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridplan_toy_text::{make, ToyTextEnv, ToyTextObs};
    use rand::{rngs::SmallRng, SeedableRng};

    fn leaf(obs: usize) -> Node<ToyTextEnv> {
        Node::new(None, 4, -1.0, false, Some(ToyTextObs::from(obs)))
    }

    #[test]
    fn test_expansion_bookkeeping() {
        let env = make("CliffWalking-v0", 0).unwrap();
        let mut tree = Tree::new(Node::new(Some(env), 4, 0.0, false, Some(ToyTextObs::from(36))));
        let root = tree.root();
        assert!(!tree[root].is_fully_expanded());
        assert_eq!(tree[root].unexplored_actions(), vec![0, 1, 2, 3]);

        let c = tree.add_child(root, 2, leaf(36)).unwrap();
        assert_eq!(tree[root].child(2), Some(c));
        assert_eq!(tree[c].parent(), Some(root));
        assert_eq!(tree[root].unexplored_actions(), vec![0, 1, 3]);

        let mut rng = SmallRng::seed_from_u64(0);
        for _ in 0..20 {
            let a = tree[root].sample_unexplored_action(&mut rng).unwrap();
            assert_ne!(a, 2);
        }
        for a in [0, 1, 3] {
            tree.add_child(root, a, leaf(a)).unwrap();
        }
        assert!(tree[root].is_fully_expanded());
        assert_eq!(tree[root].sample_unexplored_action(&mut rng), None);
        assert!(tree.add_child(root, 4, leaf(0)).is_err());
    }

    #[test]
    fn test_default_value_and_q_values() {
        let mut tree = Tree::new(leaf(36));
        let root = tree.root();
        let c = tree.add_child(root, 1, leaf(24)).unwrap();
        assert_eq!(tree[c].default_value(), 0.0);

        let node = tree.node_mut(c);
        node.visits = 4;
        node.subtree_sum = -10.0;
        assert_eq!(tree.child_q_values(root), vec![None, Some(-2.5), None, None]);
        assert_eq!(tree.child_visits(root), vec![0, 4, 0, 0]);
    }

    #[test]
    fn test_state_visitation_counts() {
        let mut tree = Tree::new(leaf(36));
        let root = tree.root();
        tree.node_mut(root).visits = 3;
        let a = tree.add_child(root, 0, leaf(24)).unwrap();
        tree.node_mut(a).visits = 2;
        let b = tree.add_child(a, 2, leaf(36)).unwrap();
        tree.node_mut(b).visits = 1;
        let t = tree
            .add_child(root, 1, Node::new(None, 4, -100.0, true, None))
            .unwrap();
        tree.node_mut(t).visits = 5;

        let counts = tree.state_visitation_counts(|o| o.state);
        assert_eq!(counts.get(&36), Some(&4));
        assert_eq!(counts.get(&24), Some(&2));
        assert_eq!(counts.len(), 2);
    }

    #[test]
    fn test_reroot() {
        let mut tree = Tree::new(leaf(36));
        let root = tree.root();
        let a = tree.add_child(root, 0, leaf(24)).unwrap();
        let _b = tree.add_child(root, 1, leaf(36)).unwrap();
        let c = tree.add_child(a, 1, leaf(25)).unwrap();
        let d = tree.add_child(c, 1, leaf(26)).unwrap();
        tree.node_mut(d).visits = 7;

        let tree = tree.reroot(a).unwrap();
        assert_eq!(tree.len(), 3);
        let root = tree.root_node();
        assert_eq!(root.parent(), None);
        assert_eq!(root.observation, Some(ToyTextObs::from(24)));

        let c = root.child(1).unwrap();
        assert_eq!(tree[c].parent(), Some(tree.root()));
        let d = tree[c].child(1).unwrap();
        assert_eq!(tree[d].visits, 7);
        assert_eq!(tree[d].observation, Some(ToyTextObs::from(26)));
    }
}
