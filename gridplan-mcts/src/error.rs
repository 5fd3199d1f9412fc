//! Errors in the planner.
use crate::NodeId;
use thiserror::Error;

/// Failures while building a search tree.
#[derive(Debug, Error, PartialEq)]
pub enum MctsError {
    /// The node has no environment snapshot to step from.
    #[error("Node {0} has no environment snapshot")]
    MissingEnv(NodeId),

    /// Every action of the node has already been expanded.
    #[error("Node {0} has no unexplored action")]
    NoUnexploredAction(NodeId),

    /// The selected action has no child.
    #[error("Node {node} has no child for action {action}")]
    ChildNotFound { node: NodeId, action: usize },

    /// The node id does not belong to the tree.
    #[error("Node {0} is not in the tree")]
    NodeNotFound(NodeId),

    /// A temperature of the tree evaluation policy that is negative or NaN.
    #[error("Invalid temperature {0}, expected 0 or a positive value")]
    InvalidTemperature(f32),
}
