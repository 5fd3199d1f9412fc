//! Action for [`ToyTextEnv`](crate::ToyTextEnv).
use gridplan_core::Act;

/// Index of a move in the grid.
///
/// CliffWalking: 0 up, 1 right, 2 down, 3 left.
/// FrozenLake: 0 left, 1 down, 2 right, 3 up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ToyTextAct {
    pub act: usize,
}

impl ToyTextAct {
    pub fn new(act: usize) -> Self {
        Self { act }
    }
}

impl Act for ToyTextAct {}

impl From<usize> for ToyTextAct {
    fn from(act: usize) -> Self {
        Self { act }
    }
}
