use gridplan_core::Obs;

/// Index of the cell the agent stands on, `row * ncols + col`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ToyTextObs {
    pub state: usize,
}

impl From<usize> for ToyTextObs {
    fn from(state: usize) -> Self {
        Self { state }
    }
}

impl Obs for ToyTextObs {}
