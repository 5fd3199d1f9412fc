//! Embeddings of [`ToyTextObs`].
use crate::ToyTextObs;
use anyhow::{bail, Result};
use gridplan_core::{Discrete, ObservationEmbedding};
use ndarray::{arr1, Array1, ArrayView1};

/// Embeds a cell index as a one-hot vector over all cells.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OneHotEmbedding {
    space: Discrete,
}

impl OneHotEmbedding {
    pub fn new(space: Discrete) -> Self {
        Self { space }
    }
}

impl ObservationEmbedding<ToyTextObs> for OneHotEmbedding {
    fn obs_dim(&self) -> usize {
        self.space.n()
    }

    fn obs_to_tensor(&self, obs: &ToyTextObs) -> Result<Array1<f32>> {
        Ok(self.space.one_hot(obs.state)?)
    }

    fn tensor_to_obs(&self, tensor: ArrayView1<f32>) -> Result<ToyTextObs> {
        Ok(self.space.index_of(tensor)?.into())
    }
}

/// Embeds a cell as its row and column, each scaled to `[-1, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateEmbedding {
    pub nrows: usize,
    pub ncols: usize,
}

impl CoordinateEmbedding {
    pub fn new(nrows: usize, ncols: usize) -> Self {
        Self { nrows, ncols }
    }
}

fn scale(x: usize, n: usize) -> f32 {
    if n <= 1 {
        0.0
    } else {
        2.0 * x as f32 / (n - 1) as f32 - 1.0
    }
}

fn unscale(v: f32, n: usize) -> Option<usize> {
    let x = if n <= 1 {
        0.0
    } else {
        ((v + 1.0) * (n - 1) as f32 / 2.0).round()
    };
    if x >= 0.0 && (x as usize) < n.max(1) {
        Some(x as usize)
    } else {
        None
    }
}

impl ObservationEmbedding<ToyTextObs> for CoordinateEmbedding {
    fn obs_dim(&self) -> usize {
        2
    }

    fn obs_to_tensor(&self, obs: &ToyTextObs) -> Result<Array1<f32>> {
        if obs.state >= self.nrows * self.ncols {
            bail!(
                "State {} is outside of a {}x{} grid",
                obs.state,
                self.nrows,
                self.ncols
            );
        }
        let (row, col) = (obs.state / self.ncols, obs.state % self.ncols);
        Ok(arr1(&[scale(row, self.nrows), scale(col, self.ncols)]))
    }

    fn tensor_to_obs(&self, tensor: ArrayView1<f32>) -> Result<ToyTextObs> {
        if tensor.len() != 2 {
            bail!("Expected 2 coordinates, got {}", tensor.len());
        }
        match (unscale(tensor[0], self.nrows), unscale(tensor[1], self.ncols)) {
            (Some(row), Some(col)) => Ok((row * self.ncols + col).into()),
            _ => bail!("Coordinates {:?} are outside of the grid", tensor),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_hot_embedding() -> Result<()> {
        let emb = OneHotEmbedding::new(Discrete::new(48));
        assert_eq!(emb.obs_dim(), 48);
        for s in 0..48 {
            let t = emb.obs_to_tensor(&s.into())?;
            assert_eq!(emb.tensor_to_obs(t.view())?, ToyTextObs::from(s));
        }
        assert!(emb.obs_to_tensor(&48.into()).is_err());
        Ok(())
    }

    #[test]
    fn test_coordinate_embedding() -> Result<()> {
        let emb = CoordinateEmbedding::new(4, 12);
        assert_eq!(emb.obs_to_tensor(&0.into())?, arr1(&[-1.0, -1.0]));
        assert_eq!(emb.obs_to_tensor(&47.into())?, arr1(&[1.0, 1.0]));
        for s in 0..48 {
            let t = emb.obs_to_tensor(&s.into())?;
            assert_eq!(emb.tensor_to_obs(t.view())?.state, s);
        }
        assert!(emb.tensor_to_obs(arr1(&[3.0, 0.0]).view()).is_err());
        assert!(emb.tensor_to_obs(arr1(&[0.0]).view()).is_err());
        assert!(emb.obs_to_tensor(&48.into()).is_err());
        Ok(())
    }
}
